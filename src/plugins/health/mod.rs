//! Health plugin: the damageable collaborator shared by player and enemies.
//!
//! Death is reported through an outbox, not callbacks:
//! ```text
//! take_damage (any schedule) -> Health { dead } -> report_deaths (Resolve)
//!                                                  -> Died message, once
//! ```
//!
//! Hits that name an attacker position leave a knockback source behind,
//! picked up by the fixed-step knockback systems.

pub mod knockback;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::state::{GameState, GameplaySet};
use knockback::Knockback;

/// Exactly one per death; `Health::reset` re-arms it.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Died {
    pub entity: Entity,
}

#[derive(Component, Debug, Clone)]
pub struct Health {
    current: i32,
    max: i32,
    base_max: i32,
    max_multiplier: f32,
    invulnerability: f32,
    invulnerable_for: f32,
    dead: bool,
    death_reported: bool,
    knockback_from: Option<Vec2>,
}

impl Health {
    pub fn new(max: i32, invulnerability: f32) -> Self {
        let max = max.max(1);
        Self {
            current: max,
            max,
            base_max: max,
            max_multiplier: 1.0,
            invulnerability: invulnerability.max(0.0),
            invulnerable_for: 0.0,
            dead: false,
            death_reported: false,
            knockback_from: None,
        }
    }

    #[inline]
    pub fn current(&self) -> i32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> i32 {
        self.max
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_for > 0.0
    }

    /// Returns true when this hit was the killing blow. A landed hit with an
    /// `attacker` position queues a knockback away from it.
    pub fn take_damage(&mut self, amount: i32, attacker: Option<Vec2>) -> bool {
        if self.dead || self.is_invulnerable() || amount <= 0 {
            return false;
        }

        self.current = (self.current - amount).max(0);
        self.invulnerable_for = self.invulnerability;
        if attacker.is_some() {
            self.knockback_from = attacker;
        }

        if self.current == 0 {
            self.dead = true;
            return true;
        }
        false
    }

    pub fn heal(&mut self, amount: i32) {
        if self.dead || amount <= 0 {
            return;
        }
        self.current = (self.current + amount).min(self.max);
    }

    pub fn scale_max(&mut self, multiplier: f32) {
        self.set_max_multiplier(self.max_multiplier * multiplier);
    }

    pub fn unscale_max(&mut self, multiplier: f32) {
        if multiplier.abs() <= f32::EPSILON {
            return;
        }
        self.set_max_multiplier(self.max_multiplier / multiplier);
    }

    /// Keeps the current/max ratio; a living entity never drops below 1.
    fn set_max_multiplier(&mut self, multiplier: f32) {
        let old_max = self.max.max(1);
        let ratio = self.current as f32 / old_max as f32;

        self.max_multiplier = multiplier;
        self.max = ((self.base_max as f32 * multiplier).round() as i32).max(1);

        if !self.dead {
            self.current = ((self.max as f32 * ratio).round() as i32).clamp(1, self.max);
        }
    }

    /// Back to full at the current max; the next death reports again.
    pub fn reset(&mut self) {
        self.current = self.max;
        self.dead = false;
        self.death_reported = false;
        self.invulnerable_for = 0.0;
        self.knockback_from = None;
    }

    /// The attacker position of the latest landed hit, once.
    pub fn take_knockback_source(&mut self) -> Option<Vec2> {
        self.knockback_from.take()
    }

    pub fn tick(&mut self, dt: f32) {
        if self.invulnerable_for > 0.0 {
            self.invulnerable_for = (self.invulnerable_for - dt).max(0.0);
        }
    }
}

pub fn plugin(app: &mut App) {
    app.add_message::<Died>();
    app.add_systems(
        Update,
        (
            tick_invulnerability.in_set(GameplaySet::Logic),
            report_deaths.in_set(GameplaySet::Resolve),
        ),
    );
    app.add_systems(
        FixedUpdate,
        (start_knockback, drive_knockback)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
}

fn tick_invulnerability(time: Res<Time>, mut q: Query<&mut Health>) {
    let dt = time.delta_secs();
    for mut health in &mut q {
        if health.is_invulnerable() {
            health.tick(dt);
        }
    }
}

/// Single writer of `Died`.
pub fn report_deaths(mut q: Query<(Entity, &mut Health)>, mut died: MessageWriter<Died>) {
    for (entity, mut health) in &mut q {
        if health.dead && !health.death_reported {
            health.death_reported = true;
            debug!("{entity} died");
            died.write(Died { entity });
        }
    }
}

/// Turn queued knockback sources into pushes away from the attacker.
/// Entities without a `Knockback` drop the source.
pub fn start_knockback(mut q: Query<(&mut Health, &Transform, Option<&mut Knockback>)>) {
    for (mut health, tf, knockback) in &mut q {
        let Some(from) = health.take_knockback_source() else {
            continue;
        };
        if let Some(mut knockback) = knockback {
            knockback.start(tf.translation.truncate() - from);
        }
    }
}

pub fn drive_knockback(time: Res<Time>, mut q: Query<(&mut Knockback, &mut LinearVelocity)>) {
    let dt = time.delta_secs();
    for (mut knockback, mut velocity) in &mut q {
        if let Some(push) = knockback.tick(dt) {
            velocity.0 = push;
        }
    }
}
