//! Player melee: a circle overlap ahead of the player, paced by a cooldown.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::{Facing, Player};
use crate::common::input::GameplayInput;
use crate::common::layers::Layer;
use crate::common::state::GameplayGate;
use crate::common::timer::CooldownTimer;
use crate::common::tunables::Tunables;
use crate::plugins::enemies::Enemy;
use crate::plugins::health::Health;

#[derive(Component, Debug, Clone)]
pub struct MeleeAttack {
    /// Distance from the player to the centre of the hit circle.
    pub range: f32,
    pub radius: f32,
    pub damage: i32,
    cooldown: CooldownTimer,
}

impl MeleeAttack {
    pub fn new(range: f32, radius: f32, damage: i32, cooldown: f32) -> Self {
        Self {
            range,
            radius,
            damage,
            cooldown: CooldownTimer::new(cooldown),
        }
    }

    pub fn from_tunables(tunables: &Tunables) -> Self {
        Self::new(
            tunables.melee_range,
            tunables.melee_radius,
            tunables.melee_damage,
            tunables.melee_cooldown,
        )
    }

    pub fn tick(&mut self, dt: f32) {
        self.cooldown.tick(dt);
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.cooldown.is_ready()
    }

    /// Where the hit circle lands for a player at `origin`.
    pub fn hit_centre(&self, origin: Vec2, facing_right: bool) -> Vec2 {
        let side = if facing_right { 1.0 } else { -1.0 };
        origin + Vec2::X * side * self.range
    }

    /// Commit a swing: `None` while cooling down, otherwise the hit circle
    /// centre. Starts the cooldown.
    pub fn try_swing(&mut self, origin: Vec2, facing_right: bool) -> Option<Vec2> {
        if !self.cooldown.is_ready() {
            return None;
        }
        self.cooldown.start();
        Some(self.hit_centre(origin, facing_right))
    }

    /// Ready to swing again.
    pub fn reset(&mut self) {
        self.cooldown.reset();
    }
}

pub(super) fn melee_attack(
    time: Res<Time>,
    input: Res<GameplayInput>,
    gate: Option<Res<GameplayGate>>,
    spatial: SpatialQuery,
    mut q_player: Query<(&Transform, &Facing, &mut MeleeAttack), With<Player>>,
    mut q_enemies: Query<&mut Health, (With<Enemy>, Without<Player>)>,
) {
    let Ok((tf, facing, mut melee)) = q_player.single_mut() else {
        return;
    };
    melee.tick(time.delta_secs());

    if !input.attack || gate.is_some_and(|g| g.input_frozen) {
        return;
    }
    let origin = tf.translation.truncate();
    let Some(centre) = melee.try_swing(origin, facing.right) else {
        return;
    };

    let filter = SpatialQueryFilter::from_mask(Layer::Enemy);
    let hits = spatial.shape_intersections(&Collider::circle(melee.radius), centre, 0.0, &filter);
    debug!("melee at {centre:?}: {} hit", hits.len());

    for entity in hits {
        if let Ok(mut health) = q_enemies.get_mut(entity) {
            health.take_damage(melee.damage, Some(origin));
        }
    }
}
