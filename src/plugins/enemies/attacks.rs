//! Attack strategies.
//!
//! Closed set of variants chosen per archetype at spawn. Every variant is an
//! open-loop motion committed at `start_attack`: the target is snapshotted
//! once and never re-aimed.
//!
//! ```text
//! Update (brain tick)      : can_start_attack / start_attack / execute_shot
//! FixedUpdate (brain fixed): fixed_tick -> desired velocity
//! ```

use bevy::prelude::*;

use super::config::AttackConfig;
use super::sensors::{EnemySensors, LineOfSight};

/// Dive stops once this close to its destination.
pub const DIVE_ARRIVAL_DISTANCE: f32 = 0.5;

/// Everything the projectile pipeline needs to spawn a mortar shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotRelease {
    pub origin: Vec2,
    pub target: Vec2,
    pub speed: f32,
    pub arc_height: f32,
    pub damage: i32,
    pub lifetime: f32,
}

#[derive(Debug, Clone)]
pub enum Attack {
    Charge(ChargeAttack),
    Dive(DiveAttack),
    Shoot(ShootAttack),
}

#[derive(Debug, Clone)]
pub struct ChargeAttack {
    speed: f32,
    max_distance: f32,
    max_duration: f32,
    direction: Vec2,
    start: Vec2,
    elapsed: f32,
    travelled: f32,
    charging: bool,
}

#[derive(Debug, Clone)]
pub struct DiveAttack {
    speed: f32,
    max_duration: f32,
    destination: Vec2,
    elapsed: f32,
    diving: bool,
}

#[derive(Debug, Clone)]
pub struct ShootAttack {
    projectile_speed: f32,
    arc_height: f32,
    aim_time: f32,
    damage: i32,
    lifetime: f32,
    origin: Vec2,
    target: Vec2,
    elapsed: f32,
    aiming: bool,
    loaded: bool,
}

impl Attack {
    pub fn from_config(config: &AttackConfig) -> Self {
        match *config {
            AttackConfig::Charge {
                speed,
                max_distance,
                max_duration,
                ..
            } => Attack::Charge(ChargeAttack {
                speed,
                max_distance,
                max_duration,
                direction: Vec2::ZERO,
                start: Vec2::ZERO,
                elapsed: 0.0,
                travelled: 0.0,
                charging: false,
            }),
            AttackConfig::Dive {
                speed, max_duration, ..
            } => Attack::Dive(DiveAttack {
                speed,
                max_duration,
                destination: Vec2::ZERO,
                elapsed: 0.0,
                diving: false,
            }),
            AttackConfig::Shoot {
                projectile_speed,
                arc_height,
                aim_time,
                projectile_damage,
                projectile_lifetime,
                ..
            } => Attack::Shoot(ShootAttack {
                projectile_speed,
                arc_height,
                aim_time,
                damage: projectile_damage,
                lifetime: projectile_lifetime,
                origin: Vec2::ZERO,
                target: Vec2::ZERO,
                elapsed: 0.0,
                aiming: false,
                loaded: false,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Attack::Charge(_) => "charge",
            Attack::Dive(_) => "dive",
            Attack::Shoot(_) => "shoot",
        }
    }

    /// Variant-specific readiness on top of the brain's range/cooldown checks.
    /// Dive waits for an idle target; Shoot needs a clear line of sight.
    pub fn can_start_attack(
        &self,
        origin: Vec2,
        sensors: &EnemySensors,
        sight: &dyn LineOfSight,
    ) -> bool {
        if self.is_attacking() {
            return false;
        }
        match self {
            Attack::Charge(_) => true,
            Attack::Dive(_) => sensors.player_is_idle(),
            Attack::Shoot(_) => sensors.player_in_line_of_sight(origin, sight),
        }
    }

    /// Snapshot `target` and commit. Ignored while already attacking.
    pub fn start_attack(&mut self, origin: Vec2, target: Vec2) {
        if self.is_attacking() {
            return;
        }
        match self {
            Attack::Charge(c) => {
                c.direction = (target - origin).normalize_or_zero();
                c.start = origin;
                c.elapsed = 0.0;
                c.travelled = 0.0;
                c.charging = true;
            }
            Attack::Dive(d) => {
                d.destination = target;
                d.elapsed = 0.0;
                d.diving = true;
            }
            Attack::Shoot(s) => {
                s.origin = origin;
                s.target = target;
                s.elapsed = 0.0;
                s.aiming = true;
                s.loaded = true;
            }
        }
    }

    pub fn is_attacking(&self) -> bool {
        match self {
            Attack::Charge(c) => c.charging,
            Attack::Dive(d) => d.diving,
            Attack::Shoot(s) => s.aiming,
        }
    }

    /// Idempotent. The caller zeroes the body velocity.
    pub fn cancel_attack(&mut self) {
        match self {
            Attack::Charge(c) => c.charging = false,
            Attack::Dive(d) => d.diving = false,
            Attack::Shoot(s) => {
                s.aiming = false;
                s.loaded = false;
            }
        }
    }

    /// Releases the shell of the current Shoot commitment, at most once,
    /// even if the aim window already elapsed. Other variants never shoot.
    pub fn execute_shot(&mut self) -> Option<ShotRelease> {
        let Attack::Shoot(s) = self else {
            return None;
        };
        if !s.loaded {
            return None;
        }
        s.loaded = false;
        Some(ShotRelease {
            origin: s.origin,
            target: s.target,
            speed: s.projectile_speed,
            arc_height: s.arc_height,
            damage: s.damage,
            lifetime: s.lifetime,
        })
    }

    /// Integrate one fixed step. Returns the velocity to apply while the
    /// attack owns the body (zero on the step it finishes), `None` otherwise.
    pub fn fixed_tick(&mut self, position: Vec2, dt: f32) -> Option<Vec2> {
        match self {
            Attack::Charge(c) => {
                if !c.charging {
                    return None;
                }
                c.travelled = c.start.distance(position);
                c.elapsed += dt;
                if c.travelled >= c.max_distance || c.elapsed >= c.max_duration {
                    c.charging = false;
                    return Some(Vec2::ZERO);
                }
                Some(c.direction * c.speed)
            }
            Attack::Dive(d) => {
                if !d.diving {
                    return None;
                }
                d.elapsed += dt;
                if position.distance(d.destination) < DIVE_ARRIVAL_DISTANCE
                    || d.elapsed >= d.max_duration
                {
                    d.diving = false;
                    return Some(Vec2::ZERO);
                }
                Some((d.destination - position).normalize_or_zero() * d.speed)
            }
            Attack::Shoot(s) => {
                if !s.aiming {
                    return None;
                }
                s.elapsed += dt;
                if s.elapsed >= s.aim_time {
                    s.aiming = false;
                }
                Some(Vec2::ZERO)
            }
        }
    }
}
