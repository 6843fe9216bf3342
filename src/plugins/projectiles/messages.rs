//! Buffered spawn requests.
//!
//! Producers (shooter brains) only write intent; the spawner system is the
//! single consumer that creates projectile entities.

use bevy::prelude::*;

use crate::plugins::enemies::attacks::ShotRelease;

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct SpawnProjectileRequest {
    pub origin: Vec2,
    pub target: Vec2,
    pub speed: f32,
    pub arc_height: f32,
    pub damage: i32,
    pub lifetime: f32,
    pub owner: Option<Entity>,
}

impl SpawnProjectileRequest {
    pub fn mortar(shot: ShotRelease, owner: Entity) -> Self {
        Self {
            origin: shot.origin,
            target: shot.target,
            speed: shot.speed,
            arc_height: shot.arc_height,
            damage: shot.damage,
            lifetime: shot.lifetime,
            owner: Some(owner),
        }
    }
}
