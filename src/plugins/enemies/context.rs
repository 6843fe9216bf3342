//! Per-enemy state bag read and written by the FSM.

use std::sync::Arc;

use bevy::prelude::*;

use super::attacks::Attack;
use super::config::EnemyConfig;
use super::movement::EnemyMovement;
use super::sensors::EnemySensors;
use crate::common::timer::CooldownTimer;

/// Owned by exactly one `EnemyBrain`.
///
/// Modules are optional: an absent one is a missing collaborator and the
/// states degrade around it instead of failing.
#[derive(Debug, Clone)]
pub struct EnemyContext {
    pub name: String,
    pub config: Arc<EnemyConfig>,
    pub spawn_position: Vec2,
    /// Refreshed from the transform before every tick.
    pub position: Vec2,
    /// Snapshot taken when the telegraph starts.
    pub last_known_player_position: Vec2,
    pub attack_cooldown: CooldownTimer,
    pub movement: Option<EnemyMovement>,
    pub sensors: Option<EnemySensors>,
    pub attack: Option<Attack>,
}

impl EnemyContext {
    /// Fully equipped context for an archetype.
    pub fn new(name: impl Into<String>, config: Arc<EnemyConfig>, spawn_position: Vec2) -> Self {
        let attack = config.attack.as_ref().map(Attack::from_config);
        let sensors = EnemySensors::new(config.idle_detection());
        Self {
            name: name.into(),
            attack_cooldown: CooldownTimer::new(config.attack_cooldown()),
            config,
            spawn_position,
            position: spawn_position,
            last_known_player_position: spawn_position,
            movement: Some(EnemyMovement::default()),
            sensors: Some(sensors),
            attack,
        }
    }

    /// Current target position, falling back to the last snapshot.
    pub fn aim_point(&self) -> Vec2 {
        self.sensors
            .as_ref()
            .and_then(EnemySensors::target_position)
            .unwrap_or(self.last_known_player_position)
    }

    pub fn stop(&mut self) {
        if let Some(movement) = self.movement.as_mut() {
            movement.stop();
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.movement
            .as_ref()
            .map_or(Vec2::ZERO, EnemyMovement::velocity)
    }

    pub fn patrol_points(&self) -> (Vec2, Vec2) {
        let offset = Vec2::X * self.config.patrol_distance;
        (self.spawn_position - offset, self.spawn_position + offset)
    }
}
