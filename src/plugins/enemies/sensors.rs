//! Range, line-of-sight and idle detection for one enemy.

use bevy::prelude::*;

use super::config::IdleDetection;

/// Ray cast seam. Systems back it with avian's `SpatialQuery`; tests use
/// closures.
pub trait LineOfSight {
    /// First entity hit travelling from `from` towards `to`, stopping at `to`.
    fn first_hit(&self, from: Vec2, to: Vec2) -> Option<Entity>;
}

impl<F> LineOfSight for F
where
    F: Fn(Vec2, Vec2) -> Option<Entity>,
{
    fn first_hit(&self, from: Vec2, to: Vec2) -> Option<Entity> {
        self(from, to)
    }
}

/// Where the tracked target was this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSample {
    pub entity: Entity,
    pub position: Vec2,
}

#[derive(Debug, Clone)]
pub struct EnemySensors {
    target: Option<TargetSample>,
    idle: Option<IdleDetection>,
    last_target_position: Option<Vec2>,
    idle_timer: f32,
}

impl EnemySensors {
    pub fn new(idle: Option<IdleDetection>) -> Self {
        Self {
            target: None,
            idle,
            last_target_position: None,
            idle_timer: 0.0,
        }
    }

    /// Feed this tick's target sample. `dt` is elapsed time, so idle
    /// detection does not depend on frame rate.
    pub fn observe(&mut self, target: Option<TargetSample>, dt: f32) {
        self.target = target;
        let Some(sample) = target else {
            return;
        };

        let Some(idle) = self.idle else {
            self.last_target_position = Some(sample.position);
            return;
        };

        let Some(last) = self.last_target_position else {
            self.last_target_position = Some(sample.position);
            return;
        };

        // The reference point only moves when the target does, so slow drift
        // below the threshold still accumulates towards "idle".
        if sample.position.distance(last) < idle.position_threshold {
            self.idle_timer += dt;
        } else {
            self.idle_timer = 0.0;
            self.last_target_position = Some(sample.position);
        }
    }

    #[inline]
    pub fn target(&self) -> Option<TargetSample> {
        self.target
    }

    #[inline]
    pub fn target_position(&self) -> Option<Vec2> {
        self.target.map(|t| t.position)
    }

    pub fn player_in_range(&self, origin: Vec2, range: f32) -> bool {
        self.target
            .is_some_and(|t| origin.distance(t.position) <= range)
    }

    /// True only when the first thing the ray meets is the target itself.
    pub fn player_in_line_of_sight(&self, origin: Vec2, sight: &dyn LineOfSight) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        sight.first_hit(origin, target.position) == Some(target.entity)
    }

    pub fn player_is_idle(&self) -> bool {
        self.idle
            .is_some_and(|idle| self.idle_timer >= idle.detection_time)
    }

    #[inline]
    pub fn idle_time(&self) -> f32 {
        self.idle_timer
    }
}
