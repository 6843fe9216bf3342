//! Timed pushback after a hit.
//!
//! While active, the push owns the body's velocity: locomotion systems skip
//! entities whose `Knockback::is_active` is set.

use bevy::prelude::*;

pub const DEFAULT_KNOCKBACK_FORCE: f32 = 5.0;
pub const DEFAULT_KNOCKBACK_DURATION: f32 = 0.2;

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Knockback {
    force: f32,
    duration: f32,
    elapsed: f32,
    direction: Vec2,
    active: bool,
}

impl Default for Knockback {
    fn default() -> Self {
        Self::new(DEFAULT_KNOCKBACK_FORCE, DEFAULT_KNOCKBACK_DURATION)
    }
}

/// Ease-in-out from 1 at `t = 0` down to 0 at `t = 1`.
pub fn falloff(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - t * t * (3.0 - 2.0 * t)
}

impl Knockback {
    pub fn new(force: f32, duration: f32) -> Self {
        Self {
            force: force.max(0.0),
            duration: duration.max(0.0),
            elapsed: 0.0,
            direction: Vec2::ZERO,
            active: false,
        }
    }

    /// Restarts any push in progress. A zero direction (attacker on top of
    /// the victim) does nothing.
    pub fn start(&mut self, direction: Vec2) {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO || self.duration <= 0.0 {
            return;
        }
        self.direction = direction;
        self.elapsed = 0.0;
        self.active = true;
    }

    pub fn cancel(&mut self) {
        self.active = false;
        self.elapsed = 0.0;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Velocity for this step, then advance by `dt`. `None` once finished.
    pub fn tick(&mut self, dt: f32) -> Option<Vec2> {
        if !self.active {
            return None;
        }
        if self.elapsed >= self.duration {
            self.cancel();
            return None;
        }
        let push = self.direction * self.force * falloff(self.elapsed / self.duration);
        self.elapsed += dt;
        Some(push)
    }
}
