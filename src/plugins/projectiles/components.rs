use std::f32::consts::PI;

use bevy::prelude::*;

/// Hit payload of an enemy projectile.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub damage: i32,
    pub owner: Option<Entity>,
}

#[derive(Component, Debug, Clone, Deref, DerefMut)]
pub struct Lifetime(pub Timer);

impl Lifetime {
    pub fn from_seconds(seconds: f32) -> Self {
        Self(Timer::from_seconds(seconds.max(0.0), TimerMode::Once))
    }
}

/// Sine-arced interpolation from a fixed start to a fixed target.
///
/// `progress = clamp01(travelled / journey)`; the arc offset is added on y
/// and vanishes at both ends.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct MortarFlight {
    start: Vec2,
    target: Vec2,
    speed: f32,
    arc_height: f32,
    journey: f32,
    travelled: f32,
}

impl MortarFlight {
    pub fn new(start: Vec2, target: Vec2, speed: f32, arc_height: f32) -> Self {
        Self {
            start,
            target,
            speed,
            arc_height,
            journey: start.distance(target),
            travelled: 0.0,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.journey <= f32::EPSILON {
            return 1.0;
        }
        (self.travelled / self.journey).clamp(0.0, 1.0)
    }

    pub fn position(&self) -> Vec2 {
        let t = self.progress();
        let mut p = self.start.lerp(self.target, t);
        p.y += (t * PI).sin() * self.arc_height;
        p
    }

    /// Advance by `speed * dt` and return the new position.
    pub fn advance(&mut self, dt: f32) -> Vec2 {
        self.travelled += self.speed * dt;
        self.position()
    }

    #[inline]
    pub fn arrived(&self) -> bool {
        self.progress() >= 1.0
    }
}
