//! Enemy locomotion: produces a desired velocity, never touches physics.
//!
//! The fixed-step system copies `velocity()` into avian's `LinearVelocity`.

use bevy::prelude::*;

/// Patrol flips direction within this distance of the current endpoint.
pub const PATROL_SWITCH_DISTANCE: f32 = 0.2;

#[derive(Debug, Clone, Copy)]
struct PatrolRoute {
    a: Vec2,
    b: Vec2,
    heading_to_b: bool,
}

impl PatrolRoute {
    #[inline]
    fn current(&self) -> Vec2 {
        if self.heading_to_b { self.b } else { self.a }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnemyMovement {
    velocity: Vec2,
    route: Option<PatrolRoute>,
    facing_left: bool,
}

impl EnemyMovement {
    pub fn move_towards(&mut self, position: Vec2, target: Vec2, speed: f32) {
        self.velocity = (target - position).normalize_or_zero() * speed;
        self.face_towards(position, target);
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    /// The route is latched on first use and heads to `b` first.
    pub fn patrol_between_points(&mut self, position: Vec2, a: Vec2, b: Vec2, speed: f32) {
        let route = self.route.get_or_insert(PatrolRoute {
            a,
            b,
            heading_to_b: true,
        });

        let target = route.current();
        if position.distance(target) < PATROL_SWITCH_DISTANCE {
            route.heading_to_b = !route.heading_to_b;
        }
        let target = route.current();

        self.move_towards(position, target, speed);
    }

    pub fn face_towards(&mut self, position: Vec2, target: Vec2) {
        let dx = target.x - position.x;
        if dx != 0.0 {
            self.facing_left = dx < 0.0;
        }
    }

    /// Forget the latched route; the next patrol starts towards `b` again.
    pub fn reset_patrol(&mut self) {
        self.route = None;
        self.stop();
    }

    /// Used by attacks that drive the body directly.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
        if velocity.x != 0.0 {
            self.facing_left = velocity.x < 0.0;
        }
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn facing_left(&self) -> bool {
        self.facing_left
    }

    pub fn patrol_target(&self) -> Option<Vec2> {
        self.route.map(|r| r.current())
    }
}
