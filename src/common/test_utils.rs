//! Test helpers.
//!
//! `World::run_system_once` executes a system without a schedule. Commands it
//! queues are applied by the `world.flush()` that follows, so assertions see
//! spawned/despawned entities.

use std::time::Duration;

use bevy::ecs::message::{Message, Messages};
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// Insert a generic `Time` whose last delta is `dt` seconds.
pub fn insert_time_with_delta(world: &mut World, dt: f32) {
    let mut time = Time::<()>::default();
    time.advance_by(Duration::from_secs_f32(dt));
    world.insert_resource(time);
}

/// All messages of type `T` currently buffered in the world.
pub fn drain_messages<T: Message + Clone>(world: &mut World) -> Vec<T> {
    world
        .resource_mut::<Messages<T>>()
        .drain()
        .collect()
}

/// Tiny deterministic PRNG for property-style tests (xorshift64*).
#[derive(Clone, Copy)]
pub struct TestRng(u64);

impl TestRng {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        // 24 random bits -> float in [0,1)
        let v = (self.next_u64() >> 40) as u32;
        (v as f32) / ((1u32 << 24) as f32)
    }

    #[inline]
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        debug_assert!(hi >= lo);
        lo + (hi - lo) * self.next_f32()
    }

    #[inline]
    pub fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n.max(1) as u64) as usize
    }
}
