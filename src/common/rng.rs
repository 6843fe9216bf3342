//! Session random source.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Seeded once per session. Gameplay code takes `&mut impl Rng`, so tests
/// pass their own seeded `StdRng` instead.
#[derive(Resource, Debug)]
pub struct GameRng(pub StdRng);

impl GameRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_seed(rand::random())
    }
}
