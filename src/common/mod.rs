//! Common, shared types.

pub mod error;
pub mod input;
pub mod layers;
pub mod rng;
pub mod state;
pub mod timer;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
