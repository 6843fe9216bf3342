//! Global state machine, frame partitioning and the gameplay freeze contract.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    InGame,
}

/// Ordered slices of the variable-rate tick.
///
/// ```text
/// Input -> Logic -> Resolve -> Presentation
/// ```
/// - Input: sample devices once into `GameplayInput`.
/// - Logic: FSM ticks, QTE, spell casting, spawn schedule, projectile flight.
/// - Resolve: death reports and everything that reacts to them.
/// - Presentation: tints, goal visibility.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameplaySet {
    Input,
    Logic,
    Resolve,
    Presentation,
}

/// Explicit pause contract.
///
/// `input_frozen` disables player movement and casting.
/// `paused` stops virtual time (enemy FSMs, physics, spawn schedule);
/// the QTE engine keeps running because it ticks on real time.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GameplayGate {
    pub input_frozen: bool,
    pub paused: bool,
}

impl GameplayGate {
    pub fn freeze(&mut self) {
        self.input_frozen = true;
        self.paused = true;
    }

    pub fn release(&mut self) {
        self.input_frozen = false;
        self.paused = false;
    }
}
