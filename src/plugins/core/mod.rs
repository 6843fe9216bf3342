//! Core plugin: shared resources, game data, frame partitioning and the
//! pause gate.
//!
//! Must be registered first: the feature plugins read `GameData` and
//! `Tunables` while they build.

pub mod data;

use bevy::prelude::*;

use crate::common::input::GameplayInput;
use crate::common::rng::GameRng;
use crate::common::state::{GameState, GameplayGate, GameplaySet};
use crate::common::tunables::Tunables;
use data::{GAME_DATA_PATH, GameData};

pub fn plugin(app: &mut App) {
    if !app.world().contains_resource::<Tunables>() {
        app.insert_resource(Tunables::default());
    }
    // Tests and tools may provide their own data before the plugin runs.
    if !app.world().contains_resource::<GameData>() {
        app.insert_resource(GameData::load_or_default(GAME_DATA_PATH));
    }

    app.init_resource::<GameRng>()
        .init_resource::<GameplayGate>()
        .init_resource::<GameplayInput>()
        .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)));

    app.configure_sets(
        Update,
        (
            GameplaySet::Input,
            GameplaySet::Logic,
            GameplaySet::Resolve,
            GameplaySet::Presentation,
        )
            .chain()
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(Last, apply_time_gate);
}

/// Virtual time follows the gate: stopped while paused, normal otherwise.
pub fn apply_time_gate(gate: Res<GameplayGate>, mut virtual_time: ResMut<Time<Virtual>>) {
    let speed = if gate.paused { 0.0 } else { 1.0 };
    if virtual_time.relative_speed() != speed {
        virtual_time.set_relative_speed(speed);
        debug!("virtual time speed -> {speed}");
    }
}

#[cfg(test)]
mod tests;
