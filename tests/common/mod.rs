//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides the core ECS runtime.
//! - `configure_headless` installs the gameplay plugins.
//! - time advances a fixed 1/60 s per update, and data and RNG seed are fixed.

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use arcane_waves::common::rng::GameRng;
use arcane_waves::plugins::core::data::GameData;

pub const FRAME: f32 = 1.0 / 60.0;

pub fn app_headless() -> App {
    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        FRAME,
    )));
    app.insert_resource(GameData::default());
    app.insert_resource(GameRng::from_seed(7));

    arcane_waves::game::configure_headless(&mut app);
    // `App::run` normally does this; tests drive `update` by hand.
    app.finish();
    app.cleanup();
    app
}

pub fn step(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

pub fn count<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> usize {
    let world = app.world_mut();
    world.query_filtered::<Entity, F>().iter(world).count()
}
