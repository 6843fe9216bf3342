//! Feature plugins.

use bevy::prelude::*;

pub mod core;
pub mod enemies;
pub mod health;
pub mod magic;
pub mod modifiers;
pub mod physics;
pub mod player;
pub mod projectiles;
pub mod qte;
pub mod waves;
pub mod world;

// Render-only
pub mod camera;

/// Register gameplay plugins that work in headless tests.
///
/// `core` goes first: the others read `GameData` and `Tunables` at build time.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    health::plugin(app);
    world::plugin(app);
    player::plugin(app);
    enemies::plugin(app);
    projectiles::plugin(app);
    qte::plugin(app);
    magic::plugin(app);
    modifiers::plugin(app);
    waves::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
}

/// Register all plugins (full app).
pub fn register_all(app: &mut App) {
    register_gameplay(app);
    register_render(app);
}
