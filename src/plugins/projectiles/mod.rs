//! Projectiles plugin: message-based producer -> consumer spawning of enemy
//! mortar shells.
//!
//! ```text
//! Update / Logic     shooter brain releases -> SpawnProjectileRequest
//! Update / Resolve   spawn_requested_projectiles (single consumer)
//! Update / Logic     advance_mortars: arc flight, arrival, lifetime
//! FixedPostUpdate    resolve_projectile_hits after avian collision events
//! ```

pub mod collision;
pub mod components;
pub mod messages;
pub mod spawn;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::state::{GameState, GameplaySet};

pub fn plugin(app: &mut App) {
    app.add_message::<messages::SpawnProjectileRequest>();

    app.add_systems(
        Update,
        (
            spawn::advance_mortars.in_set(GameplaySet::Logic),
            spawn::spawn_requested_projectiles.in_set(GameplaySet::Resolve),
        ),
    );

    app.add_systems(
        FixedPostUpdate,
        collision::resolve_projectile_hits
            .after(CollisionEventSystems)
            .run_if(in_state(GameState::InGame)),
    );
}
