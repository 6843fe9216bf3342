//! Run modifiers: catalogue, offers, stacking and LIFO reversal.
//!
//! The manager is a resource built once from `GameData`. It has no systems:
//! the wave flow drives it (offers at the goal, `revert_all` on run reset)
//! and lends it the player's components through `ModifierTargets`.

pub mod data;
pub mod manager;

use bevy::prelude::*;

use crate::plugins::core::data::GameData;

pub use data::{ModifierData, ModifierEffect, ModifierKind, ModifierOffer, ModifierTargets, OfferRecipe};
pub use manager::{ActiveEffect, EffectHandle, ModifierManager};

pub fn plugin(app: &mut App) {
    let manager = app
        .world()
        .get_resource::<GameData>()
        .map(|data| ModifierManager::new(data.modifiers.iter().cloned(), data.offer_recipes.clone()))
        .unwrap_or_default();

    info!(
        "modifier pools: {} good, {} bad, {} neutral",
        manager.pool_len(ModifierKind::Good),
        manager.pool_len(ModifierKind::Bad),
        manager.pool_len(ModifierKind::Neutral),
    );
    app.insert_resource(manager);
}
