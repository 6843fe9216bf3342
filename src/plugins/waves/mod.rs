//! Waves plugin: spawn schedule, wave completion, goal and offer flow, run reset.
//!
//! ```text
//! OnEnter(InGame)     start_first_wave
//! Update / Logic      run_spawn_schedule, choose_offer_from_input
//! Update / Resolve    (after report_deaths, chained)
//!   track_enemy_deaths          Died -> WaveManager::on_enemy_died
//!   restart_run_on_player_death revert modifiers, reset player, restart
//!   resolve_offer_choice        OfferChosen -> apply, respawn, next wave
//!   publish_wave_events         manager outbox -> messages
//! Update / Presentation
//!   sync_goal           goal visibility + collision layers
//! FixedPostUpdate     detect_goal after avian collision events
//! ```

pub mod manager;
pub mod systems;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::state::{GameState, GameplaySet};
use crate::plugins::core::data::GameData;
use crate::plugins::health;
use crate::plugins::modifiers::ModifierOffer;

pub use manager::{SpawnOrder, SpawnSchedule, WaveDefinition, WaveEntry, WaveEvent, WaveManager, WavePhase};

/// Offers generated per goal touch.
pub const OFFER_COUNT: usize = 3;

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveStarted {
    /// Zero-based.
    pub index: usize,
    pub total: usize,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveCompleted {
    pub index: usize,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllWavesComplete;

/// For the offer UI.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct OffersPresented {
    pub offers: Vec<ModifierOffer>,
}

/// Zero-based pick among the presented offers.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferChosen {
    pub index: usize,
}

/// Offers awaiting a choice. Gameplay stays frozen while this is set.
#[derive(Resource, Debug, Default, Clone)]
pub struct PendingOffers {
    pub offers: Option<Vec<ModifierOffer>>,
}

impl PendingOffers {
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.offers.is_some()
    }
}

pub fn plugin(app: &mut App) {
    let manager = app
        .world()
        .get_resource::<GameData>()
        .map(|data| {
            WaveManager::new(
                data.waves.clone(),
                data.spawn_schedule,
                data.arena.spawn_points.iter().copied().map(Vec2::from).collect(),
            )
        })
        .unwrap_or_default();
    info!("{} waves configured", manager.wave_count());

    app.insert_resource(manager)
        .init_resource::<PendingOffers>()
        .add_message::<WaveStarted>()
        .add_message::<WaveCompleted>()
        .add_message::<AllWavesComplete>()
        .add_message::<OffersPresented>()
        .add_message::<OfferChosen>();

    app.add_systems(OnEnter(GameState::InGame), systems::start_first_wave);

    app.add_systems(
        Update,
        (
            (systems::run_spawn_schedule, systems::choose_offer_from_input)
                .in_set(GameplaySet::Logic),
            (
                systems::track_enemy_deaths,
                systems::restart_run_on_player_death,
                systems::resolve_offer_choice,
                systems::publish_wave_events,
            )
                .chain()
                .in_set(GameplaySet::Resolve)
                .after(health::report_deaths),
            systems::sync_goal.in_set(GameplaySet::Presentation),
        ),
    );

    app.add_systems(
        FixedPostUpdate,
        systems::detect_goal
            .after(CollisionEventSystems)
            .run_if(in_state(GameState::InGame)),
    );
}

#[cfg(test)]
mod tests;
