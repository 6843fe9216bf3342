//! Gameplay content loaded from `assets/data/game_data.ron`.
//!
//! Everything here is read once at startup and then shared read-only:
//! archetypes go to `EnemyArchetypes`, waves to `WaveManager`, the modifier
//! catalogue to `ModifierManager`, and so on. A missing or malformed file
//! falls back to the compiled-in defaults.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::plugins::enemies::config::EnemyConfig;
use crate::plugins::magic::{DamageArea, SpellData};
use crate::plugins::modifiers::{ModifierData, ModifierEffect, ModifierKind, OfferRecipe};
use crate::plugins::qte::{QteButton, QteKey, QteSettings};
use crate::plugins::waves::{SpawnSchedule, WaveDefinition, WaveEntry};

pub const GAME_DATA_PATH: &str = "assets/data/game_data.ron";

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },
}

/// Arena geometry, in meters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArenaLayout {
    /// Inner half width and half height; walls sit just outside.
    pub half_extents: [f32; 2],
    pub respawn_point: [f32; 2],
    pub goal_position: [f32; 2],
    pub goal_size: [f32; 2],
    pub spawn_points: Vec<[f32; 2]>,
}

impl Default for ArenaLayout {
    fn default() -> Self {
        Self {
            half_extents: [12.0, 7.0],
            respawn_point: [-9.0, 0.0],
            goal_position: [9.0, 0.0],
            goal_size: [1.5, 1.5],
            spawn_points: vec![
                [6.0, 4.5],
                [6.0, -4.5],
                [9.0, 2.0],
                [9.0, -2.0],
                [2.0, 5.0],
                [2.0, -5.0],
                [-2.0, 5.0],
                [-2.0, -5.0],
            ],
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
pub struct GameData {
    pub archetypes: Vec<EnemyConfig>,
    pub waves: Vec<WaveDefinition>,
    #[serde(default)]
    pub spawn_schedule: SpawnSchedule,
    pub modifiers: Vec<ModifierData>,
    /// Slot `i` of every offer bundle follows recipe `i`.
    pub offer_recipes: Vec<OfferRecipe>,
    #[serde(default)]
    pub qte: QteSettings,
    pub spells: Vec<SpellData>,
    #[serde(default)]
    pub arena: ArenaLayout,
}

fn wave(entries: &[(&str, usize)]) -> WaveDefinition {
    WaveDefinition {
        enemies: entries
            .iter()
            .map(|(archetype, count)| WaveEntry {
                archetype: (*archetype).to_owned(),
                count: *count,
            })
            .collect(),
    }
}

fn modifier(id: &str, name: &str, kind: ModifierKind, effect: ModifierEffect) -> ModifierData {
    ModifierData {
        id: id.to_owned(),
        name: name.to_owned(),
        kind,
        effect,
    }
}

impl Default for GameData {
    fn default() -> Self {
        use ModifierEffect as E;
        use ModifierKind::{Bad, Good, Neutral};

        Self {
            archetypes: vec![
                EnemyConfig::charger(),
                EnemyConfig::flyer(),
                EnemyConfig::shooter(),
            ],
            waves: vec![
                wave(&[("Charger", 3)]),
                wave(&[("Charger", 3), ("Flyer", 2)]),
                wave(&[("Charger", 3), ("Flyer", 3), ("Shooter", 2)]),
            ],
            spawn_schedule: SpawnSchedule::default(),
            modifiers: vec![
                modifier("vitality", "Vitality", Good, E::MaxHealth { percent: 25.0 }),
                modifier("mend", "Mend", Good, E::Heal { amount: 2 }),
                modifier("swift", "Swift Feet", Good, E::MoveSpeed { multiplier: 1.2 }),
                modifier("focus", "Focus", Good, E::PerfectZone { multiplier: 1.5 }),
                modifier("steady", "Steady Hands", Good, E::GoodZone { multiplier: 1.3 }),
                modifier("mirror", "Mirror Controls", Bad, E::MirrorControls),
                modifier("sluggish", "Sluggish", Bad, E::MoveSpeed { multiplier: 0.8 }),
                modifier("jitter", "Jitter", Bad, E::GoodZone { multiplier: 0.7 }),
                modifier("frail", "Frail", Bad, E::MaxHealth { percent: -20.0 }),
                modifier("drift", "Drift", Neutral, E::MoveSpeed { multiplier: 1.1 }),
                modifier("tunnel", "Tunnel Vision", Neutral, E::PerfectZone { multiplier: 1.25 }),
            ],
            offer_recipes: vec![
                OfferRecipe { good: 1, bad: 0, neutral: 0 },
                OfferRecipe { good: 1, bad: 1, neutral: 0 },
                OfferRecipe { good: 2, bad: 1, neutral: 1 },
            ],
            qte: QteSettings::default(),
            spells: vec![
                SpellData {
                    name: "Nova".to_owned(),
                    buttons: vec![
                        QteButton::new(QteKey::Q, 0.25),
                        QteButton::new(QteKey::W, 0.5),
                        QteButton::new(QteKey::E, 0.75),
                    ],
                    base_damage: 2,
                    area: DamageArea::Circle { radius: 3.0 },
                    cooldown: 4.0,
                },
                SpellData {
                    name: "Flame Fan".to_owned(),
                    buttons: vec![
                        QteButton::new(QteKey::R, 0.3),
                        QteButton::new(QteKey::E, 0.6),
                        QteButton::new(QteKey::Q, 0.85),
                    ],
                    base_damage: 3,
                    area: DamageArea::Cone {
                        distance: 4.0,
                        angle_degrees: 70.0,
                    },
                    cooldown: 6.0,
                },
            ],
            arena: ArenaLayout::default(),
        }
    }
}

impl GameData {
    pub fn from_ron(contents: &str, path: &str) -> Result<Self, DataLoadError> {
        ron::from_str(contents).map_err(|e| DataLoadError::ParseError {
            path: path.to_owned(),
            details: e.to_string(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataLoadError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        if !path.exists() {
            return Err(DataLoadError::FileNotFound(display));
        }
        let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
            path: display.clone(),
            details: e.to_string(),
        })?;
        Self::from_ron(&contents, &display)
    }

    /// Never fails: a bad file is logged and the defaults are used.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(data) => {
                info!(
                    "loaded game data: {} archetypes, {} waves, {} modifiers, {} spells",
                    data.archetypes.len(),
                    data.waves.len(),
                    data.modifiers.len(),
                    data.spells.len()
                );
                data
            }
            Err(e) => {
                warn!("{e}; using built-in game data");
                Self::default()
            }
        }
    }
}
