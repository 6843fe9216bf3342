//! Modifier catalogue records and their effects.

use std::sync::Arc;

use bevy::prelude::*;
use serde::Deserialize;

use crate::common::error::GameError;
use crate::plugins::health::Health;
use crate::plugins::player::MovementModifiers;
use crate::plugins::qte::QteManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ModifierKind {
    Good,
    Bad,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub enum ModifierEffect {
    /// Pushes one horizontal inversion.
    MirrorControls,
    /// `+percent`% max health, ratio preserved.
    MaxHealth { percent: f32 },
    /// Instant; never reverted.
    Heal { amount: i32 },
    MoveSpeed { multiplier: f32 },
    PerfectZone { multiplier: f32 },
    GoodZone { multiplier: f32 },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModifierData {
    pub id: String,
    pub name: String,
    pub kind: ModifierKind,
    pub effect: ModifierEffect,
}

/// How many modifiers of each kind one offer slot draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct OfferRecipe {
    pub good: usize,
    pub bad: usize,
    pub neutral: usize,
}

/// One pick-able bundle. Modifiers are shared with the catalogue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierOffer {
    pub mods: Vec<Arc<ModifierData>>,
}

impl ModifierOffer {
    pub fn names(&self) -> Vec<&str> {
        self.mods.iter().map(|m| m.name.as_str()).collect()
    }
}

/// Everything a modifier may act on. A `None` is a missing collaborator.
#[derive(Default)]
pub struct ModifierTargets<'a> {
    pub movement: Option<&'a mut MovementModifiers>,
    pub health: Option<&'a mut Health>,
    pub qte: Option<&'a mut QteManager>,
}

/// Undo data for a revertible effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Undo {
    MirrorControls,
    MaxHealth { multiplier: f32 },
    MoveSpeed { multiplier: f32 },
    PerfectZone { multiplier: f32 },
    GoodZone { multiplier: f32 },
}

fn missing(owner: &str, collaborator: &'static str) {
    warn!("{}", GameError::missing(owner, collaborator));
}

impl ModifierEffect {
    /// Apply to `targets`. `Some` is a revertible effect to track.
    pub fn apply(&self, owner: &str, targets: &mut ModifierTargets) -> Option<Undo> {
        match *self {
            ModifierEffect::MirrorControls => {
                let Some(movement) = targets.movement.as_deref_mut() else {
                    missing(owner, "player movement");
                    return None;
                };
                movement.push_invert_horizontal();
                Some(Undo::MirrorControls)
            }
            ModifierEffect::MaxHealth { percent } => {
                let Some(health) = targets.health.as_deref_mut() else {
                    missing(owner, "player health");
                    return None;
                };
                let multiplier = 1.0 + percent / 100.0;
                health.scale_max(multiplier);
                Some(Undo::MaxHealth { multiplier })
            }
            ModifierEffect::Heal { amount } => {
                match targets.health.as_deref_mut() {
                    Some(health) => health.heal(amount),
                    None => missing(owner, "player health"),
                }
                None
            }
            ModifierEffect::MoveSpeed { multiplier } => {
                let Some(movement) = targets.movement.as_deref_mut() else {
                    missing(owner, "player movement");
                    return None;
                };
                movement.scale_speed(multiplier);
                Some(Undo::MoveSpeed { multiplier })
            }
            ModifierEffect::PerfectZone { multiplier } => {
                let Some(qte) = targets.qte.as_deref_mut() else {
                    missing(owner, "qte manager");
                    return None;
                };
                qte.scale_perfect_zone(multiplier);
                Some(Undo::PerfectZone { multiplier })
            }
            ModifierEffect::GoodZone { multiplier } => {
                let Some(qte) = targets.qte.as_deref_mut() else {
                    missing(owner, "qte manager");
                    return None;
                };
                qte.scale_good_zone(multiplier);
                Some(Undo::GoodZone { multiplier })
            }
        }
    }
}

impl Undo {
    pub fn revert(&self, owner: &str, targets: &mut ModifierTargets) {
        match *self {
            Undo::MirrorControls => match targets.movement.as_deref_mut() {
                Some(movement) => movement.pop_invert_horizontal(),
                None => missing(owner, "player movement"),
            },
            Undo::MaxHealth { multiplier } => match targets.health.as_deref_mut() {
                Some(health) => health.unscale_max(multiplier),
                None => missing(owner, "player health"),
            },
            Undo::MoveSpeed { multiplier } => match targets.movement.as_deref_mut() {
                Some(movement) => movement.unscale_speed(multiplier),
                None => missing(owner, "player movement"),
            },
            Undo::PerfectZone { multiplier } => match targets.qte.as_deref_mut() {
                Some(qte) => qte.unscale_perfect_zone(multiplier),
                None => missing(owner, "qte manager"),
            },
            Undo::GoodZone { multiplier } => match targets.qte.as_deref_mut() {
                Some(qte) => qte.unscale_good_zone(multiplier),
                None => missing(owner, "qte manager"),
            },
        }
    }
}
