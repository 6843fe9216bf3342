//! Offer generation, application and LIFO reversal.

use std::sync::Arc;

use bevy::prelude::*;
use rand::Rng;

use super::data::{ModifierData, ModifierKind, ModifierOffer, ModifierTargets, OfferRecipe, Undo};
use crate::common::error::GameError;

/// Identity of one applied effect, stable while it stays active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectHandle(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEffect {
    pub handle: EffectHandle,
    pub name: String,
    pub undo: Undo,
}

#[derive(Resource, Debug, Default, Clone)]
pub struct ModifierManager {
    good: Vec<Arc<ModifierData>>,
    bad: Vec<Arc<ModifierData>>,
    neutral: Vec<Arc<ModifierData>>,
    recipes: Vec<OfferRecipe>,
    /// Application order; reverted back to front.
    active: Vec<ActiveEffect>,
    next_handle: u64,
}

impl ModifierManager {
    /// Partition the catalogue into per-kind pools.
    pub fn new(modifiers: impl IntoIterator<Item = ModifierData>, recipes: Vec<OfferRecipe>) -> Self {
        let mut manager = Self {
            recipes,
            ..Self::default()
        };
        for modifier in modifiers {
            let modifier = Arc::new(modifier);
            match modifier.kind {
                ModifierKind::Good => manager.good.push(modifier),
                ModifierKind::Bad => manager.bad.push(modifier),
                ModifierKind::Neutral => manager.neutral.push(modifier),
            }
        }
        manager
    }

    pub fn pool_len(&self, kind: ModifierKind) -> usize {
        match kind {
            ModifierKind::Good => self.good.len(),
            ModifierKind::Bad => self.bad.len(),
            ModifierKind::Neutral => self.neutral.len(),
        }
    }

    /// One offer per slot, slot `i` following recipe `i`. Draws are without
    /// replacement across the whole call; the pools themselves are untouched.
    pub fn generate_offers<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<ModifierOffer> {
        let slots = if self.recipes.len() < n {
            warn!(
                "{}",
                GameError::ResourceExhausted {
                    resource: "offer recipes",
                    requested: n,
                    available: self.recipes.len(),
                }
            );
            self.recipes.len()
        } else {
            n
        };

        let mut good = self.good.clone();
        let mut bad = self.bad.clone();
        let mut neutral = self.neutral.clone();

        self.recipes[..slots]
            .iter()
            .map(|recipe| {
                let mut offer = ModifierOffer::default();
                pick_many(recipe.good, &mut good, &mut offer.mods, "good modifiers", rng);
                pick_many(recipe.bad, &mut bad, &mut offer.mods, "bad modifiers", rng);
                pick_many(recipe.neutral, &mut neutral, &mut offer.mods, "neutral modifiers", rng);
                offer
            })
            .collect()
    }

    /// Apply every modifier of `offer`; revertible ones are tracked.
    /// Returns the handles created by this call.
    pub fn apply_offer(
        &mut self,
        offer: &ModifierOffer,
        targets: &mut ModifierTargets,
    ) -> Vec<EffectHandle> {
        if offer.mods.is_empty() {
            warn!("applied an empty offer");
        }

        let mut handles = Vec::new();
        for modifier in &offer.mods {
            let Some(undo) = modifier.effect.apply(&modifier.name, targets) else {
                debug!("{} applied (one-shot)", modifier.name);
                continue;
            };
            let handle = EffectHandle(self.next_handle);
            self.next_handle += 1;
            info!("{} applied", modifier.name);
            self.active.push(ActiveEffect {
                handle,
                name: modifier.name.clone(),
                undo,
            });
            handles.push(handle);
        }
        handles
    }

    /// Revert everything, newest first. Returns handles in revert order.
    pub fn revert_all(&mut self, targets: &mut ModifierTargets) -> Vec<EffectHandle> {
        let mut reverted = Vec::with_capacity(self.active.len());
        while let Some(effect) = self.active.pop() {
            effect.undo.revert(&effect.name, targets);
            debug!("{} reverted", effect.name);
            reverted.push(effect.handle);
        }
        reverted
    }

    pub fn revert_effect_at(
        &mut self,
        index: usize,
        targets: &mut ModifierTargets,
    ) -> Result<EffectHandle, GameError> {
        if index >= self.active.len() {
            return Err(GameError::InvalidIndex {
                what: "active effect",
                index,
                len: self.active.len(),
            });
        }
        let effect = self.active.remove(index);
        effect.undo.revert(&effect.name, targets);
        Ok(effect.handle)
    }

    /// `false` when the handle is not active (already reverted or unknown).
    pub fn revert_effect(&mut self, handle: EffectHandle, targets: &mut ModifierTargets) -> bool {
        let Some(index) = self.active.iter().position(|e| e.handle == handle) else {
            return false;
        };
        self.revert_effect_at(index, targets).is_ok()
    }

    #[inline]
    pub fn active_effects(&self) -> &[ActiveEffect] {
        &self.active
    }
}

fn pick_many<R: Rng + ?Sized>(
    count: usize,
    from: &mut Vec<Arc<ModifierData>>,
    to: &mut Vec<Arc<ModifierData>>,
    label: &'static str,
    rng: &mut R,
) {
    if count == 0 {
        return;
    }
    let count = if from.len() < count {
        warn!(
            "{}",
            GameError::ResourceExhausted {
                resource: label,
                requested: count,
                available: from.len(),
            }
        );
        from.len()
    } else {
        count
    };

    for _ in 0..count {
        let r = rng.random_range(0..from.len());
        to.push(from.swap_remove(r));
    }
}
