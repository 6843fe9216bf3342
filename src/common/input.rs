//! Per-tick input signals.
//!
//! Devices are sampled exactly once per frame (`GameplaySet::Input`); every
//! gameplay consumer reads this resource instead of `ButtonInput` so the
//! core can be driven headless.

use bevy::prelude::*;

/// Number of distinct QTE buttons.
pub const QTE_BUTTONS: usize = 4;

#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct GameplayInput {
    /// Normalized or zero.
    pub move_axis: Vec2,
    /// Melee swing.
    pub attack: bool,
    /// Cast the selected spell (starts a QTE).
    pub cast: bool,
    /// Cycle to the next spell.
    pub magic_select: bool,
    /// Was-pressed flags for the four QTE buttons, in `QteKey` order.
    pub qte_pressed: [bool; QTE_BUTTONS],
    /// Zero-based offer index from the digit row.
    pub offer_choice: Option<usize>,
}

impl GameplayInput {
    pub fn any_qte_pressed(&self) -> bool {
        self.qte_pressed.iter().any(|p| *p)
    }
}
