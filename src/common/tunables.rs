//! Tunable engine-side constants.
//!
//! Gameplay content (archetypes, waves, modifiers) lives in `GameData`;
//! these are the knobs that stay in code.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    /// World units are meters; avian's length unit follows.
    pub length_unit: f32,
    /// Meters per second before movement modifiers.
    pub player_speed: f32,
    pub player_max_health: i32,
    /// Seconds of invulnerability after the player is hit.
    pub player_invulnerability: f32,
    pub enemy_invulnerability: f32,
    /// Melee swing: circle centre this far ahead of the player.
    pub melee_range: f32,
    pub melee_radius: f32,
    pub melee_damage: i32,
    pub melee_cooldown: f32,
    /// Pushback the player receives from contact hits.
    pub knockback_force: f32,
    pub knockback_duration: f32,
    /// Screen pixels per world meter.
    pub pixels_per_meter: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            length_unit: 1.0,
            player_speed: 6.0,
            player_max_health: 5,
            player_invulnerability: 1.0,
            enemy_invulnerability: 0.0,
            melee_range: 1.5,
            melee_radius: 0.5,
            melee_damage: 1,
            melee_cooldown: 0.5,
            knockback_force: 5.0,
            knockback_duration: 0.2,
            pixels_per_meter: 40.0,
        }
    }
}
