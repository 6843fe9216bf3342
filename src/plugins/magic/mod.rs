//! Spell casting: the QTE's downstream consumer.
//!
//! ```text
//! cast input, cooldown ready, no QTE -> gate.freeze + QteManager::start
//! QteCompleted { score, max }        -> multiplier -> area damage around player
//! ```

use bevy::prelude::*;
use serde::Deserialize;

use crate::common::input::GameplayInput;
use crate::common::state::{GameplayGate, GameplaySet};
use crate::common::timer::CooldownTimer;
use crate::plugins::core::data::GameData;
use crate::plugins::enemies::Enemy;
use crate::plugins::health::{self, Health};
use crate::plugins::player::{Facing, Player};
use crate::plugins::qte::{QteButton, QteCompleted, QteManager};

/// Where a resolved spell lands, relative to the player.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub enum DamageArea {
    Circle {
        radius: f32,
    },
    /// Opens towards the player's facing.
    Cone {
        distance: f32,
        angle_degrees: f32,
    },
    /// `offset.x` points along the facing.
    Rectangle {
        size: [f32; 2],
        offset: [f32; 2],
    },
}

impl DamageArea {
    pub fn contains(&self, origin: Vec2, facing_right: bool, point: Vec2) -> bool {
        let delta = point - origin;
        match *self {
            DamageArea::Circle { radius } => delta.length() <= radius,
            DamageArea::Cone {
                distance,
                angle_degrees,
            } => {
                if delta.length() > distance {
                    return false;
                }
                if delta == Vec2::ZERO {
                    return true;
                }
                let forward = if facing_right { Vec2::X } else { Vec2::NEG_X };
                forward.angle_to(delta).abs().to_degrees() <= angle_degrees * 0.5
            }
            DamageArea::Rectangle { size, offset } => {
                let mut offset = Vec2::from(offset);
                if !facing_right {
                    offset.x = -offset.x;
                }
                let local = delta - offset;
                let half = Vec2::from(size) * 0.5;
                local.x.abs() <= half.x && local.y.abs() <= half.y
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpellData {
    pub name: String,
    pub buttons: Vec<QteButton>,
    pub base_damage: i32,
    pub area: DamageArea,
    /// Seconds after the cast before the next one.
    pub cooldown: f32,
}

/// 1.0 for a flawless run, 0.5 from half of the points (integer halving),
/// nothing below that.
pub fn damage_multiplier(score: u32, max: u32) -> f32 {
    if score >= max {
        1.0
    } else if score >= max / 2 {
        0.5
    } else {
        0.0
    }
}

#[inline]
pub fn spell_damage(base_damage: i32, multiplier: f32) -> i32 {
    (base_damage as f32 * multiplier).round() as i32
}

#[derive(Resource, Debug, Clone)]
pub struct SpellBook {
    spells: Vec<SpellData>,
    selected: usize,
    /// Spell whose QTE is running.
    casting: Option<usize>,
    cooldown: CooldownTimer,
}

impl SpellBook {
    pub fn new(spells: Vec<SpellData>) -> Self {
        if spells.is_empty() {
            warn!("spell book is empty; casting is disabled");
        }
        Self {
            spells,
            selected: 0,
            casting: None,
            cooldown: CooldownTimer::new(0.0),
        }
    }

    pub fn selected(&self) -> Option<&SpellData> {
        self.spells.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn cycle(&mut self) {
        if self.spells.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.spells.len();
        if let Some(spell) = self.selected() {
            info!("selected spell: {}", spell.name);
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown.is_ready()
    }

    pub fn tick(&mut self, dt: f32) {
        self.cooldown.tick(dt);
    }

    /// Commit the selected spell. Returns its QTE buttons, or `None` when
    /// nothing castable is selected.
    pub fn begin_cast(&mut self) -> Option<Vec<QteButton>> {
        let spell = self.spells.get(self.selected)?;
        if spell.buttons.is_empty() {
            warn!("spell '{}' has no QTE buttons", spell.name);
            return None;
        }
        let buttons = spell.buttons.clone();

        self.cooldown.set_duration(spell.cooldown);
        self.cooldown.start();
        info!("casting {} ({}s cooldown)", spell.name, self.cooldown.duration());
        self.casting = Some(self.selected);
        Some(buttons)
    }

    /// The spell of the session that just ended, if this book started it.
    pub fn finish_cast(&mut self) -> Option<&SpellData> {
        let index = self.casting.take()?;
        self.spells.get(index)
    }

    pub fn is_casting(&self) -> bool {
        self.casting.is_some()
    }
}

pub fn plugin(app: &mut App) {
    let spells = app
        .world()
        .get_resource::<GameData>()
        .map(|data| data.spells.clone())
        .unwrap_or_default();
    app.insert_resource(SpellBook::new(spells));

    app.add_systems(
        Update,
        (
            (tick_spell_cooldown, cycle_spell, begin_cast)
                .chain()
                .in_set(GameplaySet::Logic),
            resolve_cast
                .in_set(GameplaySet::Resolve)
                .before(health::report_deaths),
        ),
    );
}

fn tick_spell_cooldown(time: Res<Time>, mut book: ResMut<SpellBook>) {
    book.tick(time.delta_secs());
}

fn cycle_spell(input: Res<GameplayInput>, gate: Res<GameplayGate>, mut book: ResMut<SpellBook>) {
    if input.magic_select && !gate.input_frozen {
        book.cycle();
    }
}

pub fn begin_cast(
    input: Res<GameplayInput>,
    mut gate: ResMut<GameplayGate>,
    mut qte: ResMut<QteManager>,
    mut book: ResMut<SpellBook>,
) {
    if !input.cast || gate.input_frozen || qte.is_running() || !book.is_ready() {
        return;
    }
    let Some(buttons) = book.begin_cast() else {
        return;
    };
    gate.freeze();
    qte.start(buttons);
}

pub fn resolve_cast(
    mut completed: MessageReader<QteCompleted>,
    mut book: ResMut<SpellBook>,
    q_player: Query<(&Transform, Option<&Facing>), With<Player>>,
    mut q_enemies: Query<(&Transform, &mut Health), (With<Enemy>, Without<Player>)>,
) {
    for done in completed.read() {
        let Some(spell) = book.finish_cast() else {
            continue;
        };

        let multiplier = damage_multiplier(done.score, done.max);
        let damage = spell_damage(spell.base_damage, multiplier);
        info!(
            "{} resolved: {}/{} points, x{multiplier}",
            spell.name, done.score, done.max
        );
        if damage <= 0 {
            continue;
        }

        let Ok((player_tf, facing)) = q_player.single() else {
            continue;
        };
        let origin = player_tf.translation.truncate();
        let facing_right = facing.is_none_or(|f| f.right);

        let mut hits = 0;
        for (tf, mut health) in &mut q_enemies {
            if spell.area.contains(origin, facing_right, tf.translation.truncate()) {
                health.take_damage(damage, None);
                hits += 1;
            }
        }
        debug!("{} hit {hits} enemies for {damage}", spell.name);
    }
}
