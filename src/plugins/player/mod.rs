//! Player plugin.
//!
//! Pipeline:
//! - Update / Input: sample devices once into `GameplayInput`
//! - Update / Logic: melee swing (`combat`)
//! - FixedUpdate: apply velocity to the dynamic rigid body, unless a
//!   knockback owns it
//!
//! While `GameplayGate::input_frozen` is set (QTE, offer choice) the body is
//! held still and neither melee nor casting fire.

pub mod combat;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::input::GameplayInput;
use crate::common::layers::Layer;
use crate::common::state::{GameState, GameplayGate, GameplaySet};
use crate::common::tunables::Tunables;
use crate::plugins::core::data::GameData;
use crate::plugins::health::Health;
use crate::plugins::health::knockback::Knockback;
use crate::plugins::qte::QteKey;
use combat::MeleeAttack;

pub const PLAYER_RADIUS: f32 = 0.35;

#[derive(Component, Debug, Clone, Copy)]
pub struct Player;

/// Last non-zero horizontal direction; cone spells aim with it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facing {
    pub right: bool,
}

impl Default for Facing {
    fn default() -> Self {
        Self { right: true }
    }
}

/// Run modifiers acting on player locomotion.
///
/// Horizontal inversion is a counter: every push is paired with a pop, and
/// input is mirrored while the depth is odd, so stacked inversions cancel.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct MovementModifiers {
    speed_multiplier: f32,
    invert_horizontal_depth: u32,
}

impl Default for MovementModifiers {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            invert_horizontal_depth: 0,
        }
    }
}

impl MovementModifiers {
    #[inline]
    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn scale_speed(&mut self, multiplier: f32) {
        self.speed_multiplier *= multiplier;
    }

    pub fn unscale_speed(&mut self, multiplier: f32) {
        if multiplier.abs() > f32::EPSILON {
            self.speed_multiplier /= multiplier;
        }
    }

    pub fn push_invert_horizontal(&mut self) {
        self.invert_horizontal_depth += 1;
    }

    pub fn pop_invert_horizontal(&mut self) {
        self.invert_horizontal_depth = self.invert_horizontal_depth.saturating_sub(1);
    }

    #[inline]
    pub fn invert_horizontal_depth(&self) -> u32 {
        self.invert_horizontal_depth
    }

    #[inline]
    pub fn is_horizontal_inverted(&self) -> bool {
        self.invert_horizontal_depth % 2 == 1
    }

    /// Move axis after inversion, before speed.
    pub fn apply(&self, axis: Vec2) -> Vec2 {
        if self.is_horizontal_inverted() {
            Vec2::new(-axis.x, axis.y)
        } else {
            axis
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<GameplayInput>()
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(Update, sample_input.in_set(GameplaySet::Input))
        .add_systems(Update, combat::melee_attack.in_set(GameplaySet::Logic))
        .add_systems(
            FixedUpdate,
            apply_movement.run_if(in_state(GameState::InGame)),
        );
}

fn spawn(
    mut commands: Commands,
    tunables: Option<Res<Tunables>>,
    data: Option<Res<GameData>>,
) {
    let tunables = tunables.map(|t| t.clone()).unwrap_or_default();
    let at = data
        .map(|d| Vec2::from(d.arena.respawn_point))
        .unwrap_or(Vec2::ZERO);

    let layers = CollisionLayers::new(
        Layer::Player,
        [Layer::World, Layer::Enemy, Layer::EnemyProjectile, Layer::Goal],
    );

    commands.spawn((
        Name::new("Player"),
        Player,
        Facing::default(),
        MovementModifiers::default(),
        Health::new(tunables.player_max_health, tunables.player_invulnerability),
        Knockback::new(tunables.knockback_force, tunables.knockback_duration),
        MeleeAttack::from_tunables(&tunables),
        Sprite {
            color: Color::srgb(0.2, 0.75, 0.9),
            custom_size: Some(Vec2::splat(PLAYER_RADIUS * 2.0)),
            ..default()
        },
        Transform::from_xyz(at.x, at.y, 1.0),
        RigidBody::Dynamic,
        Collider::circle(PLAYER_RADIUS),
        layers,
        LockedAxes::ROTATION_LOCKED,
        LinearVelocity::ZERO,
        DespawnOnExit(GameState::InGame),
    ));
}

const OFFER_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// Without a keyboard resource (headless) the signals are left as written.
fn sample_input(keys: Option<Res<ButtonInput<KeyCode>>>, mut input: ResMut<GameplayInput>) {
    let Some(keys) = keys else {
        return;
    };

    let mut axis = Vec2::ZERO;
    if keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        axis.y += 1.0;
    }
    if keys.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        axis.y -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        axis.x -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        axis.x += 1.0;
    }

    input.move_axis = axis.normalize_or_zero();
    input.attack = keys.just_pressed(KeyCode::Space);
    input.cast = keys.just_pressed(KeyCode::KeyF);
    input.magic_select = keys.just_pressed(KeyCode::Tab);
    input.qte_pressed = QteKey::ALL.map(|k| keys.just_pressed(k.key_code()));
    input.offer_choice = OFFER_KEYS.iter().position(|k| keys.just_pressed(*k));
}

fn apply_movement(
    tunables: Res<Tunables>,
    input: Res<GameplayInput>,
    gate: Option<Res<GameplayGate>>,
    mut q_player: Query<
        (
            &mut LinearVelocity,
            &MovementModifiers,
            &mut Facing,
            Option<&Knockback>,
        ),
        With<Player>,
    >,
) {
    let Ok((mut vel, modifiers, mut facing, knockback)) = q_player.single_mut() else {
        return;
    };
    if knockback.is_some_and(Knockback::is_active) {
        return;
    }

    if gate.is_some_and(|g| g.input_frozen) {
        vel.0 = Vec2::ZERO;
        return;
    }

    let axis = modifiers.apply(input.move_axis);
    if axis.x != 0.0 {
        facing.right = axis.x > 0.0;
    }
    vel.0 = axis * tunables.player_speed * modifiers.speed_multiplier();
}

/// Teleport the player and drop any momentum.
pub fn place_player(transform: &mut Transform, velocity: &mut LinearVelocity, at: Vec2) {
    transform.translation.x = at.x;
    transform.translation.y = at.y;
    velocity.0 = Vec2::ZERO;
}
