//! Enemies plugin: archetype registry, spawning, FSM driving, contact damage.
//!
//! ```text
//! Update / Logic
//!   tick_brains           observe player (+ ray cast), tick each EnemyBrain
//!   publish_brain_events  outbox -> EnemyStateChanged, SpawnProjectileRequest
//! FixedUpdate
//!   drive_enemy_motion    attack motion integration -> LinearVelocity
//!   apply_contact_damage  CollidingEntities + per-enemy CooldownTimer
//! Update / Resolve
//!   despawn_dead_enemies  Died -> despawn
//! Update / Presentation
//!   present_enemy_state   telegraph/recover tint, flip_x
//! ```
//!
//! Each brain only touches its own context; there is no cross-enemy state.

use std::sync::Arc;

use avian2d::prelude::*;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::error::GameError;
use crate::common::layers::Layer;
use crate::common::state::{GameState, GameplaySet};
use crate::common::timer::CooldownTimer;
use crate::plugins::core::data::GameData;
use crate::plugins::health::knockback::Knockback;
use crate::plugins::health::{self, Health};

pub mod attacks;
pub mod brain;
pub mod config;
pub mod context;
pub mod movement;
pub mod sensors;
pub mod systems;

use brain::{EnemyBrain, EnemyStateKind};
use config::EnemyConfig;
use context::EnemyContext;

pub const ENEMY_RADIUS: f32 = 0.4;

#[derive(Component, Debug, Clone, Copy)]
pub struct Enemy;

/// Damage dealt to the player while touching, paced by its own cooldown.
#[derive(Component, Debug, Clone)]
pub struct ContactDamage {
    pub damage: i32,
    pub cooldown: CooldownTimer,
}

impl ContactDamage {
    pub fn from_config(config: &EnemyConfig) -> Self {
        Self {
            damage: config.contact_damage,
            cooldown: CooldownTimer::new(config.contact_damage_cooldown),
        }
    }
}

/// Presentation hook for FSM transitions.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyStateChanged {
    pub entity: Entity,
    pub from: Option<EnemyStateKind>,
    pub to: EnemyStateKind,
}

/// Archetype configs by name, each shared by all of its instances.
#[derive(Resource, Debug, Default, Clone)]
pub struct EnemyArchetypes {
    by_name: HashMap<String, Arc<EnemyConfig>>,
}

impl EnemyArchetypes {
    pub fn from_configs(configs: impl IntoIterator<Item = EnemyConfig>) -> Self {
        let by_name = configs
            .into_iter()
            .map(|c| (c.name.clone(), Arc::new(c)))
            .collect();
        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<Arc<EnemyConfig>> {
        self.by_name.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

pub fn plugin(app: &mut App) {
    let archetypes = app
        .world()
        .get_resource::<GameData>()
        .map(|data| EnemyArchetypes::from_configs(data.archetypes.iter().cloned()))
        .unwrap_or_default();
    info!("registered {} enemy archetypes", archetypes.len());

    app.insert_resource(archetypes);
    app.add_message::<EnemyStateChanged>();

    app.add_systems(
        Update,
        (
            (systems::tick_brains, systems::publish_brain_events)
                .chain()
                .in_set(GameplaySet::Logic),
            systems::despawn_dead_enemies
                .in_set(GameplaySet::Resolve)
                .after(health::report_deaths),
            systems::present_enemy_state.in_set(GameplaySet::Presentation),
        ),
    );

    app.add_systems(
        FixedUpdate,
        (systems::drive_enemy_motion, systems::apply_contact_damage)
            .run_if(in_state(GameState::InGame)),
    );
}

/// Everything an enemy instance carries. `label` names the brain in logs.
pub fn enemy_bundle(
    label: String,
    config: Arc<EnemyConfig>,
    position: Vec2,
    invulnerability: f32,
) -> impl Bundle {
    let layers = CollisionLayers::new(Layer::Enemy, [Layer::World, Layer::Player]);
    let health = Health::new(config.max_health, invulnerability);
    let contact = ContactDamage::from_config(&config);
    let brain = EnemyBrain::new(EnemyContext::new(label.clone(), config, position));

    (
        Name::new(label),
        Enemy,
        brain,
        health,
        Knockback::default(),
        contact,
        Sprite {
            color: systems::state_color(EnemyStateKind::Patrol),
            custom_size: Some(Vec2::splat(ENEMY_RADIUS * 2.0)),
            ..default()
        },
        Transform::from_xyz(position.x, position.y, 1.0),
        RigidBody::Dynamic,
        Collider::circle(ENEMY_RADIUS),
        layers,
        LockedAxes::ROTATION_LOCKED,
        LinearVelocity::ZERO,
        CollidingEntities::default(),
        DespawnOnExit(GameState::InGame),
    )
}

/// Spawn one archetype instance. Unknown archetypes are a missing
/// collaborator: logged, nothing spawned.
pub fn spawn_enemy(
    commands: &mut Commands,
    archetypes: &EnemyArchetypes,
    archetype: &str,
    position: Vec2,
    invulnerability: f32,
) -> Option<Entity> {
    let Some(config) = archetypes.get(archetype) else {
        warn!(
            "{}",
            GameError::missing(format!("spawn of '{archetype}'"), "enemy archetype")
        );
        return None;
    };

    let entity = commands.spawn_empty().id();
    let label = format!("{archetype} {entity}");
    commands
        .entity(entity)
        .insert(enemy_bundle(label, config, position, invulnerability));
    Some(entity)
}
