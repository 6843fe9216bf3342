//! Per-archetype enemy data.
//!
//! One `EnemyConfig` per archetype, loaded once and shared read-only by every
//! instance through `Arc`.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnemyConfig {
    pub name: String,
    #[serde(default = "default_max_health")]
    pub max_health: i32,
    pub patrol_speed: f32,
    pub detection_range: f32,
    pub contact_damage: i32,
    pub contact_damage_cooldown: f32,
    /// Telegraph duration.
    pub prepare_time: f32,
    /// Punish window.
    pub recover_time: f32,
    /// Patrol endpoints are spawn ± this on x.
    #[serde(default = "default_patrol_distance")]
    pub patrol_distance: f32,
    /// `None` is a misconfigured archetype: it patrols and never attacks.
    #[serde(default)]
    pub attack: Option<AttackConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub enum AttackConfig {
    Charge {
        speed: f32,
        max_distance: f32,
        max_duration: f32,
        cooldown: f32,
    },
    Dive {
        speed: f32,
        cooldown: f32,
        idle_detection_time: f32,
        idle_position_threshold: f32,
        /// Safety stop if the destination is never reached.
        #[serde(default = "default_dive_max_duration")]
        max_duration: f32,
    },
    Shoot {
        projectile_speed: f32,
        arc_height: f32,
        /// How long the shooter stays committed after the attack starts.
        aim_time: f32,
        cooldown: f32,
        projectile_damage: i32,
        projectile_lifetime: f32,
    },
}

/// Idle-detection parameters, only present for diving archetypes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdleDetection {
    pub detection_time: f32,
    pub position_threshold: f32,
}

const FALLBACK_ATTACK_COOLDOWN: f32 = 3.0;

fn default_max_health() -> i32 {
    3
}

fn default_patrol_distance() -> f32 {
    3.0
}

fn default_dive_max_duration() -> f32 {
    3.0
}

impl AttackConfig {
    pub fn cooldown(&self) -> f32 {
        match *self {
            AttackConfig::Charge { cooldown, .. }
            | AttackConfig::Dive { cooldown, .. }
            | AttackConfig::Shoot { cooldown, .. } => cooldown,
        }
    }

    pub fn idle_detection(&self) -> Option<IdleDetection> {
        match *self {
            AttackConfig::Dive {
                idle_detection_time,
                idle_position_threshold,
                ..
            } => Some(IdleDetection {
                detection_time: idle_detection_time,
                position_threshold: idle_position_threshold,
            }),
            _ => None,
        }
    }
}

impl EnemyConfig {
    pub fn attack_cooldown(&self) -> f32 {
        self.attack
            .as_ref()
            .map_or(FALLBACK_ATTACK_COOLDOWN, AttackConfig::cooldown)
    }

    pub fn idle_detection(&self) -> Option<IdleDetection> {
        self.attack.as_ref().and_then(AttackConfig::idle_detection)
    }

    fn base(name: &str, patrol_distance: f32, attack: AttackConfig) -> Self {
        Self {
            name: name.to_owned(),
            max_health: default_max_health(),
            patrol_speed: 2.0,
            detection_range: 5.0,
            contact_damage: 1,
            contact_damage_cooldown: 1.0,
            prepare_time: 0.8,
            recover_time: 1.5,
            patrol_distance,
            attack: Some(attack),
        }
    }

    pub fn charger() -> Self {
        Self::base(
            "Charger",
            3.0,
            AttackConfig::Charge {
                speed: 8.0,
                max_distance: 10.0,
                max_duration: 2.0,
                cooldown: 3.0,
            },
        )
    }

    pub fn flyer() -> Self {
        Self::base(
            "Flyer",
            5.0,
            AttackConfig::Dive {
                speed: 12.0,
                cooldown: 5.0,
                idle_detection_time: 2.0,
                idle_position_threshold: 0.1,
                max_duration: default_dive_max_duration(),
            },
        )
    }

    pub fn shooter() -> Self {
        Self::base(
            "Shooter",
            4.0,
            AttackConfig::Shoot {
                projectile_speed: 6.0,
                arc_height: 3.0,
                aim_time: 1.2,
                cooldown: 4.0,
                projectile_damage: 2,
                projectile_lifetime: 5.0,
            },
        )
    }
}
