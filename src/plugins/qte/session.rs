//! Timing-bar scoring engine.
//!
//! ```text
//! Idle --start--> Waiting (start_delay, progress pinned at 0)
//!                   |
//!                   v
//!                 Running: progress = (elapsed - start_delay) / bar_duration
//!                   | any press judges the button under the cursor, cursor += 1
//!                   v
//!                 progress >= 1 --> Finished { score, max } --> Idle
//! ```

use bevy::prelude::*;
use serde::Deserialize;

use crate::common::input::QTE_BUTTONS;

/// Zone multipliers never shrink a window below this fraction.
pub const MIN_ZONE_MULTIPLIER: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum QteKey {
    Q,
    W,
    E,
    R,
}

impl QteKey {
    pub const ALL: [QteKey; QTE_BUTTONS] = [QteKey::Q, QteKey::W, QteKey::E, QteKey::R];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key_code(self) -> KeyCode {
        match self {
            QteKey::Q => KeyCode::KeyQ,
            QteKey::W => KeyCode::KeyW,
            QteKey::E => KeyCode::KeyE,
            QteKey::R => KeyCode::KeyR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct QteButton {
    pub key: QteKey,
    /// Where on the bar, in `[0, 1]`, the press should land.
    pub target_position: f32,
}

impl QteButton {
    pub fn new(key: QteKey, target_position: f32) -> Self {
        Self {
            key,
            target_position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct QteSettings {
    pub start_delay: f32,
    pub bar_duration: f32,
    pub perfect_zone_size: f32,
    pub good_zone_size: f32,
}

impl Default for QteSettings {
    fn default() -> Self {
        Self {
            start_delay: 1.0,
            bar_duration: 2.0,
            perfect_zone_size: 0.05,
            good_zone_size: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitGrade {
    Perfect,
    Good,
    Miss,
}

impl HitGrade {
    pub fn points(self) -> u32 {
        match self {
            HitGrade::Perfect => 3,
            HitGrade::Good => 1,
            HitGrade::Miss => 0,
        }
    }
}

/// What one `QteManager::tick` did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QteTick {
    Idle,
    Waiting,
    Running { progress: f32 },
    Judged { index: usize, grade: HitGrade },
    Finished { score: u32, max: u32 },
}

#[derive(Debug, Clone)]
struct QteSession {
    buttons: Vec<QteButton>,
    cursor: usize,
    score: u32,
    elapsed: f32,
    progress: f32,
}

#[derive(Resource, Debug, Clone)]
pub struct QteManager {
    settings: QteSettings,
    session: Option<QteSession>,
    /// Unclamped products of every applied scale; reads apply the floor.
    perfect_zone_scale: f32,
    good_zone_scale: f32,
}

impl Default for QteManager {
    fn default() -> Self {
        Self::new(QteSettings::default())
    }
}

impl QteManager {
    pub fn new(settings: QteSettings) -> Self {
        Self {
            settings,
            session: None,
            perfect_zone_scale: 1.0,
            good_zone_scale: 1.0,
        }
    }

    /// Begin a session; an unfinished one is discarded.
    pub fn start(&mut self, buttons: Vec<QteButton>) {
        if self.session.is_some() {
            debug!("qte superseded by a new session");
        }
        info!("qte started with {} buttons", buttons.len());
        self.session = Some(QteSession {
            buttons,
            cursor: 0,
            score: 0,
            elapsed: 0.0,
            progress: 0.0,
        });
    }

    /// Advance by `dt` of real time. `pressed` holds this tick's was-pressed
    /// flags in `QteKey` order.
    pub fn tick(&mut self, dt: f32, pressed: [bool; QTE_BUTTONS]) -> QteTick {
        let settings = self.settings;
        let Some(session) = self.session.as_mut() else {
            return QteTick::Idle;
        };

        session.elapsed += dt;
        if session.elapsed < settings.start_delay {
            session.progress = 0.0;
            return QteTick::Waiting;
        }

        session.progress = if settings.bar_duration > 0.0 {
            (session.elapsed - settings.start_delay) / settings.bar_duration
        } else {
            1.0
        };

        if session.progress >= 1.0 {
            let score = session.score;
            let max = HitGrade::Perfect.points() * session.buttons.len() as u32;
            self.session = None;
            info!("qte finished: {score}/{max}");
            return QteTick::Finished { score, max };
        }

        let progress = session.progress;
        if !pressed.iter().any(|p| *p) {
            return QteTick::Running { progress };
        }
        let Some(button) = session.buttons.get(session.cursor).copied() else {
            return QteTick::Running { progress };
        };

        let index = session.cursor;
        let grade = if pressed[button.key.index()] {
            self.judge(progress, button.target_position)
        } else {
            HitGrade::Miss
        };

        // Re-borrow: `judge` needed `&self`.
        if let Some(session) = self.session.as_mut() {
            session.score += grade.points();
            session.cursor += 1;
        }
        debug!("qte button {}: {grade:?}", index + 1);
        QteTick::Judged { index, grade }
    }

    /// Grade a correct-key press at `progress` against `target`.
    pub fn judge(&self, progress: f32, target: f32) -> HitGrade {
        let distance = (progress - target).abs();
        if distance <= self.settings.perfect_zone_size * self.perfect_zone_multiplier() {
            HitGrade::Perfect
        } else if distance <= self.settings.good_zone_size * self.good_zone_multiplier() {
            HitGrade::Good
        } else {
            HitGrade::Miss
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn progress(&self) -> f32 {
        self.session.as_ref().map_or(0.0, |s| s.progress)
    }

    pub fn cursor(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.cursor)
    }

    pub fn score(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.score)
    }

    pub fn settings(&self) -> &QteSettings {
        &self.settings
    }

    /// Effective multiplier, never below `MIN_ZONE_MULTIPLIER`.
    pub fn perfect_zone_multiplier(&self) -> f32 {
        self.perfect_zone_scale.max(MIN_ZONE_MULTIPLIER)
    }

    pub fn set_perfect_zone_multiplier(&mut self, multiplier: f32) {
        self.perfect_zone_scale = multiplier;
        debug!("perfect zone x{:.2}", self.perfect_zone_multiplier());
    }

    pub fn scale_perfect_zone(&mut self, multiplier: f32) {
        self.set_perfect_zone_multiplier(self.perfect_zone_scale * multiplier);
    }

    /// Exact inverse of `scale_perfect_zone`, whatever the floor did.
    pub fn unscale_perfect_zone(&mut self, multiplier: f32) {
        if multiplier.abs() > f32::EPSILON {
            self.set_perfect_zone_multiplier(self.perfect_zone_scale / multiplier);
        }
    }

    pub fn good_zone_multiplier(&self) -> f32 {
        self.good_zone_scale.max(MIN_ZONE_MULTIPLIER)
    }

    pub fn set_good_zone_multiplier(&mut self, multiplier: f32) {
        self.good_zone_scale = multiplier;
        debug!("good zone x{:.2}", self.good_zone_multiplier());
    }

    pub fn scale_good_zone(&mut self, multiplier: f32) {
        self.set_good_zone_multiplier(self.good_zone_scale * multiplier);
    }

    pub fn unscale_good_zone(&mut self, multiplier: f32) {
        if multiplier.abs() > f32::EPSILON {
            self.set_good_zone_multiplier(self.good_zone_scale / multiplier);
        }
    }
}
