//! QTE plugin: the scoring engine as a resource, ticked on real time.
//!
//! Starting a session is the caller's job (spell casting freezes the gate
//! and calls `QteManager::start`). This plugin ends it: on finish it releases
//! the gate and writes `QteCompleted`.

pub mod session;

use bevy::prelude::*;

use crate::common::input::GameplayInput;
use crate::common::state::{GameplayGate, GameplaySet};
use crate::plugins::core::data::GameData;

pub use session::{
    HitGrade, MIN_ZONE_MULTIPLIER, QteButton, QteKey, QteManager, QteSettings, QteTick,
};

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QteCompleted {
    pub score: u32,
    pub max: u32,
}

/// Feedback hook, one per judged button.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QteJudged {
    pub index: usize,
    pub grade: HitGrade,
}

pub fn plugin(app: &mut App) {
    let settings = app
        .world()
        .get_resource::<GameData>()
        .map(|data| data.qte)
        .unwrap_or_default();

    app.insert_resource(QteManager::new(settings));
    app.add_message::<QteCompleted>();
    app.add_message::<QteJudged>();

    app.add_systems(Update, tick_qte.in_set(GameplaySet::Logic));
}

/// Real time, so the session keeps running while virtual time is paused.
pub fn tick_qte(
    time: Res<Time<Real>>,
    input: Res<GameplayInput>,
    mut qte: ResMut<QteManager>,
    mut gate: ResMut<GameplayGate>,
    mut judged: MessageWriter<QteJudged>,
    mut completed: MessageWriter<QteCompleted>,
) {
    if !qte.is_running() {
        return;
    }

    match qte.tick(time.delta_secs(), input.qte_pressed) {
        QteTick::Judged { index, grade } => {
            judged.write(QteJudged { index, grade });
        }
        QteTick::Finished { score, max } => {
            gate.release();
            completed.write(QteCompleted { score, max });
        }
        QteTick::Idle | QteTick::Waiting | QteTick::Running { .. } => {}
    }
}
