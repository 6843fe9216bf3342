mod common;

use std::sync::Arc;

use bevy::prelude::*;

use arcane_waves::plugins::enemies::brain::{EnemyBrain, EnemyStateKind};
use arcane_waves::plugins::enemies::config::EnemyConfig;
use arcane_waves::plugins::enemies::enemy_bundle;
use arcane_waves::plugins::player::Player;

fn state_of(app: &App, enemy: Entity) -> EnemyStateKind {
    app.world().get::<EnemyBrain>(enemy).unwrap().state()
}

#[test]
fn charger_near_the_player_telegraphs_then_attacks() {
    let mut app = common::app_headless();
    common::step(&mut app, 2);

    let player_at = {
        let world = app.world_mut();
        world
            .query_filtered::<&Transform, With<Player>>()
            .single(world)
            .unwrap()
            .translation
            .truncate()
    };

    let config = Arc::new(EnemyConfig::charger());
    let prepare = config.prepare_time;
    let enemy = app
        .world_mut()
        .spawn(enemy_bundle(
            "test charger".into(),
            config,
            player_at + Vec2::new(3.0, 0.0),
            0.0,
        ))
        .id();

    common::step(&mut app, 3);
    assert_eq!(state_of(&app, enemy), EnemyStateKind::PrepareAttack);

    let frames = (prepare / common::FRAME).ceil() as usize + 2;
    common::step(&mut app, frames);
    assert_ne!(
        state_of(&app, enemy),
        EnemyStateKind::PrepareAttack,
        "telegraph ends after prepare_time"
    );
    assert_ne!(state_of(&app, enemy), EnemyStateKind::Patrol);
}
