mod common;

use bevy::prelude::*;

use arcane_waves::plugins::enemies::Enemy;
use arcane_waves::plugins::player::Player;
use arcane_waves::plugins::waves::{WaveManager, WavePhase};
use arcane_waves::plugins::world::Goal;

#[test]
fn boots_and_ticks() {
    let mut app = common::app_headless();
    common::step(&mut app, 3);
}

#[test]
fn entering_the_game_builds_the_arena_and_first_wave() {
    let mut app = common::app_headless();
    common::step(&mut app, 2);

    assert_eq!(common::count::<With<Player>>(&mut app), 1);
    assert_eq!(common::count::<With<Goal>>(&mut app), 1);
    // First wave: three chargers, all in the initial burst.
    assert_eq!(common::count::<With<Enemy>>(&mut app), 3);

    let walls = {
        let world = app.world_mut();
        world
            .query::<&Name>()
            .iter(world)
            .filter(|n| n.as_str().starts_with("Wall"))
            .count()
    };
    assert_eq!(walls, 4);

    let waves = app.world().resource::<WaveManager>();
    assert_eq!(waves.current_wave(), 0);
    assert_eq!(waves.phase(), WavePhase::Active);
    assert!(!waves.goal_active());
}

#[test]
fn goal_starts_hidden() {
    let mut app = common::app_headless();
    common::step(&mut app, 2);

    let world = app.world_mut();
    let vis = world
        .query_filtered::<&Visibility, With<Goal>>()
        .single(world)
        .unwrap();
    assert_eq!(*vis, Visibility::Hidden);
}
