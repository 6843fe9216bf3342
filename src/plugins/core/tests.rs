use bevy::prelude::*;

use super::data::{DataLoadError, GameData};
use super::*;
use crate::common::test_utils::run_system_once;
use crate::plugins::magic::DamageArea;
use crate::plugins::modifiers::{ModifierEffect, ModifierKind};

#[test]
fn inserts_resources() {
    let mut app = App::new();
    app.insert_resource(GameData::default());
    plugin(&mut app);

    let world = app.world();
    assert!(world.get_resource::<Tunables>().is_some());
    assert!(world.get_resource::<ClearColor>().is_some());
    assert!(world.get_resource::<GameRng>().is_some());
    assert!(world.get_resource::<GameplayGate>().is_some());
    assert!(world.get_resource::<GameplayInput>().is_some());
}

#[test]
fn provided_game_data_is_kept() {
    let mut app = App::new();
    let mut data = GameData::default();
    data.waves.clear();
    app.insert_resource(data);
    plugin(&mut app);

    assert!(app.world().resource::<GameData>().waves.is_empty());
}

#[test]
fn paused_gate_stops_virtual_time() {
    let mut world = World::new();
    world.insert_resource(Time::<Virtual>::default());
    world.insert_resource(GameplayGate::default());

    world.resource_mut::<GameplayGate>().freeze();
    run_system_once(&mut world, apply_time_gate);
    assert_eq!(world.resource::<Time<Virtual>>().relative_speed(), 0.0);

    world.resource_mut::<GameplayGate>().release();
    run_system_once(&mut world, apply_time_gate);
    assert_eq!(world.resource::<Time<Virtual>>().relative_speed(), 1.0);
}

#[test]
fn bundled_data_file_parses() {
    let data = GameData::from_ron(
        include_str!("../../../assets/data/game_data.ron"),
        "game_data.ron",
    )
    .unwrap();

    assert_eq!(data.archetypes.len(), 3);
    assert!(!data.waves.is_empty());
    assert_eq!(data.offer_recipes.len(), 3);
    assert!(!data.spells.is_empty());
    assert!(!data.arena.spawn_points.is_empty());

    // Every wave names a known archetype.
    for wave in &data.waves {
        for entry in &wave.enemies {
            assert!(
                data.archetypes.iter().any(|a| a.name == entry.archetype),
                "unknown archetype {}",
                entry.archetype
            );
        }
    }
}

#[test]
fn defaults_cover_every_modifier_kind() {
    let data = GameData::default();
    for kind in [ModifierKind::Good, ModifierKind::Bad, ModifierKind::Neutral] {
        assert!(data.modifiers.iter().any(|m| m.kind == kind));
    }
    assert!(
        data.modifiers
            .iter()
            .any(|m| m.effect == ModifierEffect::MirrorControls)
    );
    assert!(matches!(data.spells[0].area, DamageArea::Circle { .. }));
}

#[test]
fn parse_errors_name_the_file() {
    let err = GameData::from_ron("(archetypes: oops)", "broken.ron").unwrap_err();
    assert!(matches!(err, DataLoadError::ParseError { .. }));
    assert!(err.to_string().contains("broken.ron"));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let path = "assets/data/does_not_exist.ron";
    assert!(matches!(
        GameData::load(path),
        Err(DataLoadError::FileNotFound(_))
    ));
    assert_eq!(GameData::load_or_default(path), GameData::default());
}
