use avian2d::prelude::*;
use bevy::prelude::*;

use super::*;
use crate::common::test_utils::run_system_once;

fn arena_world() -> World {
    let mut world = World::new();
    let mut data = GameData::default();
    data.arena.half_extents = [10.0, 6.0];
    data.arena.goal_position = [8.0, 0.0];
    world.insert_resource(data);
    world
}

#[test]
fn spawns_walls_around_the_arena() {
    let mut world = arena_world();
    run_system_once(&mut world, spawn_arena);

    let walls: Vec<(String, Vec3)> = world
        .query::<(&Name, &RigidBody, &Transform)>()
        .iter(&world)
        .filter(|(n, rb, _)| n.as_str().starts_with("Wall") && matches!(**rb, RigidBody::Static))
        .map(|(n, _, t)| (n.as_str().to_owned(), t.translation))
        .collect();
    assert_eq!(walls.len(), 4);

    let right = walls.iter().find(|(n, _)| n == "WallRight").unwrap();
    assert_eq!(right.1.x, 10.0 + WALL_THICKNESS * 0.5);
}

#[test]
fn floor_covers_the_arena() {
    let mut world = arena_world();
    run_system_once(&mut world, spawn_floor);

    // ceil(10 / 1.6) = 7, ceil(6 / 1.6) = 4 tiles per half axis.
    let tiles = world.query::<&Sprite>().iter(&world).count();
    assert_eq!(tiles, 14 * 8);
}

#[test]
fn goal_starts_hidden_and_inert() {
    let mut world = arena_world();
    run_system_once(&mut world, spawn_goal);

    let (vis, layers, transform) = world
        .query_filtered::<(&Visibility, &CollisionLayers, &Transform), With<Goal>>()
        .single(&world)
        .unwrap();
    assert_eq!(*vis, Visibility::Hidden);
    assert_eq!(layers.filters, LayerMask::NONE);
    assert_eq!(transform.translation.truncate(), Vec2::new(8.0, 0.0));
}

#[test]
fn active_goal_only_sees_the_player() {
    let layers = goal_layers(true);
    assert!(layers.memberships.has_all(Layer::Goal));
    assert!(layers.filters.has_all(Layer::Player));
    assert!(!layers.filters.has_all(Layer::Enemy));
}
