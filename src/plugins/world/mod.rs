//! World plugin: arena walls, floor and the wave goal, laid out from `GameData`.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::{Layer, inert};
use crate::common::state::GameState;
use crate::plugins::core::data::{ArenaLayout, GameData};

pub const WALL_THICKNESS: f32 = 0.75;
const TILE: f32 = 1.6;

/// Reward trigger shown between wave completion and the player's touch.
#[derive(Component, Debug, Clone, Copy)]
pub struct Goal;

/// Only the player can trip an active goal; an inactive one touches nothing.
pub fn goal_layers(active: bool) -> CollisionLayers {
    if active {
        CollisionLayers::new(Layer::Goal, [Layer::Player])
    } else {
        inert(Layer::Goal)
    }
}

pub fn plugin(app: &mut App) {
    app.add_systems(
        OnEnter(GameState::InGame),
        (spawn_arena, spawn_floor, spawn_goal),
    );
}

fn layout(data: Option<Res<GameData>>) -> ArenaLayout {
    data.map(|d| d.arena.clone()).unwrap_or_default()
}

fn spawn_arena(mut commands: Commands, data: Option<Res<GameData>>) {
    let [half_w, half_h] = layout(data).half_extents;
    let wall_color = Color::srgb(0.25, 0.27, 0.33);
    let t = WALL_THICKNESS;

    let wall_layers = CollisionLayers::new(
        Layer::World,
        [Layer::Player, Layer::Enemy, Layer::EnemyProjectile],
    );

    let mut spawn_wall = |name: &str, pos: Vec2, size: Vec2| {
        commands.spawn((
            Name::new(name.to_owned()),
            Sprite {
                color: wall_color,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_xyz(pos.x, pos.y, 0.0),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            wall_layers,
            DespawnOnExit(GameState::InGame),
        ));
    };

    let span_x = half_w * 2.0 + t * 2.0;
    spawn_wall("WallTop", Vec2::new(0.0, half_h + t * 0.5), Vec2::new(span_x, t));
    spawn_wall("WallBottom", Vec2::new(0.0, -half_h - t * 0.5), Vec2::new(span_x, t));
    spawn_wall("WallLeft", Vec2::new(-half_w - t * 0.5, 0.0), Vec2::new(t, half_h * 2.0));
    spawn_wall("WallRight", Vec2::new(half_w + t * 0.5, 0.0), Vec2::new(t, half_h * 2.0));
}

/// Checkerboard of solid-color sprites covering the arena.
fn spawn_floor(mut commands: Commands, data: Option<Res<GameData>>) {
    let [half_w, half_h] = layout(data).half_extents;
    let nx = (half_w / TILE).ceil() as i32;
    let ny = (half_h / TILE).ceil() as i32;

    (-ny..ny)
        .flat_map(|y| (-nx..nx).map(move |x| (x, y)))
        .for_each(|(x, y)| {
            let center = Vec2::new((x as f32 + 0.5) * TILE, (y as f32 + 0.5) * TILE);
            let color = if (x + y).rem_euclid(2) == 0 {
                Color::srgb(0.14, 0.14, 0.16)
            } else {
                Color::srgb(0.12, 0.12, 0.14)
            };

            commands.spawn((
                Sprite::from_color(color, Vec2::splat(TILE)),
                Transform::from_xyz(center.x, center.y, -1.0),
                DespawnOnExit(GameState::InGame),
            ));
        });
}

fn spawn_goal(mut commands: Commands, data: Option<Res<GameData>>) {
    let arena = layout(data);
    let at = Vec2::from(arena.goal_position);
    let size = Vec2::from(arena.goal_size);

    commands.spawn((
        Name::new("Goal"),
        Goal,
        Sprite {
            color: Color::srgb(0.95, 0.8, 0.25),
            custom_size: Some(size),
            ..default()
        },
        Transform::from_xyz(at.x, at.y, 0.5),
        Visibility::Hidden,
        Collider::rectangle(size.x, size.y),
        Sensor,
        CollisionEventsEnabled,
        goal_layers(false),
        DespawnOnExit(GameState::InGame),
    ));
}

#[cfg(test)]
mod tests;
