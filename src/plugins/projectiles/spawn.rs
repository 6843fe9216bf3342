use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use super::components::{Lifetime, MortarFlight, Projectile};
use super::messages::SpawnProjectileRequest;
use crate::common::layers::Layer;
use crate::common::state::GameState;

pub const PROJECTILE_RADIUS: f32 = 0.2;

/// Consumer: one sensor entity per request.
pub fn spawn_requested_projectiles(
    mut commands: Commands,
    mut requests: MessageReader<SpawnProjectileRequest>,
) {
    let layers = CollisionLayers::new(Layer::EnemyProjectile, [Layer::World, Layer::Player]);

    for req in requests.read() {
        debug!("mortar {:?} -> {:?}", req.origin, req.target);
        commands.spawn((
            Name::new("Mortar"),
            Projectile {
                damage: req.damage,
                owner: req.owner,
            },
            Lifetime::from_seconds(req.lifetime),
            MortarFlight::new(req.origin, req.target, req.speed, req.arc_height),
            Sprite {
                color: Color::srgb(1.0, 0.55, 0.15),
                custom_size: Some(Vec2::splat(PROJECTILE_RADIUS * 2.0)),
                ..default()
            },
            Transform::from_xyz(req.origin.x, req.origin.y, 2.0),
            RigidBody::Kinematic,
            Collider::circle(PROJECTILE_RADIUS),
            Sensor,
            layers,
            CollisionEventsEnabled,
            DespawnOnExit(GameState::InGame),
        ));
    }
}

/// Move shells along their arc; despawn on arrival or lifetime expiry.
pub fn advance_mortars(
    time: Res<Time>,
    mut commands: Commands,
    mut q: Query<(Entity, &mut MortarFlight, &mut Lifetime, &mut Transform), With<Projectile>>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    for (entity, mut flight, mut lifetime, mut tf) in &mut q {
        let p = flight.advance(dt);
        tf.translation.x = p.x;
        tf.translation.y = p.y;

        lifetime.tick(time.delta());
        if flight.arrived() || lifetime.is_finished() {
            commands.entity(entity).try_despawn();
        }
    }
}
