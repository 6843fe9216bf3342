use avian2d::prelude::*;
use bevy::prelude::*;

use super::brain::{BrainEvent, EnemyBrain, EnemyStateKind};
use super::sensors::TargetSample;
use super::{ContactDamage, Enemy, EnemyStateChanged};
use crate::common::layers::Layer;
use crate::plugins::health::knockback::Knockback;
use crate::plugins::health::{Died, Health};
use crate::plugins::player::Player;
use crate::plugins::projectiles::messages::SpawnProjectileRequest;

const PATROL_COLOR: Color = Color::srgb(0.9, 0.25, 0.25);
const TELEGRAPH_COLOR: Color = Color::srgb(1.0, 0.85, 0.2);
const RECOVER_COLOR: Color = Color::srgb(0.55, 0.55, 0.6);

pub fn state_color(state: EnemyStateKind) -> Color {
    match state {
        EnemyStateKind::Patrol | EnemyStateKind::Attack => PATROL_COLOR,
        EnemyStateKind::PrepareAttack => TELEGRAPH_COLOR,
        EnemyStateKind::Recover => RECOVER_COLOR,
    }
}

/// Sample the player once, then run every brain's variable-rate tick.
///
/// Line of sight is a ray against Player | World, so walls occlude and other
/// enemies do not.
pub(super) fn tick_brains(
    time: Res<Time>,
    spatial: SpatialQuery,
    q_player: Query<(Entity, &Transform), With<Player>>,
    mut q_brains: Query<(&Transform, &mut EnemyBrain), Without<Player>>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    let target = q_player.single().ok().map(|(entity, tf)| TargetSample {
        entity,
        position: tf.translation.truncate(),
    });

    let filter = SpatialQueryFilter::from_mask([Layer::Player, Layer::World]);
    let sight = |from: Vec2, to: Vec2| -> Option<Entity> {
        let delta = to - from;
        let direction = Dir2::new(delta).ok()?;
        spatial
            .cast_ray(from, direction, delta.length(), true, &filter)
            .map(|hit| hit.entity)
    };

    for (tf, mut brain) in &mut q_brains {
        brain.observe(tf.translation.truncate(), target, dt);
        brain.tick(dt, &sight);
    }
}

/// Drain brain outboxes into messages.
pub(super) fn publish_brain_events(
    mut q_brains: Query<(Entity, &mut EnemyBrain)>,
    mut changed: MessageWriter<EnemyStateChanged>,
    mut shots: MessageWriter<SpawnProjectileRequest>,
) {
    for (entity, mut brain) in &mut q_brains {
        for event in brain.drain_events() {
            match event {
                BrainEvent::Entered { state, from } => {
                    changed.write(EnemyStateChanged {
                        entity,
                        from,
                        to: state,
                    });
                }
                BrainEvent::Exited(_) => {}
                BrainEvent::ShotReleased(shot) => {
                    shots.write(SpawnProjectileRequest::mortar(shot, entity));
                }
            }
        }
    }
}

/// The brain keeps integrating during a knockback; the push owns velocity.
pub(super) fn drive_enemy_motion(
    time: Res<Time>,
    mut q: Query<(
        &Transform,
        &mut EnemyBrain,
        &mut LinearVelocity,
        Option<&Knockback>,
    )>,
) {
    let dt = time.delta_secs();
    for (tf, mut brain, mut velocity, knockback) in &mut q {
        brain.fixed_tick(tf.translation.truncate(), dt);
        if knockback.is_some_and(Knockback::is_active) {
            continue;
        }
        velocity.0 = brain.velocity();
    }
}

pub(super) fn apply_contact_damage(
    time: Res<Time>,
    mut q_enemies: Query<(&Transform, &CollidingEntities, &mut ContactDamage), With<Enemy>>,
    mut q_player: Query<&mut Health, With<Player>>,
) {
    let dt = time.delta_secs();
    for (tf, touching, mut contact) in &mut q_enemies {
        contact.cooldown.tick(dt);
        if !contact.cooldown.is_ready() {
            continue;
        }

        let Some(player) = touching.iter().copied().find(|e| q_player.contains(*e)) else {
            continue;
        };
        if let Ok(mut health) = q_player.get_mut(player) {
            health.take_damage(contact.damage, Some(tf.translation.truncate()));
            contact.cooldown.start();
        }
    }
}

pub(super) fn despawn_dead_enemies(
    mut commands: Commands,
    mut died: MessageReader<Died>,
    q_enemies: Query<(), With<Enemy>>,
) {
    for death in died.read() {
        if q_enemies.contains(death.entity) {
            commands.entity(death.entity).try_despawn();
        }
    }
}

pub(super) fn present_enemy_state(
    mut changes: MessageReader<EnemyStateChanged>,
    mut q: Query<(&EnemyBrain, &mut Sprite), With<Enemy>>,
) {
    for change in changes.read() {
        if let Ok((_, mut sprite)) = q.get_mut(change.entity) {
            sprite.color = state_color(change.to);
        }
    }

    for (brain, mut sprite) in &mut q {
        let facing_left = brain.facing_left();
        if sprite.flip_x != facing_left {
            sprite.flip_x = facing_left;
        }
    }
}
