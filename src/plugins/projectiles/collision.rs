use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use super::components::Projectile;
use crate::common::layers::{Layer, is_in_layer};
use crate::plugins::health::Health;

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn targets(ev: &CollisionStart) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget {
            collider: ev.collider1,
            body: ev.body1,
        },
        CollisionTarget {
            collider: ev.collider2,
            body: ev.body2,
        },
    )
}

/// Shell vs world: despawn. Shell vs player: damage once, despawn.
pub fn resolve_projectile_hits(
    mut commands: Commands,
    mut started: MessageReader<CollisionStart>,
    q_projectiles: Query<&Projectile>,
    q_layers: Query<&CollisionLayers>,
    mut q_health: Query<&mut Health>,
    mut spent: Local<HashSet<Entity>>,
) {
    spent.clear();

    for ev in started.read() {
        let (t1, t2) = targets(ev);

        let p1 = q_projectiles.contains(t1.collider);
        let p2 = q_projectiles.contains(t2.collider);
        if !(p1 ^ p2) {
            continue;
        }
        let (shell_side, other_side) = if p1 { (t1, t2) } else { (t2, t1) };

        if spent.contains(&shell_side.collider) {
            continue;
        }

        let Ok(other_layers) = q_layers.get(other_side.collider) else {
            continue;
        };
        let Ok(projectile) = q_projectiles.get(shell_side.collider) else {
            continue;
        };

        if is_in_layer(other_layers, Layer::Player) {
            if let Ok(mut health) = q_health.get_mut(other_side.gameplay_owner()) {
                health.take_damage(projectile.damage, None);
                debug!("mortar hit player for {}", projectile.damage);
            }
        } else if !is_in_layer(other_layers, Layer::World) {
            continue;
        }

        spent.insert(shell_side.collider);
        commands.entity(shell_side.collider).try_despawn();
    }
}
