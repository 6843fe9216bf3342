//! Collision layers.

use avian2d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug)]
pub enum Layer {
    #[default]
    Default,
    World,
    Player,
    Enemy,
    EnemyProjectile,
    Goal,
}

/// Membership kept, filters cleared: the collider stops interacting without
/// a structural change.
#[inline]
pub fn inert(membership: Layer) -> CollisionLayers {
    CollisionLayers::new(membership, LayerMask::NONE)
}

#[inline]
pub fn is_in_layer(layers: &CollisionLayers, layer: Layer) -> bool {
    layers.memberships.has_all(layer)
}
