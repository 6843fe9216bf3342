//! Physics plugin: avian2d in meters, top-down (no gravity).

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

pub fn plugin(app: &mut App) {
    let length_unit = app
        .world()
        .get_resource::<Tunables>()
        .map_or(1.0, |t| t.length_unit);
    app.add_plugins(PhysicsPlugins::default().with_length_unit(length_unit));
    app.insert_resource(Gravity(Vec2::ZERO));
}
