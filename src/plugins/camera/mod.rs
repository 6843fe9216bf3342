//! Camera plugin: a 2D camera in world meters that eases towards the player.
//!
//! A system cannot hold `Query<&Transform>` and `Query<&mut Transform>` at the
//! same time unless Bevy can prove the queries are disjoint. `Without<...>`
//! filters encode that.
//!
//! ```text
//! OnEnter(InGame): spawn MainCamera (projection scaled to pixels_per_meter)
//! PostUpdate:      follow_player before transform propagation
//! ```

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::player::Player;

#[derive(Component)]
pub struct MainCamera {
    pub responsiveness: f32,
}

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_camera)
        .add_systems(
            PostUpdate,
            follow_player
                .before(TransformSystems::Propagate)
                .run_if(in_state(GameState::InGame)),
        );
}

fn spawn_camera(mut commands: Commands, tunables: Option<Res<Tunables>>) {
    let ppm = tunables.map_or(40.0, |t| t.pixels_per_meter).max(1.0);

    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        Projection::from(OrthographicProjection {
            scale: 1.0 / ppm,
            ..OrthographicProjection::default_2d()
        }),
        MainCamera { responsiveness: 5.0 },
        Transform::from_xyz(0.0, 0.0, 999.0),
        DespawnOnExit(GameState::InGame),
    ));
}

fn follow_player(
    time: Res<Time<Real>>,
    q_player: Query<&Transform, (With<Player>, Without<MainCamera>)>,
    mut q_cam: Query<(&mut Transform, &MainCamera), Without<Player>>,
) {
    let (Ok(tf_player), Ok((mut tf_cam, cam))) = (q_player.single(), q_cam.single_mut()) else {
        return;
    };

    let dt = time.delta_secs();
    let alpha = 1.0 - (-cam.responsiveness * dt).exp();

    let target = tf_player.translation.truncate();
    let current = tf_cam.translation.truncate();
    let next = current.lerp(target, alpha);
    tf_cam.translation.x = next.x;
    tf_cam.translation.y = next.y;
}
