//! The render camera reads the controller's active mount every frame.

use bevy::prelude::*;
use shared::CameraMount;

use crate::convert::render_point;
use crate::player::Player;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(PostUpdate, apply_mount);
}

fn add_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 30.0, 60.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Write whichever mount is active onto the camera transform. The rig owns
/// the pose; the render side never steers it.
fn apply_mount(
    mut camera: Single<&mut Transform, With<Camera3d>>,
    player: Single<&Player>,
) {
    match player.controller.camera_mount() {
        CameraMount::Orbit {
            position, target, ..
        } => {
            camera.translation = render_point(position);
            let target = render_point(target);
            camera.look_at(target, Vec3::Y);
        }
        CameraMount::FirstPerson { eye, yaw, pitch } => {
            camera.translation = render_point(eye);
            camera.rotation = Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0);
        }
    }
}
