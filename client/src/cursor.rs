//! Cursor grab management for first-person look.
//!
//! The grab follows the controller's camera mode; Escape releases it at any
//! time (mirroring a browser revoking pointer lock), and clicking while in
//! first person re-engages it. Mouse deltas only reach the rig while
//! [`CursorGrabbed`] is set, so a revoked lock can never steer the camera.

use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow};
use shared::CameraMode;

use crate::player::Player;

/// Confirmed engagement state, fed into the core's pointer snapshot.
#[derive(Resource, Default)]
pub struct CursorGrabbed(pub bool);

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CursorGrabbed>();
    app.add_systems(
        Update,
        (follow_camera_mode, release_on_escape, regrab_on_click),
    );
}

/// Set cursor grab state, centering the cursor when grabbing.
fn set_cursor_grab(cursor: &mut CursorOptions, window: &mut Window, grabbed: bool) {
    if grabbed {
        // Native: Locked gives true mouse capture.
        // WASM: browsers only support Confined.
        #[cfg(not(target_family = "wasm"))]
        {
            cursor.grab_mode = CursorGrabMode::Locked;
        }
        #[cfg(target_family = "wasm")]
        {
            cursor.grab_mode = CursorGrabMode::Confined;
        }
        cursor.visible = false;
        let center = Vec2::new(window.width() / 2.0, window.height() / 2.0);
        window.set_cursor_position(Some(center));
    } else {
        cursor.grab_mode = CursorGrabMode::None;
        cursor.visible = true;
    }
}

/// Engage on entering first person, release unconditionally on leaving.
fn follow_camera_mode(
    mut last_mode: Local<Option<CameraMode>>,
    player: Single<&Player>,
    mut cursor: Single<&mut CursorOptions>,
    mut window: Single<&mut Window, With<PrimaryWindow>>,
    mut grabbed: ResMut<CursorGrabbed>,
) {
    let mode = player.controller.camera_mode();
    if *last_mode == Some(mode) {
        return;
    }
    *last_mode = Some(mode);

    let engage = mode == CameraMode::First;
    set_cursor_grab(&mut cursor, &mut window, engage);
    grabbed.0 = engage;
}

/// Escape drops the lock without leaving first person; look input simply
/// stops responding until re-engaged.
fn release_on_escape(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut cursor: Single<&mut CursorOptions>,
    mut window: Single<&mut Window, With<PrimaryWindow>>,
    mut grabbed: ResMut<CursorGrabbed>,
) {
    if keyboard.just_pressed(KeyCode::Escape) && grabbed.0 {
        set_cursor_grab(&mut cursor, &mut window, false);
        grabbed.0 = false;
    }
}

/// Clicking in first person re-engages a dropped lock.
fn regrab_on_click(
    mouse: Res<ButtonInput<MouseButton>>,
    player: Single<&Player>,
    mut cursor: Single<&mut CursorOptions>,
    mut window: Single<&mut Window, With<PrimaryWindow>>,
    mut grabbed: ResMut<CursorGrabbed>,
) {
    if player.controller.camera_mode() == CameraMode::First
        && !grabbed.0
        && mouse.just_pressed(MouseButton::Left)
    {
        set_cursor_grab(&mut cursor, &mut window, true);
        grabbed.0 = true;
    }
}
