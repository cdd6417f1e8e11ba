//! Exit-button and door systems.
//!
//! Standing in the button volume starts the door opening; the environment
//! integrates the swing and this module mirrors the resulting yaw onto the
//! door's scene entity.

use bevy::prelude::*;

use crate::level::{LevelEnvironment, MeshEntityMap};
use crate::player::Player;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Update, (press_exit_button, animate_door).chain());
}

fn press_exit_button(mut env: ResMut<LevelEnvironment>, player: Single<&Player>) {
    let position = player.controller.position();
    if env.0.at_exit_button(position) {
        if env.0.door().map(|d| !d.is_opening()).unwrap_or(false) {
            info!("exit button pressed; the door swings open");
        }
        env.0.open_door();
    }
}

fn animate_door(
    time: Res<Time>,
    mut env: ResMut<LevelEnvironment>,
    mapping: Res<MeshEntityMap>,
    mut transforms: Query<&mut Transform>,
) {
    env.0.update(time.delta_secs());

    let Some(door) = env.0.door() else {
        return;
    };
    if !door.is_opening() {
        return;
    }
    let Some(&entity) = mapping.0.get(&door.source()) else {
        return;
    };
    if let Ok(mut transform) = transforms.get_mut(entity) {
        transform.rotation = Quat::from_rotation_y(door.yaw());
    }
}
