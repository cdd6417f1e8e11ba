//! The playable character: spawn, per-frame controller step, and transform
//! mirroring.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use leafwing_input_manager::prelude::ActionState;
use shared::{CameraMode, CharacterController, NullAnimations, PointerState};
use shared::character::CameraRig;
use shared::settings::{CAMERA_TARGET_HEIGHT, THIRD_PERSON_DISTANCE, THIRD_PERSON_HEIGHT};
use shared::types::Point3;

use crate::animation::{AnimationLink, ClipDriver};
use crate::convert::{render_point, render_quat};
use crate::cursor::CursorGrabbed;
use crate::input::{self, InputAction};
use crate::level::LevelEnvironment;

/// The character entity; owns the shared controller.
#[derive(Component)]
pub struct Player {
    pub controller: CharacterController,
}

/// The visual model child, hidden in first person.
#[derive(Component)]
pub struct CharacterModel;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Update, (spawn_player, step, sync_model_visibility).chain());
}

/// Spawn the character once the environment is ready enough to place it.
fn spawn_player(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    env: Res<LevelEnvironment>,
    existing: Query<(), With<Player>>,
) {
    if !env.0.is_loaded() || !existing.is_empty() {
        return;
    }

    let mut rng = rand::thread_rng();
    let spawn = env.0.spawn_point(&mut rng);

    // Third-person start: camera behind the spawn point, aimed at the chest.
    let rig = CameraRig::third_person(
        Point3::new(
            spawn.x,
            spawn.y + THIRD_PERSON_HEIGHT,
            spawn.z + THIRD_PERSON_DISTANCE,
        ),
        Point3::new(spawn.x, spawn.y + CAMERA_TARGET_HEIGHT, spawn.z),
    );
    let controller = CharacterController::new(spawn, rig, &mut NullAnimations);

    info!("player spawned at {:.2} {:.2} {:.2}", spawn.x, spawn.y, spawn.z);
    commands
        .spawn((
            Player { controller },
            Transform::from_translation(render_point(spawn)),
            Visibility::default(),
        ))
        .with_children(|parent| {
            parent.spawn((
                SceneRoot(asset_server.load("models/character.glb#Scene0")),
                Transform::default(),
                CharacterModel,
            ));
        });
}

/// Drive the shared controller from this frame's input and mirror the result
/// onto the render transform.
fn step(
    time: Res<Time>,
    actions: Res<ActionState<InputAction>>,
    mut motion: MessageReader<MouseMotion>,
    grabbed: Res<CursorGrabbed>,
    env: Res<LevelEnvironment>,
    mut player_q: Query<(Entity, &mut Player, &mut Transform)>,
    links: Query<&AnimationLink>,
    mut players: Query<(&mut AnimationPlayer, &mut AnimationTransitions)>,
) {
    let Ok((entity, mut player, mut transform)) = player_q.single_mut() else {
        return;
    };

    let keys = input::pressed_keys(&actions);
    let mut delta = Vec2::ZERO;
    for ev in motion.read() {
        delta += ev.delta;
    }
    let pointer = PointerState {
        locked: grabbed.0,
        delta_x: delta.x,
        delta_y: delta.y,
    };

    if actions.just_pressed(&InputAction::ToggleRun) {
        player.controller.toggle_run();
    }
    if actions.just_pressed(&InputAction::Jump) {
        player.controller.jump();
    }
    if actions.just_pressed(&InputAction::ToggleCamera) {
        player.controller.toggle_camera_mode();
    }
    if actions.just_pressed(&InputAction::Respawn) {
        let mut rng = rand::thread_rng();
        let spawn = env.0.spawn_point(&mut rng);
        player.controller.respawn(spawn);
    }

    let dt = time.delta_secs();
    let mut stepped = false;
    if let Ok(link) = links.get(entity) {
        if let Ok((anim_player, transitions)) = players.get_mut(link.player_entity) {
            let mut driver = ClipDriver {
                player: anim_player.into_inner(),
                transitions: transitions.into_inner(),
                nodes: &link.nodes,
            };
            player
                .controller
                .update(dt, &keys, &pointer, Some(&env.0), &mut driver);
            stepped = true;
        }
    }
    if !stepped {
        // Clips not resolved yet; the state machine still runs.
        player
            .controller
            .update(dt, &keys, &pointer, Some(&env.0), &mut NullAnimations);
    }

    transform.translation = render_point(player.controller.position());
    transform.rotation = render_quat(player.controller.facing());
}

/// The model disappears in first person and comes back in third.
fn sync_model_visibility(
    player: Single<&Player>,
    mut model: Single<&mut Visibility, With<CharacterModel>>,
) {
    **model = match player.controller.camera_mode() {
        CameraMode::First => Visibility::Hidden,
        CameraMode::Third => Visibility::Inherited,
    };
}
