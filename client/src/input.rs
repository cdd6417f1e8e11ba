use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use shared::PressedKeys;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    ToggleRun,
    ToggleCamera,
    Respawn,
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::Forward, KeyCode::KeyW);
    input_map.insert(InputAction::Back, KeyCode::KeyS);
    input_map.insert(InputAction::Left, KeyCode::KeyA);
    input_map.insert(InputAction::Right, KeyCode::KeyD);
    input_map.insert(InputAction::Jump, KeyCode::Space);
    input_map.insert(InputAction::ToggleRun, KeyCode::ShiftLeft);
    input_map.insert(InputAction::ToggleCamera, KeyCode::KeyC);
    input_map.insert(InputAction::Respawn, KeyCode::KeyR);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());
}

/// The movement keys as the snapshot the core consumes.
pub fn pressed_keys(actions: &ActionState<InputAction>) -> PressedKeys {
    PressedKeys {
        forward: actions.pressed(&InputAction::Forward),
        back: actions.pressed(&InputAction::Back),
        left: actions.pressed(&InputAction::Left),
        right: actions.pressed(&InputAction::Right),
    }
}
