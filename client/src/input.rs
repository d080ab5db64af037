use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

use crate::session::Session;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Held to turn pointer motion into camera motion.
    Look,
    ToggleHelp,
    ToggleCameraMode,
    ResetCamera,
    SelectNext,
    TogglePause,
    ResetScene,
    Exit,
}

/// Letter keys handed to the session as raw key codes: force keys and free
/// camera keys.
const SESSION_KEYS: [(KeyCode, u8); 12] = [
    (KeyCode::KeyI, b'I'),
    (KeyCode::KeyK, b'K'),
    (KeyCode::KeyJ, b'J'),
    (KeyCode::KeyL, b'L'),
    (KeyCode::KeyU, b'U'),
    (KeyCode::KeyM, b'M'),
    (KeyCode::KeyW, b'W'),
    (KeyCode::KeyS, b'S'),
    (KeyCode::KeyA, b'A'),
    (KeyCode::KeyD, b'D'),
    (KeyCode::KeyQ, b'Q'),
    (KeyCode::KeyZ, b'Z'),
];

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::Look, MouseButton::Left);
    input_map.insert(InputAction::ToggleHelp, KeyCode::F5);
    input_map.insert(InputAction::ToggleCameraMode, KeyCode::F7);
    input_map.insert(InputAction::ResetCamera, KeyCode::F8);
    input_map.insert(InputAction::SelectNext, KeyCode::F9);
    input_map.insert(InputAction::TogglePause, KeyCode::F10);
    input_map.insert(InputAction::ResetScene, KeyCode::F12);
    input_map.insert(InputAction::Exit, KeyCode::Escape);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());

    app.add_systems(
        Update,
        (forward_keys, forward_pointer, handle_actions).run_if(resource_exists::<Session>),
    );
}

fn forward_keys(keys: Res<ButtonInput<KeyCode>>, mut session: ResMut<Session>) {
    let game = session.game_mut();
    for (code, key) in SESSION_KEYS {
        if keys.just_pressed(code) {
            game.key_down(key);
        }
        if keys.just_released(code) {
            game.key_up(key);
        }
    }
}

fn forward_pointer(
    actions: Res<ActionState<InputAction>>,
    motion: Res<AccumulatedMouseMotion>,
    mut session: ResMut<Session>,
) {
    if !actions.pressed(&InputAction::Look) || motion.delta == Vec2::ZERO {
        return;
    }
    session
        .game_mut()
        .pointer_delta(motion.delta.x, motion.delta.y);
}

fn handle_actions(
    actions: Res<ActionState<InputAction>>,
    mut session: ResMut<Session>,
    mut exit: MessageWriter<AppExit>,
) {
    if actions.just_pressed(&InputAction::Exit) {
        exit.write(AppExit::Success);
        return;
    }
    if actions.just_pressed(&InputAction::ResetScene) {
        if let Err(err) = session.reset() {
            error!("Failed to rebuild the course: {err}");
            exit.write(AppExit::error());
        }
        return;
    }

    let game = session.game_mut();
    if actions.just_pressed(&InputAction::ToggleHelp) {
        game.toggle_help();
    }
    if actions.just_pressed(&InputAction::ToggleCameraMode) {
        game.toggle_camera_mode();
        info!("Camera mode: {:?}", game.camera().mode());
    }
    if actions.just_pressed(&InputAction::ResetCamera) {
        game.reset_camera();
    }
    if actions.just_pressed(&InputAction::SelectNext) {
        game.select_next_actor();
        if let Some(actor) = game.selected_actor() {
            info!("Selected {}", actor.name());
        }
    }
    if actions.just_pressed(&InputAction::TogglePause) {
        game.toggle_pause();
    }
}
