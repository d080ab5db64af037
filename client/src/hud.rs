use bevy::prelude::*;
use golf::{CameraMode, GameState};

use crate::session::Session;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_hud);
    app.add_systems(Update, update_hud.run_if(resource_exists::<Session>));
}

const HELP: &str = "\
Mouse (left drag): look / orbit
I/K/J/L/U/M: push the selected actor
W/S/A/D/Q/Z: move the free camera
F5: toggle help
F7: free / follow camera
F8: reset camera
F9: select next actor
F10: pause
F12: reset course
Esc: quit";

#[derive(Component, Clone, Copy, PartialEq, Eq)]
enum HudText {
    Help,
    Status,
    Paused,
    Complete,
}

fn add_hud(mut commands: Commands) {
    let corner = |top: f32| Node {
        position_type: PositionType::Absolute,
        top: Val::Px(top),
        left: Val::Px(12.0),
        ..default()
    };
    commands.spawn((
        HudText::Status,
        Text::new(""),
        TextFont::from_font_size(16.0),
        corner(12.0),
    ));
    commands.spawn((
        HudText::Help,
        Text::new(HELP),
        TextFont::from_font_size(14.0),
        corner(40.0),
    ));

    let banner = Node {
        position_type: PositionType::Absolute,
        top: Val::Percent(40.0),
        width: Val::Percent(100.0),
        justify_content: JustifyContent::Center,
        ..default()
    };
    commands.spawn((
        HudText::Paused,
        Text::new("PAUSED"),
        TextFont::from_font_size(48.0),
        banner.clone(),
        Visibility::Hidden,
    ));
    commands.spawn((
        HudText::Complete,
        Text::new("Hole complete! F12 to play again"),
        TextFont::from_font_size(48.0),
        TextColor(Color::srgb(1.0, 0.85, 0.2)),
        banner,
        Visibility::Hidden,
    ));
}

fn update_hud(session: Res<Session>, mut texts: Query<(&HudText, &mut Visibility, &mut Text)>) {
    let game = session.game();
    for (kind, mut visibility, mut text) in &mut texts {
        let shown = match kind {
            HudText::Help => game.show_help(),
            HudText::Paused => game.game_state() == GameState::Paused,
            HudText::Complete => game.game_state() == GameState::Ended,
            HudText::Status => {
                let selected = game.selected_actor().map_or("none", |a| a.name());
                let camera = match game.camera().mode() {
                    CameraMode::Follow => "follow",
                    CameraMode::Free => "free",
                };
                let status = format!(
                    "Selected: {selected}  Camera: {camera}  Recoveries: {}",
                    game.router().recoveries()
                );
                if text.0 != status {
                    text.0 = status;
                }
                true
            }
        };
        visibility.set_if_neq(if shown {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        });
    }
}
