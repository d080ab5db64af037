//! Owns the `GameSession` and drives it on the fixed timestep.

use bevy::prelude::*;
use golf::settings::DEFAULT_TIMESTEP;
use golf::{CourseResult, GameSession, SessionConfig};

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(Time::<Fixed>::from_seconds(DEFAULT_TIMESTEP as f64));
    app.add_systems(Startup, init_session);
    app.add_systems(FixedUpdate, step_session.run_if(resource_exists::<Session>));
}

/// The running game plus a counter bumped on every rebuild, so the renderer
/// knows when to respawn its meshes.
#[derive(Resource)]
pub struct Session {
    game: GameSession,
    generation: u32,
}

impl Session {
    pub fn game(&self) -> &GameSession {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut GameSession {
        &mut self.game
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn reset(&mut self) -> CourseResult<()> {
        self.game.reset()?;
        self.generation = self.generation.wrapping_add(1);
        Ok(())
    }
}

fn init_session(mut commands: Commands, mut exit: MessageWriter<AppExit>) {
    match GameSession::new(SessionConfig::default()) {
        Ok(game) => {
            info!(player = ?game.player(), "course ready");
            commands.insert_resource(Session {
                game,
                generation: 0,
            });
        }
        Err(err) => {
            error!("Failed to build the course: {err}");
            exit.write(AppExit::error());
        }
    }
}

fn step_session(mut session: ResMut<Session>, time: Res<Time>) {
    session.game_mut().frame(time.delta_secs());
}
