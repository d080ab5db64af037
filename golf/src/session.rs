/*!
Scene lifecycle controller.

`GameSession` owns everything one game needs: the physics scene and composed
course, the event router, the camera and the raw input state. The render loop
drives it once per frame:

1. held keys push the selected actor (and fly the free camera),
2. the engine steps (skipped while paused),
3. the step's events go to the router as one batch,
4. the camera follows the ball.

Reset tears the scene down and recomposes the course from scratch.
*/

use rapier3d::na::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use tracing::{info, warn};

use crate::actor::{ActorId, MotionKind, RigidActor};
use crate::camera::{CameraConfig, CameraMode, OrbitCamera};
use crate::course::{self, Course};
use crate::error::CourseResult;
use crate::events::{EventRouter, GameState, StepEvents};
use crate::input::{InputState, camera_move, force_direction};
use crate::scene::{PhysicsConfig, PhysicsScene};
use crate::settings::{FORCE_STRENGTH, RECOVERY_POSITION};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub physics: PhysicsConfig,
    pub camera: CameraConfig,
    /// Where the ball goes after a hazard contact.
    pub recovery_position: Vector3<f32>,
    /// Held force-key strength (newtons).
    pub force_strength: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            camera: CameraConfig::default(),
            recovery_position: Vector3::from(RECOVERY_POSITION),
            force_strength: FORCE_STRENGTH,
        }
    }
}

pub struct GameSession {
    config: SessionConfig,
    scene: PhysicsScene,
    course: Course,
    router: EventRouter,
    camera: OrbitCamera,
    input: InputState,
    state: GameState,
    selected: Option<ActorId>,
    show_help: bool,
}

impl GameSession {
    /// Build the scene, compose the course and install the router.
    pub fn new(config: SessionConfig) -> CourseResult<Self> {
        let mut scene = PhysicsScene::new(config.physics);
        let course = course::compose(&mut scene)?;

        let recovery = Isometry3::from_parts(
            Translation3::from(config.recovery_position),
            UnitQuaternion::identity(),
        );
        let mut router = EventRouter::new(recovery);
        router.register_goal(course.goal_trigger);

        let mut camera = OrbitCamera::new(config.camera);
        camera.retarget(Some(course.player));

        info!(actors = scene.actors().count(), "session ready");
        Ok(Self {
            config,
            selected: Some(course.player),
            scene,
            course,
            router,
            camera,
            input: InputState::new(),
            state: GameState::Running,
            show_help: true,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Advance the simulation by `dt` and route its events. No-op while paused.
    pub fn step(&mut self, dt: f32) -> StepEvents {
        if self.is_paused() {
            return StepEvents::default();
        }
        let events = self.scene.step(dt);
        self.router.process(&events, &mut self.scene, &mut self.state);
        events
    }

    /// One render-loop frame: held input, step, camera.
    pub fn frame(&mut self, dt: f32) -> StepEvents {
        let held: Vec<u8> = self.input.held_keys().collect();
        for key in held {
            if let Some(dir) = force_direction(key) {
                self.push_selected(dir, dt);
            }
            if self.camera.mode() == CameraMode::Free
                && let Some(movement) = camera_move(key)
            {
                self.camera.move_by(movement, dt);
            }
        }

        let events = self.step(dt);

        let pointer = self.input.take_pointer();
        self.camera.pointer(pointer.x, pointer.y, dt);
        let body = self
            .camera
            .target()
            .and_then(|id| self.scene.actor_pose(id).ok())
            .map(|pose| Point3::from(pose.translation.vector));
        self.camera.update(body);
        events
    }

    fn push_selected(&mut self, dir: Vector3<f32>, dt: f32) {
        if self.is_paused() {
            return;
        }
        let Some(selected) = self.selected else {
            return;
        };
        // Held force applied over one frame.
        let impulse = dir * self.config.force_strength * dt;
        if let Err(err) = self.scene.apply_impulse(selected, impulse) {
            warn!(?selected, %err, "force key ignored");
        }
    }

    /// Pause or resume. An ended game stays ended.
    pub fn pause(&mut self, paused: bool) {
        self.state = match (self.state, paused) {
            (GameState::Running, true) => GameState::Paused,
            (GameState::Paused, false) => GameState::Running,
            (state, _) => state,
        };
    }

    pub fn toggle_pause(&mut self) {
        let paused = self.is_paused();
        self.pause(!paused);
    }

    pub fn is_paused(&self) -> bool {
        self.state == GameState::Paused
    }

    pub fn game_state(&self) -> GameState {
        self.state
    }

    /// Destroy every actor and constraint, recompose the course, and put the
    /// game and camera back to their starting state.
    pub fn reset(&mut self) -> CourseResult<()> {
        self.scene.teardown();
        self.course = course::compose(&mut self.scene)?;
        self.router.register_goal(self.course.goal_trigger);
        self.state = GameState::Running;
        self.camera.reset();
        self.camera.retarget(Some(self.course.player));
        self.selected = Some(self.course.player);
        self.input.take_pointer();
        info!("session reset");
        Ok(())
    }

    pub fn all_actors(&self) -> impl Iterator<Item = &RigidActor> {
        self.scene.actors()
    }

    pub fn selected_actor(&self) -> Option<&RigidActor> {
        self.selected.and_then(|id| self.scene.actor(id).ok())
    }

    /// Cycle the force-key target through the non-static actors.
    pub fn select_next_actor(&mut self) {
        let movable: Vec<ActorId> = self
            .scene
            .actors()
            .filter(|a| a.kind() != MotionKind::Static)
            .map(|a| a.id())
            .collect();
        let current = self.selected.and_then(|s| movable.iter().position(|&id| id == s));
        let next = match current {
            Some(i) => movable.get((i + 1) % movable.len()),
            None => movable.first(),
        };
        self.selected = next.copied();
    }

    pub fn key_down(&mut self, key: u8) -> bool {
        self.input.key_down(key)
    }

    pub fn key_up(&mut self, key: u8) {
        self.input.key_up(key);
    }

    pub fn pointer_delta(&mut self, dx: f32, dy: f32) {
        self.input.pointer_delta(dx, dy);
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    pub fn toggle_camera_mode(&mut self) {
        self.camera.toggle_mode();
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn scene(&self) -> &PhysicsScene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut PhysicsScene {
        &mut self.scene
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    pub fn player(&self) -> ActorId {
        self.course.player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Geometry, Rgba};
    use crate::settings::DEFAULT_TIMESTEP;

    const DT: f32 = DEFAULT_TIMESTEP;
    const EPS: f32 = 1e-4;

    fn session() -> GameSession {
        GameSession::new(SessionConfig::default()).unwrap()
    }

    fn at(x: f32, y: f32, z: f32) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::new(x, y, z), UnitQuaternion::identity())
    }

    type Snapshot = Vec<(String, Vec<(Geometry, Isometry3<f32>, Rgba)>)>;

    fn snapshot(session: &GameSession) -> Snapshot {
        session
            .course()
            .segments
            .iter()
            .map(|(placement, id)| {
                let actor = session.scene().actor(*id).unwrap();
                let shapes = actor
                    .shapes()
                    .iter()
                    .map(|s| (s.geometry.clone(), s.local_pose, s.color))
                    .collect();
                (placement.name.to_owned(), shapes)
            })
            .collect()
    }

    #[test]
    fn ball_dropped_over_the_hole_ends_the_game() {
        let mut session = session();
        let ball = session.player();
        session.scene_mut().reset_motion(ball, at(72.0, 3.0, -48.0)).unwrap();

        let mut ended_after = None;
        for i in 0..120 {
            session.step(DT);
            if session.game_state() == GameState::Ended {
                ended_after = Some(i);
                break;
            }
        }
        assert!(ended_after.is_some(), "ball never reached the goal");

        // Further steps (ball still in or under the cup) keep it ended.
        for _ in 0..60 {
            session.step(DT);
            assert_eq!(session.game_state(), GameState::Ended);
        }
    }

    #[test]
    fn ball_off_the_course_is_recovered() {
        let mut session = session();
        let ball = session.player();
        session.scene_mut().reset_motion(ball, at(-20.0, 3.0, 0.0)).unwrap();
        session
            .scene_mut()
            .set_linear_velocity(ball, Vector3::new(-5.0, 0.0, 0.0))
            .unwrap();

        let mut recovered = false;
        for _ in 0..180 {
            session.step(DT);
            if session.router().recoveries() > 0 {
                recovered = true;
                break;
            }
        }
        assert!(recovered);

        let scene = session.scene();
        let position = scene.actor_pose(ball).unwrap().translation.vector;
        assert!((position - Vector3::from(RECOVERY_POSITION)).norm() < EPS);
        assert!(scene.linear_velocity(ball).unwrap().norm() < EPS);
        assert_eq!(session.game_state(), GameState::Running);
    }

    #[test]
    fn ball_launched_off_the_tee_is_recovered() {
        let mut session = session();
        let ball = session.player();
        // Up and over the tee's right wall (outer face at x = 4) onto open ground.
        session
            .scene_mut()
            .set_linear_velocity(ball, Vector3::new(12.0, 6.0, 0.0))
            .unwrap();

        let mut furthest = f32::MIN;
        let mut recovered = false;
        for _ in 0..240 {
            session.step(DT);
            if session.router().recoveries() > 0 {
                recovered = true;
                break;
            }
            let x = session.scene().actor_pose(ball).unwrap().translation.x;
            furthest = furthest.max(x);
        }
        assert!(recovered, "ball never left the course");
        assert!(furthest > 4.0, "furthest x = {furthest}");

        let scene = session.scene();
        let position = scene.actor_pose(ball).unwrap().translation.vector;
        assert!((position - Vector3::from(RECOVERY_POSITION)).norm() < EPS);
        assert!(scene.linear_velocity(ball).unwrap().norm() < EPS);
        assert_eq!(session.game_state(), GameState::Running);
    }

    #[test]
    fn reset_rebuilds_the_same_course() {
        let mut session = session();
        let before = snapshot(&session);
        let old_player = session.player();

        for _ in 0..30 {
            session.frame(DT);
        }
        session.reset().unwrap();
        session.reset().unwrap();

        assert_eq!(snapshot(&session), before);
        assert_ne!(session.player(), old_player);
        assert!(session.scene().actor(old_player).is_err());
        assert_eq!(session.selected_actor().map(|a| a.id()), Some(session.player()));
    }

    #[test]
    fn resets_do_not_grow_the_scene() {
        let mut session = session();
        let actors = session.all_actors().count();
        let constraints = session.scene().constraints().count();
        for _ in 0..5 {
            session.reset().unwrap();
        }
        assert_eq!(session.all_actors().count(), actors);
        assert_eq!(session.scene().constraints().count(), constraints);
    }

    #[test]
    fn reset_returns_to_running_with_a_fresh_camera() {
        let mut session = session();
        let ball = session.player();
        session.scene_mut().reset_motion(ball, at(72.0, 3.0, -48.0)).unwrap();
        for _ in 0..120 {
            session.frame(DT);
        }
        assert_eq!(session.game_state(), GameState::Ended);

        session.reset().unwrap();
        assert_eq!(session.game_state(), GameState::Running);
        assert_eq!(session.camera().eye(), session.config().camera.eye);
        assert_eq!(session.camera().target(), Some(session.player()));
    }

    #[test]
    fn paused_sessions_do_not_simulate() {
        let mut session = session();
        let ball = session.player();
        session.scene_mut().reset_motion(ball, at(0.0, 5.0, 0.0)).unwrap();

        session.pause(true);
        assert!(session.is_paused());
        for _ in 0..30 {
            session.step(DT);
        }
        let y = session.scene().actor_pose(ball).unwrap().translation.y;
        assert!((y - 5.0).abs() < EPS);

        // Camera and input still run.
        session.toggle_camera_mode();
        session.key_down(b'w');
        let eye = session.camera().eye();
        session.frame(DT);
        assert_ne!(session.camera().eye(), eye);

        session.toggle_pause();
        assert!(!session.is_paused());
    }

    #[test]
    fn pause_does_not_leave_the_end_state() {
        let mut session = session();
        session.state = GameState::Ended;
        session.pause(true);
        assert_eq!(session.game_state(), GameState::Ended);
        session.pause(false);
        assert_eq!(session.game_state(), GameState::Ended);
    }

    #[test]
    fn force_keys_push_the_selected_ball() {
        let mut session = session();
        session.key_down(b'I');
        for _ in 0..10 {
            session.frame(DT);
        }
        session.key_up(b'I');
        let v = session.scene().linear_velocity(session.player()).unwrap();
        assert!(v.z < -0.1, "v = {v:?}");
    }

    #[test]
    fn selection_cycles_through_movable_actors() {
        let mut session = session();
        let first = session.selected_actor().map(|a| a.id());
        assert_eq!(first, Some(session.player()));

        let movable = session
            .all_actors()
            .filter(|a| a.kind() != MotionKind::Static)
            .count();
        for _ in 0..movable {
            session.select_next_actor();
            let selected = session.selected_actor().unwrap();
            assert_ne!(selected.kind(), MotionKind::Static);
        }
        assert_eq!(session.selected_actor().map(|a| a.id()), first);
    }

    #[test]
    fn follow_camera_tracks_the_ball() {
        let mut session = session();
        assert_eq!(session.camera().mode(), CameraMode::Follow);
        for _ in 0..200 {
            session.frame(DT);
        }
        let ball = session.scene().actor_pose(session.player()).unwrap().translation.vector;
        let target = session.camera().follow_eye(Point3::from(ball));
        assert!((session.camera().eye() - target).norm() < 0.01);
    }
}
