//! Third-person orbit camera.
//!
//! Two modes share one state:
//! - `Free`: the eye flies around with explicit moves; pointer deltas yaw and
//!   pitch the aim.
//! - `Follow`: the eye sits on a sphere around the tracked body. Pointer deltas
//!   move it in azimuth/elevation, and each frame the eye covers a fixed fraction
//!   of the way to that spherical target, which gives a smoothed lag.
//!
//! The camera only remembers which actor it tracks. The session looks the body
//! up and passes its position into [`OrbitCamera::update`]; a destroyed target
//! must be retargeted (or the camera reset) by the owner.

use rapier3d::na::{
    Isometry3, Matrix3, Point3, Rotation3, Translation3, Unit, UnitQuaternion, Vector3,
};

use crate::actor::ActorId;
use crate::settings::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CameraMode {
    Free,
    #[default]
    Follow,
}

/// Free-mode move directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CameraMove {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Tunables. Defaults come from `settings`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub eye: Point3<f32>,
    pub dir: Vector3<f32>,
    pub speed: f32,
    /// Follow mode, degrees per pointer unit.
    pub sensitivity: f32,
    pub distance: f32,
    pub min_polar_deg: f32,
    pub max_polar_deg: f32,
    pub start_polar_deg: f32,
    pub start_azimuth_deg: f32,
    /// Fraction of the remaining gap closed per frame, in `(0, 1]`.
    pub smoothing: f32,
    pub mode: CameraMode,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Point3::from(CAMERA_EYE),
            dir: Vector3::from(CAMERA_DIR),
            speed: CAMERA_SPEED,
            sensitivity: CAMERA_SENSITIVITY,
            distance: CAMERA_DISTANCE,
            min_polar_deg: CAMERA_MIN_POLAR_DEG,
            max_polar_deg: CAMERA_MAX_POLAR_DEG,
            start_polar_deg: CAMERA_START_POLAR_DEG,
            start_azimuth_deg: CAMERA_START_AZIMUTH_DEG,
            smoothing: CAMERA_SMOOTHING,
            mode: CameraMode::default(),
        }
    }
}

fn up() -> Vector3<f32> {
    Vector3::y()
}

#[derive(Clone, Debug)]
pub struct OrbitCamera {
    config: CameraConfig,
    mode: CameraMode,
    eye: Point3<f32>,
    dir: Unit<Vector3<f32>>,
    speed: f32,
    azimuth_deg: f32,
    polar_deg: f32,
    target: Option<ActorId>,
}

impl OrbitCamera {
    pub fn new(config: CameraConfig) -> Self {
        let dir = Unit::try_new(config.dir, DIR_EPS)
            .unwrap_or_else(|| Unit::new_unchecked(-Vector3::z()));
        Self {
            config,
            mode: config.mode,
            eye: config.eye,
            dir,
            speed: config.speed,
            azimuth_deg: config.start_azimuth_deg,
            polar_deg: config
                .start_polar_deg
                .clamp(config.min_polar_deg, config.max_polar_deg),
            target: None,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CameraMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            CameraMode::Free => CameraMode::Follow,
            CameraMode::Follow => CameraMode::Free,
        };
    }

    pub fn eye(&self) -> Point3<f32> {
        self.eye
    }

    pub fn dir(&self) -> Vector3<f32> {
        self.dir.into_inner()
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn azimuth_deg(&self) -> f32 {
        self.azimuth_deg
    }

    pub fn polar_deg(&self) -> f32 {
        self.polar_deg
    }

    pub fn target(&self) -> Option<ActorId> {
        self.target
    }

    pub fn retarget(&mut self, target: Option<ActorId>) {
        self.target = target;
    }

    /// Back to the construction-time eye, aim, speed and angles.
    ///
    /// The tracked actor and mode are left alone.
    pub fn reset(&mut self) {
        let fresh = Self::new(self.config);
        self.eye = fresh.eye;
        self.dir = fresh.dir;
        self.speed = fresh.speed;
        self.azimuth_deg = fresh.azimuth_deg;
        self.polar_deg = fresh.polar_deg;
    }

    /// Free-mode translation.
    pub fn move_by(&mut self, movement: CameraMove, dt: f32) {
        let step = self.speed * dt;
        let right = self.dir.cross(&up());
        let right = right.try_normalize(DIR_EPS).unwrap_or_else(Vector3::x);
        let delta = match movement {
            CameraMove::Forward => self.dir.into_inner(),
            CameraMove::Backward => -self.dir.into_inner(),
            CameraMove::Left => -right,
            CameraMove::Right => right,
            CameraMove::Up => up(),
            CameraMove::Down => -up(),
        };
        self.eye += delta * step;
    }

    /// Pointer motion, interpreted according to the mode.
    pub fn pointer(&mut self, dx: f32, dy: f32, dt: f32) {
        match self.mode {
            CameraMode::Free => self.free_look(dx, dy, dt),
            CameraMode::Follow => self.orbit(dx, dy),
        }
    }

    fn free_look(&mut self, dx: f32, dy: f32, dt: f32) {
        let yaw = (dx * self.speed * dt).to_radians();
        let mut dir =
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw) * self.dir.into_inner();

        // Looking straight up/down has no pitch axis; skip the pitch then.
        if let Some(pitch_axis) = Unit::try_new(dir.cross(&up()), DIR_EPS) {
            let pitch = (dy * self.speed * dt).to_radians();
            dir = UnitQuaternion::from_axis_angle(&pitch_axis, pitch) * dir;
        }

        if let Some(dir) = Unit::try_new(dir, DIR_EPS) {
            self.dir = dir;
        }
    }

    fn orbit(&mut self, dx: f32, dy: f32) {
        self.azimuth_deg += dx * self.config.sensitivity;
        self.polar_deg = (self.polar_deg + dy * self.config.sensitivity)
            .clamp(self.config.min_polar_deg, self.config.max_polar_deg);
    }

    /// Where the eye wants to be in follow mode, around `body`.
    pub fn follow_eye(&self, body: Point3<f32>) -> Point3<f32> {
        let (azimuth, polar) = (self.azimuth_deg.to_radians(), self.polar_deg.to_radians());
        let offset = Vector3::new(
            polar.cos() * azimuth.cos(),
            polar.sin(),
            polar.cos() * azimuth.sin(),
        ) * self.config.distance;
        body + offset
    }

    /// Per-frame follow update. Free mode, or no tracked body, leaves the pose
    /// untouched.
    pub fn update(&mut self, body: Option<Point3<f32>>) {
        if self.mode != CameraMode::Follow {
            return;
        }
        let Some(body) = body else {
            return;
        };

        let target = self.follow_eye(body);
        self.eye += (target - self.eye) * self.config.smoothing;

        // Keep the previous aim if the eye sits on the body.
        if let Some(dir) = Unit::try_new(body - self.eye, DIR_EPS) {
            self.dir = dir;
        }
    }

    /// Camera pose for the renderer.
    ///
    /// Looking straight along the up axis yields a translation-only pose.
    pub fn transform(&self) -> Isometry3<f32> {
        let translation = Translation3::from(self.eye.coords);
        let dir = self.dir.into_inner();
        let Some(right) = dir.cross(&up()).try_normalize(DIR_EPS) else {
            return Isometry3::from_parts(translation, UnitQuaternion::identity());
        };
        // Right-handed view frame: +X right, +Y up, looking down -Z.
        let view_up = right.cross(&dir);
        let basis = Matrix3::from_columns(&[right, view_up, -dir]);
        let rotation =
            UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(basis));
        Isometry3::from_parts(translation, rotation)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn follow_eye_converges_monotonically() {
        let mut camera = OrbitCamera::default();
        let body = Point3::new(3.0, 1.0, -4.0);
        let target = camera.follow_eye(body);

        let mut gap = (camera.eye() - target).norm();
        for _ in 0..200 {
            camera.update(Some(body));
            let next = (camera.eye() - target).norm();
            assert!(next <= gap);
            gap = next;
        }
        assert!(gap < 1e-3, "gap = {gap}");
        assert!((camera.dir() - (body - camera.eye()).normalize()).norm() < EPS);
    }

    #[test]
    fn follow_target_sits_at_distance() {
        let camera = OrbitCamera::default();
        let body = Point3::new(10.0, 2.0, 0.0);
        let eye = camera.follow_eye(body);
        assert!(((eye - body).norm() - CAMERA_DISTANCE).abs() < EPS);
        // Default azimuth puts the camera behind the ball on +Z.
        assert!((eye.x - body.x).abs() < EPS);
        assert!(eye.z > body.z);
    }

    #[test]
    fn polar_is_clamped() {
        let mut camera = OrbitCamera::default();
        camera.pointer(0.0, 10_000.0, 1.0 / 60.0);
        assert!((camera.polar_deg() - CAMERA_MAX_POLAR_DEG).abs() < EPS);
        camera.pointer(0.0, -10_000.0, 1.0 / 60.0);
        assert!((camera.polar_deg() - CAMERA_MIN_POLAR_DEG).abs() < EPS);
    }

    #[test]
    fn free_moves_scale_with_speed_and_time() {
        let mut camera = OrbitCamera::default();
        camera.set_mode(CameraMode::Free);
        let start = camera.eye();
        camera.move_by(CameraMove::Forward, 0.5);
        let moved = camera.eye() - start;
        assert!((moved - camera.dir() * CAMERA_SPEED * 0.5).norm() < EPS);

        camera.move_by(CameraMove::Up, 1.0);
        assert!((camera.eye().y - (start.y + moved.y + CAMERA_SPEED)).abs() < EPS);
    }

    #[test]
    fn free_look_keeps_direction_normalized() {
        let mut camera = OrbitCamera::default();
        camera.set_mode(CameraMode::Free);
        for i in 0..500 {
            camera.pointer(7.0, if i % 2 == 0 { 3.0 } else { -2.0 }, 1.0 / 60.0);
        }
        assert!((camera.dir().norm() - 1.0).abs() < EPS);
    }

    #[test]
    fn reset_restores_construction_state() {
        let mut camera = OrbitCamera::default();
        let (eye, dir) = (camera.eye(), camera.dir());
        camera.pointer(40.0, 20.0, 1.0);
        camera.update(Some(Point3::new(50.0, 0.0, 50.0)));
        camera.toggle_mode();
        camera.move_by(CameraMove::Left, 2.0);

        camera.reset();
        assert_eq!(camera.eye(), eye);
        assert!((camera.dir() - dir).norm() < EPS);
        assert_eq!(camera.azimuth_deg(), CAMERA_START_AZIMUTH_DEG);
        assert_eq!(camera.polar_deg(), CAMERA_START_POLAR_DEG);
    }

    #[test]
    fn degenerate_aim_gives_translation_only_pose() {
        let camera = OrbitCamera::new(CameraConfig {
            dir: Vector3::new(0.0, -1.0, 0.0),
            ..CameraConfig::default()
        });
        let pose = camera.transform();
        assert_eq!(pose.rotation, UnitQuaternion::identity());
        assert_eq!(pose.translation.vector, Vector3::from(CAMERA_EYE));
    }

    #[test]
    fn transform_looks_along_dir() {
        let camera = OrbitCamera::default();
        let pose = camera.transform();
        // Local -Z maps onto the aim direction.
        let forward = pose.rotation * -Vector3::z();
        assert!((forward - camera.dir()).norm() < EPS);
    }

    #[test]
    fn transform_keeps_the_horizon_level() {
        let camera = OrbitCamera::new(CameraConfig {
            dir: Vector3::new(1.0, -0.5, -1.0),
            ..CameraConfig::default()
        });
        let pose = camera.transform();
        let right = pose.rotation * Vector3::x();
        let view_up = pose.rotation * Vector3::y();
        // No roll: right stays horizontal and the view's up leans skyward.
        assert!(right.y.abs() < EPS, "right = {right:?}");
        assert!(view_up.y > 0.0, "up = {view_up:?}");
        assert!((right - camera.dir().cross(&up()).normalize()).norm() < EPS);
        assert!(pose.rotation.to_rotation_matrix().matrix().determinant() > 0.0);
    }
}
