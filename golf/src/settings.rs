/*!
Gameplay, physics and camera tuning constants.

These constants centralize the values used by the course composer, the event
router and the camera. Keeping them together makes tuning easier and keeps the
course reconstruction deterministic.

Notes
- Distances are in meters, time in seconds, angles in degrees unless the name
  says otherwise.
- Runtime-tunable values are mirrored into the config structs (`SessionConfig`,
  `CameraConfig`); these constants are their defaults.
*/

/// Gravity magnitude in meters per second squared (positive value).
pub const GRAVITY_MPS2: f32 = 9.81;

/// Fixed simulation step used by the client loop and the scenario tests.
pub const DEFAULT_TIMESTEP: f32 = 1.0 / 60.0;

/// Name given to the player ball. The hazard rule keys off this name.
pub const PLAYER_NAME: &str = "playerball";

/// Name given to the ground plane.
pub const GROUND_NAME: &str = "plane";

/// Name given to the goal trigger actor.
pub const GOAL_NAME: &str = "goal";

/// Where the ball is teleported after touching a hazard (world space).
pub const RECOVERY_POSITION: [f32; 3] = [0.0, 10.0, 0.0];

/// Where the ball is spawned on the tee (world space).
pub const BALL_SPAWN_POSITION: [f32; 3] = [0.0, 1.7, 0.0];

pub const BALL_RADIUS: f32 = 0.3;
pub const BALL_DENSITY: f32 = 1.0;

/// Angular damping applied to the ball so it does not roll forever.
pub const BALL_ANGULAR_DAMPING: f32 = 2.0;

/// Strength of the held-key push applied to the selected actor (newtons).
pub const FORCE_STRENGTH: f32 = 3.0;

/// Stiffness standing in for "infinite" on hard drives.
///
/// A literal `f32::MAX` overflows inside the solver's gain computation, so a
/// large finite gain is used instead.
pub const HARD_DRIVE_STIFFNESS: f32 = 1.0e6;

/// Damping gain used by velocity drives (windmill motors).
pub const VELOCITY_DRIVE_DAMPING: f32 = 1.0e3;

/// Camera eye at construction (world space).
pub const CAMERA_EYE: [f32; 3] = [0.0, 5.0, 15.0];

/// Camera aim at construction (normalized on use).
pub const CAMERA_DIR: [f32; 3] = [0.0, -0.1, -1.0];

/// Free-mode move speed (meters per second) and look speed scale.
pub const CAMERA_SPEED: f32 = 5.0;

/// Follow-mode degrees of rotation per pointer unit.
pub const CAMERA_SENSITIVITY: f32 = 0.2;

/// Follow-mode distance from the tracked body (meters).
pub const CAMERA_DISTANCE: f32 = 10.0;

/// Follow-mode elevation bounds (degrees above the horizon).
///
/// Matches a vertical offset of 1..7 meters at the default distance.
pub const CAMERA_MIN_POLAR_DEG: f32 = 5.74;
pub const CAMERA_MAX_POLAR_DEG: f32 = 44.43;

/// Follow-mode starting elevation (degrees).
pub const CAMERA_START_POLAR_DEG: f32 = 20.0;

/// Follow-mode starting azimuth (degrees around +Y, 90 puts the camera on +Z).
pub const CAMERA_START_AZIMUTH_DEG: f32 = 90.0;

/// Fraction of the remaining distance the eye covers each frame in follow mode.
pub const CAMERA_SMOOTHING: f32 = 0.1;

/// Below this length a direction is considered degenerate.
pub const DIR_EPS: f32 = 1.0e-6;
