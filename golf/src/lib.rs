pub mod actor;
pub mod bitmask_flags;
pub mod camera;
pub mod constraint;
pub mod course;
pub mod error;
pub mod events;
pub mod filter;
pub mod input;
pub mod scene;
pub mod session;
pub mod settings;
pub mod user_data;

pub use actor::{
    ActorId, Geometry, Material, MotionKind, RigidActor, Rgba, ShapeIndex, ShapeRecord,
};
pub use camera::{CameraConfig, CameraMode, CameraMove, OrbitCamera};
pub use constraint::{
    Axis, AxisMotion, BreakThreshold, Constraint, ConstraintBreakHandler, ConstraintId,
    ConstraintKind, ConstraintState, DriveSpec, SixAxisSpec,
};
pub use course::{Course, LAYOUT, Placement, SegmentKind, Surface, compose};
pub use error::{CourseError, CourseResult};
pub use events::{
    ContactEvent, EventRouter, GameState, StepEventCollector, StepEvents, TouchKind, TriggerEvent,
};
pub use filter::{FilterData, FilterGroup};
pub use input::InputState;
pub use scene::{PhysicsConfig, PhysicsScene};
pub use session::{GameSession, SessionConfig};

pub use rapier3d;
