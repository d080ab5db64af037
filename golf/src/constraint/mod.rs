/*!
Constraint library.

Typed builders for the joints the course uses. Every kind is expressed as one
rapier generic joint with per-axis motion, so there is no runtime kind recovery:
the builder that created a constraint also fixed its [`ConstraintKind`].

Axis conventions, in each endpoint's anchor frame:
- hinge: rotation about frame X
- slider: translation along frame X
- ball: translations locked, rotations free
*/

pub mod library;

use rapier3d::prelude::{ImpulseJointHandle, JointAxesMask, JointAxis};

use crate::actor::ActorId;
use crate::settings::{HARD_DRIVE_STIFFNESS, VELOCITY_DRIVE_DAMPING};

/// Stable identifier of a constraint within a session. Never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    Fixed,
    Hinge,
    Slider,
    Ball,
    Generic6Axis,
}

/// One of the six relative degrees of freedom.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Axis {
    LinX,
    LinY,
    LinZ,
    AngX,
    AngY,
    AngZ,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::LinX,
        Axis::LinY,
        Axis::LinZ,
        Axis::AngX,
        Axis::AngY,
        Axis::AngZ,
    ];

    pub(crate) fn joint_axis(self) -> JointAxis {
        match self {
            Axis::LinX => JointAxis::LinX,
            Axis::LinY => JointAxis::LinY,
            Axis::LinZ => JointAxis::LinZ,
            Axis::AngX => JointAxis::AngX,
            Axis::AngY => JointAxis::AngY,
            Axis::AngZ => JointAxis::AngZ,
        }
    }

    pub(crate) fn mask(self) -> JointAxesMask {
        match self {
            Axis::LinX => JointAxesMask::LIN_X,
            Axis::LinY => JointAxesMask::LIN_Y,
            Axis::LinZ => JointAxesMask::LIN_Z,
            Axis::AngX => JointAxesMask::ANG_X,
            Axis::AngY => JointAxesMask::ANG_Y,
            Axis::AngZ => JointAxesMask::ANG_Z,
        }
    }
}

/// How much relative motion an axis allows.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AxisMotion {
    Locked,
    /// Meters for linear axes, radians for angular ones.
    Limited { min: f32, max: f32 },
    Free,
}

/// Motor on one axis.
///
/// The drive pulls toward `target_position` with `stiffness` and toward
/// `target_velocity` with `damping`, never exceeding `force_limit`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DriveSpec {
    pub target_position: f32,
    pub target_velocity: f32,
    pub stiffness: f32,
    pub damping: f32,
    pub force_limit: f32,
}

impl DriveSpec {
    /// Constant-speed motor (windmills).
    pub fn velocity(target_velocity: f32) -> Self {
        Self {
            target_position: 0.0,
            target_velocity,
            stiffness: 0.0,
            damping: VELOCITY_DRIVE_DAMPING,
            force_limit: f32::MAX,
        }
    }

    /// Damped spring around `target_position` (trampoline pad).
    pub fn spring(target_position: f32, stiffness: f32, damping: f32) -> Self {
        Self {
            target_position,
            target_velocity: 0.0,
            stiffness,
            damping,
            force_limit: f32::MAX,
        }
    }

    /// Very stiff, undamped drive with a small force budget (sweeper bar).
    pub fn hard(target_position: f32, target_velocity: f32, force_limit: f32) -> Self {
        Self {
            target_position,
            target_velocity,
            stiffness: HARD_DRIVE_STIFFNESS,
            damping: 0.0,
            force_limit,
        }
    }
}

/// Force/torque above which a constraint detaches for good.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BreakThreshold {
    /// Newtons.
    pub force: f32,
    /// Newton-meters.
    pub torque: f32,
}

impl BreakThreshold {
    pub fn new(force: f32, torque: f32) -> Self {
        Self { force, torque }
    }

    /// Same limit on force and torque.
    pub fn uniform(limit: f32) -> Self {
        Self::new(limit, limit)
    }
}

/// Per-axis description of a generic 6-axis constraint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SixAxisSpec {
    pub motion: [AxisMotion; 6],
    pub drives: [Option<DriveSpec>; 6],
}

impl Default for SixAxisSpec {
    /// Everything locked, no drives.
    fn default() -> Self {
        Self {
            motion: [AxisMotion::Locked; 6],
            drives: [None; 6],
        }
    }
}

impl SixAxisSpec {
    pub fn locked() -> Self {
        Self::default()
    }

    pub fn with_motion(mut self, axis: Axis, motion: AxisMotion) -> Self {
        self.motion[axis as usize] = motion;
        self
    }

    pub fn with_drive(mut self, axis: Axis, drive: DriveSpec) -> Self {
        self.drives[axis as usize] = Some(drive);
        self
    }

    pub fn motion(&self, axis: Axis) -> AxisMotion {
        self.motion[axis as usize]
    }

    pub fn drive(&self, axis: Axis) -> Option<DriveSpec> {
        self.drives[axis as usize]
    }

    pub(crate) fn locked_mask(&self) -> JointAxesMask {
        Axis::ALL
            .into_iter()
            .filter(|&axis| self.motion(axis) == AxisMotion::Locked)
            .fold(JointAxesMask::empty(), |acc, axis| acc | axis.mask())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintState {
    Attached,
    /// Overloaded during a step and removed from the engine; never reattached.
    Broken,
}

#[derive(Clone, Debug)]
pub struct Constraint {
    pub(crate) id: ConstraintId,
    pub(crate) kind: ConstraintKind,
    pub(crate) first: Option<ActorId>,
    pub(crate) second: ActorId,
    pub(crate) spec: SixAxisSpec,
    pub(crate) joint: ImpulseJointHandle,
    pub(crate) break_threshold: Option<BreakThreshold>,
    pub(crate) state: ConstraintState,
}

impl Constraint {
    pub fn id(&self) -> ConstraintId {
        self.id
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    /// `None` first endpoint means the static world frame.
    pub fn endpoints(&self) -> (Option<ActorId>, ActorId) {
        (self.first, self.second)
    }

    pub fn spec(&self) -> &SixAxisSpec {
        &self.spec
    }

    pub fn break_threshold(&self) -> Option<BreakThreshold> {
        self.break_threshold
    }

    pub fn state(&self) -> ConstraintState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == ConstraintState::Attached
    }
}

/// Receives constraint breakage notifications after each step.
pub trait ConstraintBreakHandler {
    fn on_constraint_break(&mut self, id: ConstraintId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_mask_skips_free_and_limited_axes() {
        let hinge = SixAxisSpec::locked().with_motion(Axis::AngX, AxisMotion::Free);
        assert_eq!(
            hinge.locked_mask(),
            JointAxesMask::LIN_X
                | JointAxesMask::LIN_Y
                | JointAxesMask::LIN_Z
                | JointAxesMask::ANG_Y
                | JointAxesMask::ANG_Z
        );

        let slider = SixAxisSpec::locked()
            .with_motion(Axis::LinX, AxisMotion::Limited { min: -1.0, max: 1.0 });
        assert!(!slider.locked_mask().contains(JointAxesMask::LIN_X));
        assert!(slider.locked_mask().contains(JointAxesMask::ANG_X));
    }

    #[test]
    fn drives_attach_to_their_axis() {
        let spec = SixAxisSpec::locked().with_drive(Axis::AngZ, DriveSpec::velocity(1.0));
        assert_eq!(spec.drive(Axis::AngZ).map(|d| d.target_velocity), Some(1.0));
        assert!(spec.drive(Axis::AngX).is_none());
    }

    #[test]
    fn hard_drive_has_no_damping() {
        let drive = DriveSpec::hard(-3.4, 1.0, 1.0);
        assert_eq!(drive.stiffness, HARD_DRIVE_STIFFNESS);
        assert_eq!(drive.damping, 0.0);
        assert_eq!(drive.force_limit, 1.0);
    }
}
