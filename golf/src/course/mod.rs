/*!
Course composer.

The course is compiled-in data: an ordered list of segment placements, each a
segment kind plus a world position and a yaw. Building it is a pure function of
that list, so composing twice (for example across a reset) yields the same
shapes, local poses and colors.

- palette:    course colors
- segments:   fixed shape layout of each segment kind
- mechanisms: moving sub-assemblies (windmills, doors, sweeper, ...)
- composer:   `compose` puts the whole course into a `PhysicsScene`
*/

pub mod composer;
pub mod mechanisms;
pub mod palette;
pub mod segments;

pub use composer::compose;
pub use segments::{SegmentKind, ShapeSpec, Surface, shape_layout};

use rapier3d::na::{Isometry3, Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::ColliderHandle;

use crate::actor::ActorId;
use crate::constraint::ConstraintId;

/// One segment of the course at a world position, turned about +Y.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
    pub name: &'static str,
    pub kind: SegmentKind,
    pub position: [f32; 3],
    pub yaw_deg: f32,
}

impl Placement {
    const fn new(name: &'static str, kind: SegmentKind, position: [f32; 3], yaw_deg: f32) -> Self {
        Self {
            name,
            kind,
            position,
            yaw_deg,
        }
    }

    pub fn pose(&self) -> Isometry3<f32> {
        let [x, y, z] = self.position;
        Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw_deg.to_radians()),
        )
    }
}

use SegmentKind::*;
use Surface::*;

/// The course, in build order.
pub const LAYOUT: &[Placement] = &[
    Placement::new("tee", Start, [0.0, 1.0, 0.0], 0.0),
    Placement::new("straight1", Straight(Normal), [0.0, 1.0, -8.0], 0.0),
    Placement::new("straight2", Straight(Normal), [0.0, 1.0, -16.0], 0.0),
    Placement::new("slanted_corner1", Corner { slanted: true }, [0.0, 1.0, -24.0], 0.0),
    Placement::new("straight3", Straight(Normal), [8.0, 1.0, -24.0], 90.0),
    Placement::new("straight4", Straight(Normal), [16.0, 1.0, -24.0], 90.0),
    Placement::new("straight5", Straight(Normal), [24.0, 1.0, -24.0], 90.0),
    Placement::new("corner1", Corner { slanted: false }, [32.0, 1.0, -24.0], -90.0),
    Placement::new("straight6", Straight(Normal), [32.0, 1.0, -16.0], 0.0),
    Placement::new("straight7", Straight(Normal), [32.0, 1.0, -8.0], 0.0),
    Placement::new("straight8", Straight(Normal), [32.0, 1.0, 0.0], 0.0),
    Placement::new("windmill_path", WindMillFrame, [32.0, 1.0, 8.0], 0.0),
    Placement::new("corner2", Corner { slanted: false }, [32.0, 1.0, 16.0], 90.0),
    Placement::new("straight9", Straight(Normal), [40.0, 1.0, 16.0], 90.0),
    Placement::new("straight10", Straight(Normal), [48.0, 1.0, 16.0], 90.0),
    Placement::new("trampoline", Trampoline, [56.0, 1.0, 16.0], 90.0),
    Placement::new("straight11", Straight(Normal), [64.0, 1.0, 16.0], 90.0),
    Placement::new("split_wedge", SplitWedge, [72.0, 1.0, 16.0], -90.0),
    Placement::new("straight12", Straight(Normal), [72.0, 1.0, 8.0], 0.0),
    Placement::new("straight13", Straight(Normal), [72.0, 1.0, 24.0], 0.0),
    Placement::new("tunnel_up", Tunnel, [72.0, 1.0, 0.0], 0.0),
    Placement::new("tunnel_down", Tunnel, [72.0, 1.0, 32.0], 0.0),
    Placement::new("straight14", Straight(Ice), [72.0, 1.0, -8.0], 0.0),
    Placement::new("straight15", Straight(Ice), [72.0, 1.0, -16.0], 0.0),
    Placement::new("straight16", Straight(Ice), [72.0, 1.0, -24.0], 0.0),
    Placement::new("straight17", Straight(Sand), [72.0, 1.0, 40.0], 0.0),
    Placement::new("straight18", Straight(Sand), [72.0, 1.0, 48.0], 0.0),
    Placement::new("straight19", Straight(Sand), [72.0, 1.0, 56.0], 0.0),
    Placement::new("straight20", Straight(Sand), [72.0, 1.0, -32.0], 0.0),
    Placement::new("sharp_incline", SharpIncline, [72.0, 1.0, -40.0], 0.0),
    Placement::new("hole", Hole, [72.0, 1.0, -48.0], 0.0),
];

/// Handles into a composed course.
#[derive(Clone, Debug)]
pub struct Course {
    pub player: ActorId,
    pub ground: ActorId,
    /// Static actor carrying the goal trigger shape.
    pub goal: ActorId,
    pub goal_trigger: ColliderHandle,
    /// Segment actors, in `LAYOUT` order.
    pub segments: Vec<(Placement, ActorId)>,
    /// Moving and decorative actors added on top of the segments.
    pub mechanisms: Vec<ActorId>,
    pub constraints: Vec<ConstraintId>,
}

impl Course {
    pub fn segment(&self, name: &str) -> Option<ActorId> {
        self.segments
            .iter()
            .find(|(placement, _)| placement.name == name)
            .map(|(_, id)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn layout_names_are_unique() {
        let names: HashSet<_> = LAYOUT.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), LAYOUT.len());
    }

    #[test]
    fn layout_starts_at_the_tee_and_ends_at_the_hole() {
        assert_eq!(LAYOUT.first().map(|p| p.kind), Some(SegmentKind::Start));
        assert_eq!(LAYOUT.last().map(|p| p.kind), Some(SegmentKind::Hole));
    }

    #[test]
    fn placement_pose_turns_about_y() {
        let placement = Placement::new("x", Start, [8.0, 1.0, -24.0], 90.0);
        let pose = placement.pose();
        let local_z = pose.rotation * Vector3::z();
        assert!((local_z - Vector3::x()).norm() < 1e-5);
        assert_eq!(pose.translation.vector, Vector3::new(8.0, 1.0, -24.0));
    }
}
