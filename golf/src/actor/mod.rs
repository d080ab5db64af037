/*!
Actor/shape library.

Factory wrappers that turn primitive geometry into rapier bodies and colliders,
and keep the per-shape metadata (material, color, filter data, trigger flag)
the engine does not track for us:

- geometry: shape descriptors and their rapier collider builders
- material: surface response presets and render colors
- library:  `PhysicsScene` operations that create and configure actors

A course segment is one actor with many shapes sharing its transform, not many
actors.
*/

pub mod geometry;
pub mod library;
pub mod material;

pub use geometry::Geometry;
pub use material::{Material, Rgba};

use rapier3d::na::Isometry3;
use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};

use crate::filter::FilterData;

/// Stable identifier of an actor within a session. Never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u32);

/// Index of a shape within its actor, in creation order.
pub type ShapeIndex = usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MotionKind {
    Static,
    Dynamic,
    Kinematic,
}

/// A single collision/visual primitive attached to an actor.
#[derive(Clone, Debug)]
pub struct ShapeRecord {
    pub geometry: Geometry,
    pub local_pose: Isometry3<f32>,
    pub material: Material,
    pub color: Rgba,
    pub trigger: bool,
    /// `false` for shapes that are rendered but never collide.
    pub simulated: bool,
    pub(crate) collider: ColliderHandle,
}

impl ShapeRecord {
    pub fn collider(&self) -> ColliderHandle {
        self.collider
    }
}

/// A positioned rigid body with one or more shapes.
#[derive(Clone, Debug)]
pub struct RigidActor {
    pub(crate) id: ActorId,
    pub(crate) name: String,
    pub(crate) kind: MotionKind,
    pub(crate) body: RigidBodyHandle,
    pub(crate) density: f32,
    pub(crate) filter: FilterData,
    pub(crate) shapes: Vec<ShapeRecord>,
}

impl RigidActor {
    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MotionKind {
        self.kind
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn filter(&self) -> FilterData {
        self.filter
    }

    pub fn shapes(&self) -> &[ShapeRecord] {
        &self.shapes
    }
}
