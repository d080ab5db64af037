use rapier3d::na::{Point3, Vector3};
use rapier3d::prelude::*;

/// Half thickness given to cloth sheets so they still have a finite volume.
const CLOTH_HALF_THICKNESS: f32 = 0.01;

/// Supported shape geometry, expressed in the owning actor's local frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// Oriented box with given half-extents (meters).
    Box { half_extents: Vector3<f32> },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned capsule (meters).
    Capsule { radius: f32, half_height: f32 },

    /// Convex hull of a point cloud (meters, local frame).
    ConvexHull { points: Vec<Point3<f32>> },

    /// Rectangular cloth sheet lying in the local XZ plane.
    ///
    /// Rapier has no cloth solver. The sheet keeps its grid resolution for the
    /// renderer and is always registered as a visual-only shape.
    ClothSheet {
        half_width: f32,
        half_depth: f32,
        columns: u32,
        rows: u32,
    },

    /// Infinite plane (half-space) whose outward normal is local +Y.
    Plane,
}

impl Geometry {
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Geometry::Box {
            half_extents: Vector3::new(hx, hy, hz),
        }
    }

    pub fn is_plane(&self) -> bool {
        matches!(self, Geometry::Plane)
    }

    /// Shapes that can never take part in contact resolution.
    pub fn is_visual_only(&self) -> bool {
        matches!(self, Geometry::ClothSheet { .. })
    }

    /// Start a rapier collider for this geometry with identity local pose.
    ///
    /// Returns `None` when a convex hull cannot be built from its points.
    pub(crate) fn collider_builder(&self) -> Option<ColliderBuilder> {
        let builder = match self {
            Geometry::Box { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }

            Geometry::Sphere { radius } => ColliderBuilder::ball(*radius),

            Geometry::Capsule {
                radius,
                half_height,
            } => ColliderBuilder::capsule_y(*half_height, *radius),

            Geometry::ConvexHull { points } => ColliderBuilder::convex_hull(points)?,

            Geometry::ClothSheet {
                half_width,
                half_depth,
                ..
            } => ColliderBuilder::cuboid(*half_width, CLOTH_HALF_THICKNESS, *half_depth),

            Geometry::Plane => ColliderBuilder::halfspace(Vector::y_axis()),
        };
        Some(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tetrahedron_hull_builds() {
        let tetra = Geometry::ConvexHull {
            points: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
        };
        assert!(tetra.collider_builder().is_some());
    }

    #[test]
    fn only_cloth_is_visual_only() {
        let cloth = Geometry::ClothSheet {
            half_width: 0.75,
            half_depth: 0.75,
            columns: 10,
            rows: 10,
        };
        assert!(cloth.is_visual_only());
        assert!(!Geometry::Plane.is_visual_only());
        assert!(Geometry::Plane.is_plane());
        assert!(!Geometry::cuboid(1.0, 1.0, 1.0).is_plane());
    }
}
