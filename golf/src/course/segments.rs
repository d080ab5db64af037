use rapier3d::na::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};

use super::palette;
use crate::actor::{ActorId, Geometry, Material, Rgba};
use crate::error::CourseResult;
use crate::scene::PhysicsScene;

/// Floor variant of a straight.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Surface {
    Normal,
    Sand,
    Ice,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    Start,
    Straight(Surface),
    Corner { slanted: bool },
    SharpIncline,
    WindMillFrame,
    Tunnel,
    SplitWedge,
    /// Walls and a sunken pit; the sprung pad is a mechanism.
    Trampoline,
    Hole,
}

/// One shape of a segment layout, in the segment's local frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeSpec {
    pub geometry: Geometry,
    pub local_pose: Isometry3<f32>,
    pub color: Rgba,
    pub material: Option<Material>,
}

fn at(x: f32, y: f32, z: f32) -> Isometry3<f32> {
    Isometry3::from_parts(Translation3::new(x, y, z), UnitQuaternion::identity())
}

fn boxed(half: [f32; 3], pose: Isometry3<f32>, color: Rgba) -> ShapeSpec {
    let [hx, hy, hz] = half;
    ShapeSpec {
        geometry: Geometry::cuboid(hx, hy, hz),
        local_pose: pose,
        color,
        material: None,
    }
}

fn floor(half: [f32; 3], pose: Isometry3<f32>) -> ShapeSpec {
    ShapeSpec {
        material: Some(Material::TURF),
        ..boxed(half, pose, palette::COURSE_GREEN)
    }
}

fn wall(half: [f32; 3], pose: Isometry3<f32>) -> ShapeSpec {
    boxed(half, pose, palette::WALL_BROWN)
}

fn hull(points: &[[f32; 3]], pose: Isometry3<f32>, color: Rgba) -> ShapeSpec {
    ShapeSpec {
        geometry: Geometry::ConvexHull {
            points: points.iter().map(|&p| Point3::from(p)).collect(),
        },
        local_pose: pose,
        color,
        material: None,
    }
}

/// Side walls shared by every straight-like segment.
fn side_walls() -> [ShapeSpec; 2] {
    [
        wall([0.2, 1.0, 4.0], at(-3.8, 0.0, 0.0)),
        wall([0.2, 1.0, 4.0], at(3.8, 0.0, 0.0)),
    ]
}

const CORNER_WEDGE: [[f32; 3]; 6] = [
    [-1.8, 0.3, -1.8],
    [1.8, 0.3, 1.8],
    [-1.8, -0.3, -1.8],
    [1.8, -0.3, 1.8],
    [-1.8, 0.3, 1.8],
    [-1.8, -0.3, 1.8],
];

/// Splitter that sends the ball left or right, apex toward the entry (+Z).
const SPLIT_WEDGE: [[f32; 3]; 6] = [
    [0.0, 0.0, 1.5],
    [-2.0, 0.0, -3.6],
    [2.0, 0.0, -3.6],
    [0.0, 1.0, 1.5],
    [-2.0, 1.0, -3.6],
    [2.0, 1.0, -3.6],
];

/// Fixed local shape layout of a segment kind.
pub fn shape_layout(kind: SegmentKind) -> Vec<ShapeSpec> {
    match kind {
        SegmentKind::Straight(surface) => {
            let base = floor([3.6, 0.7, 4.0], at(0.0, -0.3, 0.0));
            let base = match surface {
                Surface::Normal => base,
                Surface::Sand => ShapeSpec {
                    color: palette::SAND,
                    material: Some(Material::SAND),
                    ..base
                },
                Surface::Ice => ShapeSpec {
                    color: palette::ICE,
                    material: Some(Material::ICE),
                    ..base
                },
            };
            let [left, right] = side_walls();
            vec![base, left, right]
        }

        SegmentKind::Start => {
            let [left, right] = side_walls();
            vec![
                floor([3.6, 0.7, 3.8], at(0.0, -0.3, -0.2)),
                left,
                right,
                wall([3.6, 1.0, 0.2], at(0.0, 0.0, 3.8)),
            ]
        }

        SegmentKind::Corner { slanted } => {
            let mut shapes = vec![
                wall([0.2, 1.0, 4.0], at(-3.8, 0.0, 0.0)),
                wall([3.8, 1.0, 0.2], at(0.2, 0.0, -3.8)),
                // inside corner nook
                wall([0.2, 1.0, 0.2], at(3.8, 0.0, 3.8)),
                floor([3.8, 0.7, 3.6], at(0.2, -0.3, 0.0)),
                floor([3.6, 0.7, 0.2], at(0.0, -0.3, 3.8)),
            ];
            if slanted {
                let pose = Isometry3::from_parts(
                    Translation3::new(-1.8, 0.7, -1.8),
                    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -90f32.to_radians()),
                );
                shapes.push(hull(&CORNER_WEDGE, pose, palette::WALL_BROWN));
            }
            shapes
        }

        SegmentKind::SharpIncline => {
            let ramp = |z: f32, angle_deg: f32| {
                let pose = Isometry3::from_parts(
                    Translation3::new(0.0, 0.7, z),
                    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angle_deg.to_radians()),
                );
                floor([3.6, 0.65, 1.2], pose)
            };
            let [left, right] = side_walls();
            vec![
                left,
                right,
                floor([3.6, 0.7, 1.2], at(0.0, -0.3, 2.8)),
                floor([3.6, 0.7, 1.2], at(0.0, -0.3, -2.8)),
                ramp(-0.39, -45.0),
                ramp(0.39, 45.0),
            ]
        }

        SegmentKind::WindMillFrame => {
            let [left, right] = side_walls();
            let post = |half: [f32; 3], pose| boxed(half, pose, palette::DARK_GREY);
            vec![
                left,
                right,
                floor([3.6, 0.7, 4.0], at(0.0, -0.3, 0.0)),
                post([0.15, 1.8, 0.4], at(-3.45, 2.2, 0.0)),
                post([0.15, 1.8, 0.4], at(3.45, 2.2, 0.0)),
                post([3.3, 0.2, 0.4], at(0.0, 3.8, 0.0)),
                post([1.4, 0.2, 0.4], at(-1.9, 0.6, 0.0)),
                post([1.4, 0.2, 0.4], at(1.9, 0.6, 0.0)),
            ]
        }

        SegmentKind::Tunnel => {
            let [left, right] = side_walls();
            let block = |half: [f32; 3], pose| boxed(half, pose, palette::DARK_GREY);
            vec![
                floor([3.6, 0.7, 4.0], at(0.0, -0.3, 0.0)),
                left,
                right,
                block([1.6, 0.4, 4.0], at(-2.0, 0.8, 0.0)),
                block([1.6, 0.4, 4.0], at(2.0, 0.8, 0.0)),
                block([3.6, 0.4, 4.0], at(0.0, 1.6, 0.0)),
            ]
        }

        SegmentKind::SplitWedge => vec![
            floor([4.0, 0.7, 4.0], at(0.0, -0.3, 0.0)),
            wall([4.0, 1.0, 0.2], at(0.0, 0.0, -3.8)),
            wall([0.2, 1.0, 0.2], at(-3.8, 0.0, 3.8)),
            wall([0.2, 1.0, 0.2], at(3.8, 0.0, 3.8)),
            hull(&SPLIT_WEDGE, at(0.0, 0.4, 0.0), palette::DARK_GREY),
        ],

        SegmentKind::Trampoline => {
            let [left, right] = side_walls();
            vec![
                left,
                right,
                // pit floor under the pad
                boxed([3.6, 0.3, 4.0], at(0.0, -0.7, 0.0), palette::DARK_GREY),
            ]
        }

        SegmentKind::Hole => {
            // Four floor tiles around a 0.8 x 0.8 opening at the center.
            vec![
                wall([3.6, 1.0, 0.2], at(0.0, 0.0, -3.8)),
                wall([0.2, 1.0, 4.0], at(-3.8, 0.0, 0.0)),
                wall([0.2, 1.0, 4.0], at(3.8, 0.0, 0.0)),
                floor([2.0, 0.7, 1.6], at(-1.6, -0.3, -2.0)),
                floor([1.6, 0.7, 2.0], at(2.0, -0.3, -1.6)),
                floor([2.0, 0.7, 1.8], at(1.6, -0.3, 2.2)),
                floor([1.6, 0.7, 2.2], at(-2.0, -0.3, 1.8)),
            ]
        }
    }
}

/// Build one segment as a single static actor with many shapes.
pub fn build_segment(
    scene: &mut PhysicsScene,
    name: &str,
    kind: SegmentKind,
    pose: Isometry3<f32>,
) -> CourseResult<ActorId> {
    let id = scene.create_static(pose);
    scene.set_name(id, name)?;
    for spec in shape_layout(kind) {
        let index = scene.add_shape(id, spec.geometry, spec.local_pose, spec.material)?;
        scene.set_color(id, index, spec.color)?;
    }
    Ok(id)
}
