//! Moving and decorative sub-assemblies.
//!
//! Each mechanism is one or more actors plus the constraints that pin them to
//! the world or to each other. Anchors are given in world space and converted
//! with `frame_in_actor`, so every joint starts out satisfied.

use rapier3d::na::{Isometry3, Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::ColliderHandle;
use tracing::debug;

use super::palette;
use crate::actor::{ActorId, Geometry, Material, Rgba};
use crate::constraint::{Axis, AxisMotion, BreakThreshold, ConstraintId, DriveSpec, SixAxisSpec};
use crate::error::CourseResult;
use crate::scene::PhysicsScene;
use crate::settings::GOAL_NAME;

/// Windmill motor speed (rad/s).
const WINDMILL_SPEED: f32 = 1.0;

/// Doors are welded shut until the ball pushes them apart.
const DOOR_BREAK_FORCE: f32 = 5.0;
const DOOR_DENSITY: f32 = 0.01;

const TWIN_SPHERE_BREAK_FORCE: f32 = 500.0;

const TRAMPOLINE_STIFFNESS: f32 = 400.0;
const TRAMPOLINE_DAMPING: f32 = 2.0;
const TRAMPOLINE_TRAVEL: [f32; 2] = [-0.3, 0.2];

/// Actors and constraints added by the mechanisms, in creation order.
#[derive(Clone, Debug, Default)]
pub struct Assembly {
    pub actors: Vec<ActorId>,
    pub constraints: Vec<ConstraintId>,
}

fn at(x: f32, y: f32, z: f32) -> Isometry3<f32> {
    Isometry3::from_parts(Translation3::new(x, y, z), UnitQuaternion::identity())
}

fn turned(x: f32, y: f32, z: f32, axis: Vector3<f32>, deg: f32) -> Isometry3<f32> {
    let rotation = UnitQuaternion::from_scaled_axis(axis * deg.to_radians());
    Isometry3::from_parts(Translation3::new(x, y, z), rotation)
}

impl Assembly {
    fn dynamic(
        &mut self,
        scene: &mut PhysicsScene,
        name: &str,
        pose: Isometry3<f32>,
        density: f32,
        shapes: &[(Geometry, Isometry3<f32>)],
        color: Rgba,
    ) -> CourseResult<ActorId> {
        let id = scene.create_dynamic(pose, density);
        scene.set_name(id, name)?;
        for (geometry, local_pose) in shapes {
            let index = scene.add_shape(id, geometry.clone(), *local_pose, None)?;
            scene.set_color(id, index, color)?;
        }
        self.actors.push(id);
        Ok(id)
    }

    fn dynamic_box(
        &mut self,
        scene: &mut PhysicsScene,
        name: &str,
        pose: Isometry3<f32>,
        half: [f32; 3],
        density: f32,
    ) -> CourseResult<ActorId> {
        let [hx, hy, hz] = half;
        self.dynamic(
            scene,
            name,
            pose,
            density,
            &[(Geometry::cuboid(hx, hy, hz), Isometry3::identity())],
            palette::SOFT_BLUE,
        )
    }

    /// Bar resting against the right wall of the first straight, pulled across
    /// by a stiff drive with a tiny force budget.
    pub fn sweeper(&mut self, scene: &mut PhysicsScene) -> CourseResult<ActorId> {
        let anchor = at(3.4, 1.6, -12.0);
        let bar = self.dynamic_box(scene, "sweeper", anchor, [0.2, 0.2, 4.0], 1.0)?;
        let spec = SixAxisSpec::locked()
            .with_motion(Axis::LinX, AxisMotion::Free)
            .with_drive(Axis::LinX, DriveSpec::hard(-3.4, 1.0, 1.0));
        let joint = scene.create_generic_6axis(None, anchor, bar, Isometry3::identity(), spec)?;
        self.constraints.push(joint);
        Ok(bar)
    }

    /// Cross-shaped rotor spinning about the anchor frame's X axis.
    pub fn windmill(
        &mut self,
        scene: &mut PhysicsScene,
        name: &str,
        hub: Isometry3<f32>,
    ) -> CourseResult<ActorId> {
        let arms = [
            (Geometry::cuboid(0.2, 0.2, 3.3), Isometry3::identity()),
            (Geometry::cuboid(0.2, 3.3, 0.2), Isometry3::identity()),
        ];
        let rotor = self.dynamic(scene, name, hub, 1.0, &arms, palette::WALL_BROWN)?;
        scene.set_gravity_enabled(rotor, false)?;
        let joint = scene.create_hinge(
            None,
            hub,
            rotor,
            Isometry3::identity(),
            Some(DriveSpec::velocity(WINDMILL_SPEED)),
        )?;
        self.constraints.push(joint);
        Ok(rotor)
    }

    /// Free sliding gate across the first corner.
    pub fn push_slider(&mut self, scene: &mut PhysicsScene) -> CourseResult<ActorId> {
        let anchor = at(28.0, 1.65, -24.0);
        let gate = self.dynamic_box(scene, "push_slider", anchor, [0.2, 0.2, 3.55], 1.0)?;
        let frame = Isometry3::identity();
        let joint = scene.create_slider(None, anchor, gate, frame, AxisMotion::Free, None)?;
        self.constraints.push(joint);
        Ok(gate)
    }

    /// Two light doors welded at the middle, each swinging on its outer edge.
    pub fn doors(&mut self, scene: &mut PhysicsScene) -> CourseResult<(ActorId, ActorId)> {
        let half = [1.6, 1.8, 0.2];
        let right = self.dynamic_box(scene, "door_right", at(33.8, 3.2, -8.0), half, DOOR_DENSITY)?;
        let left = self.dynamic_box(scene, "door_left", at(30.2, 3.2, -8.0), half, DOOR_DENSITY)?;

        let seam = at(32.0, 3.2, -8.0);
        let weld = scene.create_fixed(
            Some(left),
            scene.frame_in_actor(Some(left), seam)?,
            right,
            scene.frame_in_actor(Some(right), seam)?,
            Some(BreakThreshold::uniform(DOOR_BREAK_FORCE)),
        )?;
        self.constraints.push(weld);

        let swing = SixAxisSpec::locked().with_motion(Axis::AngY, AxisMotion::Free);
        for (door, hinge_x) in [(right, 35.5), (left, 28.5)] {
            let hinge = at(hinge_x, 3.2, -8.0);
            let local = scene.frame_in_actor(Some(door), hinge)?;
            let joint = scene.create_generic_6axis(None, hinge, door, local, swing)?;
            self.constraints.push(joint);
        }
        Ok((left, right))
    }

    /// Five posts hanging from ball joints above a straight.
    pub fn dangles(&mut self, scene: &mut PhysicsScene) -> CourseResult<()> {
        for (i, z) in [16.0, 17.0, 15.0, 14.0, 18.0].into_iter().enumerate() {
            let name = format!("dangle{}", i + 1);
            let post = self.dynamic_box(scene, &name, at(40.0, 3.4, z), [0.2, 2.0, 0.2], 1.0)?;
            let pivot = at(40.0, 5.5, z);
            let local = scene.frame_in_actor(Some(post), pivot)?;
            let joint = scene.create_ball(None, pivot, post, local)?;
            self.constraints.push(joint);
        }
        Ok(())
    }

    /// Sprung pad sitting in a trampoline segment's pit.
    pub fn trampoline_pad(
        &mut self,
        scene: &mut PhysicsScene,
        segment: Isometry3<f32>,
    ) -> CourseResult<ActorId> {
        let pose = segment * at(0.0, 0.2, 0.0);
        let pad = self.dynamic_box(scene, "trampoline_pad", pose, [3.55, 0.2, 3.95], 1.0)?;
        scene.set_color(pad, 0, palette::SOFT_BLUE)?;
        scene.set_gravity_enabled(pad, false)?;

        // Slide along the pad's up axis.
        let local = turned(0.0, 0.0, 0.0, Vector3::z(), 90.0);
        let (min, max) = (TRAMPOLINE_TRAVEL[0], TRAMPOLINE_TRAVEL[1]);
        let joint = scene.create_slider(
            None,
            pose * local,
            pad,
            local,
            AxisMotion::Limited { min, max },
            Some(DriveSpec::spring(0.0, TRAMPOLINE_STIFFNESS, TRAMPOLINE_DAMPING)),
        )?;
        self.constraints.push(joint);
        Ok(pad)
    }

    /// Dumbbell of two light spheres on a breakable weld.
    pub fn twin_spheres(&mut self, scene: &mut PhysicsScene) -> CourseResult<ConstraintId> {
        let ball = [(Geometry::Sphere { radius: 0.5 }, Isometry3::identity())];
        let color = palette::SOFT_BLUE;
        let a = self.dynamic(scene, "sphere_a", at(68.0, 1.9, 15.0), 0.1, &ball, color)?;
        let b = self.dynamic(scene, "sphere_b", at(68.0, 1.9, 17.0), 0.1, &ball, color)?;

        let middle = at(68.0, 1.9, 16.0);
        let joint = scene.create_fixed(
            Some(a),
            scene.frame_in_actor(Some(a), middle)?,
            b,
            scene.frame_in_actor(Some(b), middle)?,
            Some(BreakThreshold::uniform(TWIN_SPHERE_BREAK_FORCE)),
        )?;
        self.constraints.push(joint);
        Ok(joint)
    }

    /// Kinematic wall closing the end of the sand run.
    pub fn sand_stopper(&mut self, scene: &mut PhysicsScene) -> CourseResult<ActorId> {
        let pose = at(72.0, 1.0, 59.8);
        let stopper = self.dynamic_box(scene, "sand_stopper", pose, [3.6, 1.0, 0.2], 1.0)?;
        scene.set_kinematic(stopper, true)?;
        scene.set_color(stopper, 0, palette::WALL_BROWN)?;
        Ok(stopper)
    }

    /// Pole, flag and goal trigger at the hole. Returns the goal actor and its
    /// trigger shape.
    pub fn finish(
        &mut self,
        scene: &mut PhysicsScene,
        hole: [f32; 3],
    ) -> CourseResult<(ActorId, ColliderHandle)> {
        let [x, _, z] = hole;

        let pole_shape = [(
            Geometry::Capsule {
                radius: 0.05,
                half_height: 4.0,
            },
            Isometry3::identity(),
        )];
        let pole = self.dynamic(scene, "pole", at(x, 4.0, z), 1.0, &pole_shape, palette::POLE_RED)?;
        scene.set_kinematic(pole, true)?;
        // The pole stands in the cup; the ball must fall past it.
        scene.set_simulated(pole, 0, false)?;

        let flag = scene.create_static(turned(x, 6.5, z - 0.75, Vector3::z(), 90.0));
        scene.set_name(flag, "flag")?;
        let sheet = Geometry::ClothSheet {
            half_width: 0.75,
            half_depth: 0.75,
            columns: 10,
            rows: 10,
        };
        scene.add_shape(flag, sheet, Isometry3::identity(), None)?;
        scene.set_color(flag, 0, palette::WHITE)?;
        self.actors.push(flag);

        // Smaller than the 0.8 x 0.8 opening so only a ball that drops in counts.
        let goal = scene.create_static(at(x, 0.5, z));
        scene.set_name(goal, GOAL_NAME)?;
        let shape = scene.add_shape(
            goal,
            Geometry::cuboid(0.35, 0.45, 0.35),
            Isometry3::identity(),
            Some(Material::DEFAULT),
        )?;
        scene.set_trigger(goal, shape, true)?;
        scene.set_color(goal, shape, palette::INVISIBLE)?;
        let trigger = scene.actor(goal)?.shapes()[shape].collider();
        self.actors.push(goal);

        debug!(?goal, ?trigger, "finish assembled");
        Ok((goal, trigger))
    }
}
