use rapier3d::na::{Isometry3, Vector3};
use rapier3d::prelude::*;
use tracing::{debug, info};

use super::{
    Axis, AxisMotion, BreakThreshold, Constraint, ConstraintId, ConstraintKind, ConstraintState,
    DriveSpec, SixAxisSpec,
};
use crate::actor::ActorId;
use crate::error::{CourseError, CourseResult};
use crate::scene::PhysicsScene;

fn build_joint(
    spec: &SixAxisSpec,
    frame_a: Isometry3<f32>,
    frame_b: Isometry3<f32>,
) -> GenericJoint {
    let mut joint = GenericJointBuilder::new(spec.locked_mask())
        .local_frame1(frame_a)
        .local_frame2(frame_b)
        .contacts_enabled(false)
        .build();

    for axis in Axis::ALL {
        let joint_axis = axis.joint_axis();
        if let AxisMotion::Limited { min, max } = spec.motion(axis) {
            joint.set_limits(joint_axis, [min, max]);
        }
        if let Some(drive) = spec.drive(axis) {
            joint
                .set_motor(
                    joint_axis,
                    drive.target_position,
                    drive.target_velocity,
                    drive.stiffness,
                    drive.damping,
                )
                .set_motor_max_force(joint_axis, drive.force_limit);
        }
    }
    joint
}

impl PhysicsScene {
    /// Rigidly weld `b` to `a` (or to the world). Optionally breakable.
    pub fn create_fixed(
        &mut self,
        a: Option<ActorId>,
        frame_a: Isometry3<f32>,
        b: ActorId,
        frame_b: Isometry3<f32>,
        break_threshold: Option<BreakThreshold>,
    ) -> CourseResult<ConstraintId> {
        let id = self.insert_constraint(
            ConstraintKind::Fixed,
            (a, frame_a),
            (b, frame_b),
            SixAxisSpec::locked(),
        )?;
        if let Some(threshold) = break_threshold {
            self.set_break_force(id, threshold.force, threshold.torque)?;
        }
        Ok(id)
    }

    /// Rotation about the anchor frame's X axis, optionally motorized.
    pub fn create_hinge(
        &mut self,
        a: Option<ActorId>,
        frame_a: Isometry3<f32>,
        b: ActorId,
        frame_b: Isometry3<f32>,
        drive: Option<DriveSpec>,
    ) -> CourseResult<ConstraintId> {
        let mut spec = SixAxisSpec::locked().with_motion(Axis::AngX, AxisMotion::Free);
        if let Some(drive) = drive {
            spec = spec.with_drive(Axis::AngX, drive);
        }
        self.insert_constraint(ConstraintKind::Hinge, (a, frame_a), (b, frame_b), spec)
    }

    /// Translation along the anchor frame's X axis.
    pub fn create_slider(
        &mut self,
        a: Option<ActorId>,
        frame_a: Isometry3<f32>,
        b: ActorId,
        frame_b: Isometry3<f32>,
        motion: AxisMotion,
        drive: Option<DriveSpec>,
    ) -> CourseResult<ConstraintId> {
        let mut spec = SixAxisSpec::locked().with_motion(Axis::LinX, motion);
        if let Some(drive) = drive {
            spec = spec.with_drive(Axis::LinX, drive);
        }
        self.insert_constraint(ConstraintKind::Slider, (a, frame_a), (b, frame_b), spec)
    }

    /// Point-to-point: anchors coincide, rotation is free.
    pub fn create_ball(
        &mut self,
        a: Option<ActorId>,
        frame_a: Isometry3<f32>,
        b: ActorId,
        frame_b: Isometry3<f32>,
    ) -> CourseResult<ConstraintId> {
        let spec = SixAxisSpec::locked()
            .with_motion(Axis::AngX, AxisMotion::Free)
            .with_motion(Axis::AngY, AxisMotion::Free)
            .with_motion(Axis::AngZ, AxisMotion::Free);
        self.insert_constraint(ConstraintKind::Ball, (a, frame_a), (b, frame_b), spec)
    }

    pub fn create_generic_6axis(
        &mut self,
        a: Option<ActorId>,
        frame_a: Isometry3<f32>,
        b: ActorId,
        frame_b: Isometry3<f32>,
        spec: SixAxisSpec,
    ) -> CourseResult<ConstraintId> {
        self.insert_constraint(ConstraintKind::Generic6Axis, (a, frame_a), (b, frame_b), spec)
    }

    fn insert_constraint(
        &mut self,
        kind: ConstraintKind,
        (a, frame_a): (Option<ActorId>, Isometry3<f32>),
        (b, frame_b): (ActorId, Isometry3<f32>),
        spec: SixAxisSpec,
    ) -> CourseResult<ConstraintId> {
        if a == Some(b) {
            return Err(CourseError::SelfConstraint(b));
        }
        let body_a = match a {
            Some(a) => self.actor(a)?.body(),
            None => self.world_anchor,
        };
        let body_b = self.actor(b)?.body();

        let joint = build_joint(&spec, frame_a, frame_b);
        let handle = self.impulse_joints.insert(body_a, body_b, joint, true);

        let id = ConstraintId(self.first_constraint + self.constraints.len() as u32);
        self.constraints.push(Constraint {
            id,
            kind,
            first: a,
            second: b,
            spec,
            joint: handle,
            break_threshold: None,
            state: ConstraintState::Attached,
        });
        debug!(?id, ?kind, ?a, ?b, "constraint created");
        Ok(id)
    }

    /// Registry slot of a constraint. Ids from before the last teardown report
    /// [`CourseError::ConstraintRemoved`].
    fn constraint_index(&self, id: ConstraintId) -> CourseResult<usize> {
        let index = id
            .0
            .checked_sub(self.first_constraint)
            .ok_or(CourseError::ConstraintRemoved(id))? as usize;
        if index >= self.constraints.len() {
            return Err(CourseError::UnknownConstraint(id));
        }
        Ok(index)
    }

    pub fn constraint(&self, id: ConstraintId) -> CourseResult<&Constraint> {
        Ok(&self.constraints[self.constraint_index(id)?])
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// `false` once the constraint broke or was torn down.
    pub fn is_enabled(&self, id: ConstraintId) -> CourseResult<bool> {
        match self.constraint(id) {
            Ok(constraint) => Ok(constraint.is_enabled()),
            Err(CourseError::ConstraintRemoved(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub fn constraint_kind(&self, id: ConstraintId) -> CourseResult<ConstraintKind> {
        Ok(self.constraint(id)?.kind)
    }

    pub fn constraint_endpoints(
        &self,
        id: ConstraintId,
    ) -> CourseResult<(Option<ActorId>, ActorId)> {
        Ok(self.constraint(id)?.endpoints())
    }

    /// Make a constraint breakable. Takes effect from the next step.
    pub fn set_break_force(
        &mut self,
        id: ConstraintId,
        force: f32,
        torque: f32,
    ) -> CourseResult<()> {
        let index = self.constraint_index(id)?;
        self.constraints[index].break_threshold = Some(BreakThreshold::new(force, torque));
        Ok(())
    }

    /// Express a world-space anchor frame in an actor's local frame.
    ///
    /// `None` is the world itself, whose frame is the identity.
    pub fn frame_in_actor(
        &self,
        actor: Option<ActorId>,
        world_frame: Isometry3<f32>,
    ) -> CourseResult<Isometry3<f32>> {
        match actor {
            Some(actor) => Ok(self.actor_pose(actor)?.inverse() * world_frame),
            None => Ok(world_frame),
        }
    }

    /// Velocities of the dynamic, awake endpoints of every breakable constraint,
    /// taken before a step so the whole-step load can be measured after it.
    pub(crate) fn sample_loads(&self) -> Vec<LoadSample> {
        self.constraints
            .iter()
            .filter(|c| c.state == ConstraintState::Attached && c.break_threshold.is_some())
            .filter_map(|c| {
                let joint = self.impulse_joints.get(c.joint)?;
                let bodies = [joint.body1, joint.body2]
                    .into_iter()
                    .filter_map(|handle| {
                        let rb = self.bodies.get(handle)?;
                        (rb.is_dynamic() && !rb.is_sleeping())
                            .then(|| (handle, *rb.linvel(), *rb.angvel()))
                    })
                    .collect();
                Some(LoadSample {
                    constraint: c.id,
                    bodies,
                })
            })
            .collect()
    }

    /// Remove every breakable constraint whose load over the last step exceeded
    /// its threshold. Returns the ones that broke.
    ///
    /// The load is the larger of the joint's own last-substep impulse and the
    /// net momentum change of each endpoint beyond what gravity explains, so
    /// short impacts resolved by contacts still count.
    pub(crate) fn detect_breaks(
        &mut self,
        dt: f32,
        samples: Vec<LoadSample>,
    ) -> Vec<ConstraintId> {
        let mut broken = Vec::new();
        for sample in samples {
            let Ok(index) = self.constraint_index(sample.constraint) else {
                continue;
            };
            let constraint = &mut self.constraints[index];
            let Some(threshold) = constraint.break_threshold else {
                continue;
            };
            let Some(joint) = self.impulse_joints.get(constraint.joint) else {
                continue;
            };

            let impulses = joint.impulses;
            let mut force = Vector3::new(impulses[0], impulses[1], impulses[2]).norm() / dt;
            let mut torque = Vector3::new(impulses[3], impulses[4], impulses[5]).norm() / dt;
            for (handle, linvel, angvel) in &sample.bodies {
                let Some(rb) = self.bodies.get(*handle) else {
                    continue;
                };
                let (f, t) = endpoint_load(rb, linvel, angvel, &self.gravity, dt);
                force = force.max(f);
                torque = torque.max(t);
            }
            if force <= threshold.force && torque <= threshold.torque {
                continue;
            }

            // Removing the joint, not just disabling it, lets the endpoints
            // collide with each other again.
            self.impulse_joints.remove(constraint.joint, true);
            constraint.state = ConstraintState::Broken;
            info!(id = ?constraint.id, force, torque, "constraint broke");
            broken.push(constraint.id);
        }
        broken
    }
}

/// Endpoint velocities captured before a step.
pub(crate) struct LoadSample {
    constraint: ConstraintId,
    bodies: Vec<(RigidBodyHandle, Vector3<f32>, Vector3<f32>)>,
}

/// Force and torque needed to change a body's velocity over `dt`, minus gravity.
fn endpoint_load(
    rb: &RigidBody,
    linvel_before: &Vector3<f32>,
    angvel_before: &Vector3<f32>,
    gravity: &Vector3<f32>,
    dt: f32,
) -> (f32, f32) {
    let dv = rb.linvel() - linvel_before - gravity * (rb.gravity_scale() * dt);
    let force = rb.mass() * dv.norm() / dt;

    let mprops = &rb.mass_properties().local_mprops;
    let to_principal = rb.rotation() * mprops.principal_inertia_local_frame;
    let dw = to_principal.inverse_transform_vector(&(rb.angvel() - angvel_before));
    let torque = mprops.principal_inertia().component_mul(&dw).norm() / dt;
    (force, torque)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Geometry;
    use rapier3d::na::{Translation3, UnitQuaternion};

    const DT: f32 = 1.0 / 60.0;

    fn at(x: f32, y: f32, z: f32) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::new(x, y, z), UnitQuaternion::identity())
    }

    fn heavy_box(scene: &mut PhysicsScene, pose: Isometry3<f32>) -> ActorId {
        let id = scene.create_dynamic(pose, 10.0);
        scene
            .add_shape(id, Geometry::cuboid(0.5, 0.5, 0.5), Isometry3::identity(), None)
            .unwrap();
        id
    }

    #[test]
    fn kinds_are_known_up_front() {
        let mut scene = PhysicsScene::default();
        let a = heavy_box(&mut scene, at(0.0, 5.0, 0.0));
        let b = heavy_box(&mut scene, at(2.0, 5.0, 0.0));

        let hinge = scene
            .create_hinge(Some(a), Isometry3::identity(), b, Isometry3::identity(), None)
            .unwrap();
        let ball = scene
            .create_ball(None, at(0.0, 6.0, 0.0), a, at(0.0, 1.0, 0.0))
            .unwrap();

        assert_eq!(scene.constraint_kind(hinge), Ok(ConstraintKind::Hinge));
        assert_eq!(scene.constraint_kind(ball), Ok(ConstraintKind::Ball));
        assert_eq!(scene.constraint_endpoints(hinge), Ok((Some(a), b)));
        assert_eq!(scene.constraint_endpoints(ball), Ok((None, a)));
        assert_eq!(scene.is_enabled(ball), Ok(true));
    }

    #[test]
    fn self_constraints_are_rejected() {
        let mut scene = PhysicsScene::default();
        let a = heavy_box(&mut scene, at(0.0, 5.0, 0.0));
        assert_eq!(
            scene.create_fixed(Some(a), Isometry3::identity(), a, Isometry3::identity(), None),
            Err(CourseError::SelfConstraint(a))
        );
        assert_eq!(
            scene.is_enabled(ConstraintId(7)),
            Err(CourseError::UnknownConstraint(ConstraintId(7)))
        );
    }

    #[test]
    fn frame_in_actor_inverts_the_actor_pose() {
        let mut scene = PhysicsScene::default();
        let a = heavy_box(&mut scene, at(1.0, 2.0, 3.0));
        let local = scene.frame_in_actor(Some(a), at(1.0, 5.0, 3.0)).unwrap();
        assert!((local.translation.vector - Vector3::new(0.0, 3.0, 0.0)).norm() < 1e-5);
        assert_eq!(scene.frame_in_actor(None, at(1.0, 5.0, 3.0)).unwrap(), at(1.0, 5.0, 3.0));
    }

    #[test]
    fn overloaded_constraint_breaks_for_good() {
        let mut scene = PhysicsScene::default();
        // Roughly 10 kg hanging from the world: ~98 N against a 10 N threshold.
        let weight = heavy_box(&mut scene, at(0.0, 50.0, 0.0));
        let joint = scene
            .create_fixed(
                None,
                at(0.0, 50.0, 0.0),
                weight,
                Isometry3::identity(),
                Some(BreakThreshold::uniform(10.0)),
            )
            .unwrap();

        let mut broke_at = None;
        for i in 0..10 {
            let events = scene.step(DT);
            if events.broken.contains(&joint) {
                broke_at = Some(i);
                break;
            }
        }
        assert!(broke_at.is_some());
        assert_eq!(scene.is_enabled(joint), Ok(false));

        // From here on the box is in free fall.
        let v0 = scene.linear_velocity(weight).unwrap().y;
        for _ in 0..30 {
            let events = scene.step(DT);
            assert!(events.broken.is_empty());
            assert_eq!(scene.is_enabled(joint), Ok(false));
        }
        let v1 = scene.linear_velocity(weight).unwrap().y;
        let expected = -scene.gravity().y.abs() * 30.0 * DT;
        assert!(((v1 - v0) - expected).abs() < 0.05, "dv = {}", v1 - v0);
    }

    #[test]
    fn strong_constraint_holds() {
        let mut scene = PhysicsScene::default();
        let weight = heavy_box(&mut scene, at(0.0, 50.0, 0.0));
        let joint = scene
            .create_fixed(
                None,
                at(0.0, 50.0, 0.0),
                weight,
                Isometry3::identity(),
                Some(BreakThreshold::uniform(1.0e6)),
            )
            .unwrap();
        for _ in 0..60 {
            scene.step(DT);
        }
        assert_eq!(scene.is_enabled(joint), Ok(true));
        let y = scene.actor_pose(weight).unwrap().translation.y;
        assert!((y - 50.0).abs() < 0.05, "y = {y}");
    }

    #[test]
    fn velocity_driven_hinge_spins() {
        let mut scene = PhysicsScene::default();
        let arm = heavy_box(&mut scene, at(0.0, 5.0, 0.0));
        scene.set_gravity_enabled(arm, false).unwrap();
        scene
            .create_hinge(
                None,
                at(0.0, 5.0, 0.0),
                arm,
                Isometry3::identity(),
                Some(DriveSpec::velocity(1.0)),
            )
            .unwrap();
        for _ in 0..60 {
            scene.step(DT);
        }
        let w = scene.angular_velocity(arm).unwrap();
        assert!(w.x.abs() > 0.5, "w = {w:?}");
        assert!(w.y.abs() < 0.05 && w.z.abs() < 0.05);
    }

    #[test]
    fn teardown_removes_constraints() {
        let mut scene = PhysicsScene::default();
        let a = heavy_box(&mut scene, at(0.0, 5.0, 0.0));
        let joint = scene
            .create_ball(None, at(0.0, 6.0, 0.0), a, at(0.0, 1.0, 0.0))
            .unwrap();
        scene.teardown();
        assert_eq!(scene.is_enabled(joint), Ok(false));
        assert_eq!(scene.constraint(joint).err(), Some(CourseError::ConstraintRemoved(joint)));

        // A fresh constraint after teardown gets a new id in the same slot.
        let b = heavy_box(&mut scene, at(0.0, 5.0, 0.0));
        let next = scene
            .create_ball(None, at(0.0, 6.0, 0.0), b, at(0.0, 1.0, 0.0))
            .unwrap();
        assert_ne!(next, joint);
        assert_eq!(scene.constraints().count(), 1);
        assert_eq!(scene.is_enabled(next), Ok(true));
    }

    fn floating_sphere(scene: &mut PhysicsScene, pose: Isometry3<f32>) -> ActorId {
        let id = scene.create_dynamic(pose, 1.0);
        scene
            .add_shape(id, Geometry::Sphere { radius: 0.5 }, Isometry3::identity(), None)
            .unwrap();
        scene.set_gravity_enabled(id, false).unwrap();
        id
    }

    fn welded_pair(scene: &mut PhysicsScene) -> (ActorId, ActorId, ConstraintId) {
        let a = floating_sphere(scene, at(0.0, 5.0, 0.0));
        let b = floating_sphere(scene, at(0.0, 5.0, 2.0));
        let seam = at(0.0, 5.0, 1.0);
        let frame_a = scene.frame_in_actor(Some(a), seam).unwrap();
        let frame_b = scene.frame_in_actor(Some(b), seam).unwrap();
        let joint = scene
            .create_fixed(Some(a), frame_a, b, frame_b, Some(BreakThreshold::uniform(1.0)))
            .unwrap();
        (a, b, joint)
    }

    #[test]
    fn impact_load_breaks_a_weld() {
        let mut scene = PhysicsScene::default();
        let (a, b, joint) = welded_pair(&mut scene);
        // Closing at 10 m/s: the weld has to stop about 0.5 kg per sphere
        // within one step, far beyond 1 N.
        scene.set_linear_velocity(a, Vector3::new(0.0, 0.0, 5.0)).unwrap();
        scene.set_linear_velocity(b, Vector3::new(0.0, 0.0, -5.0)).unwrap();

        let mut broke = false;
        for _ in 0..3 {
            if scene.step(DT).broken.contains(&joint) {
                broke = true;
                break;
            }
        }
        assert!(broke);
        assert_eq!(scene.is_enabled(joint), Ok(false));
        assert_eq!(scene.constraint(joint).unwrap().state(), ConstraintState::Broken);
    }

    #[test]
    fn resting_weld_stays_attached() {
        let mut scene = PhysicsScene::default();
        let (_, _, joint) = welded_pair(&mut scene);
        for _ in 0..60 {
            assert!(scene.step(DT).broken.is_empty());
        }
        assert_eq!(scene.is_enabled(joint), Ok(true));
    }

    #[test]
    fn broken_weld_no_longer_blocks_contacts() {
        let mut scene = PhysicsScene::default();
        let (a, b, joint) = welded_pair(&mut scene);
        scene.set_linear_velocity(a, Vector3::new(0.0, 0.0, 5.0)).unwrap();
        scene.set_linear_velocity(b, Vector3::new(0.0, 0.0, -5.0)).unwrap();
        for _ in 0..3 {
            scene.step(DT);
        }
        assert_eq!(scene.is_enabled(joint), Ok(false));

        scene.reset_motion(a, at(0.0, 5.0, 0.0)).unwrap();
        scene.reset_motion(b, at(0.0, 5.0, 3.0)).unwrap();
        scene.set_linear_velocity(b, Vector3::new(0.0, 0.0, -5.0)).unwrap();

        let mut closest = f32::MAX;
        for _ in 0..60 {
            scene.step(DT);
            let pa = scene.actor_pose(a).unwrap().translation.vector;
            let pb = scene.actor_pose(b).unwrap().translation.vector;
            closest = closest.min((pb - pa).norm());
        }
        // Two 0.5 m spheres: centers never get much closer than 1 m.
        assert!(closest > 0.9, "closest = {closest}");
    }
}
