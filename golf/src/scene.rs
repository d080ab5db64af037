//! Owned rapier world for one golf session.
//!
//! `PhysicsScene` bundles every rapier set and pipeline the session needs, plus
//! the actor and constraint registries that sit on top of them. Actor and
//! constraint operations live in `actor::library` and `constraint::library`.

use rapier3d::na::{Isometry3, Vector3};
use rapier3d::prelude::*;
use tracing::debug;

use crate::actor::RigidActor;
use crate::constraint::{Constraint, ConstraintState};
use crate::events::{StepEventCollector, StepEvents};
use crate::settings::{DEFAULT_TIMESTEP, GRAVITY_MPS2};

/// Engine-level settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    /// Gravity in m/s², world space.
    pub gravity: Vector3<f32>,
    /// Step used when the caller does not provide one.
    pub timestep: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vector3::new(0.0, -GRAVITY_MPS2, 0.0),
            timestep: DEFAULT_TIMESTEP,
        }
    }
}

pub struct PhysicsScene {
    pub(crate) gravity: Vector3<f32>,
    pub(crate) integration_parameters: IntegrationParameters,
    pub(crate) pipeline: PhysicsPipeline,
    pub(crate) islands: IslandManager,
    pub(crate) broad_phase: BroadPhaseBvh,
    pub(crate) narrow_phase: NarrowPhase,
    pub(crate) bodies: RigidBodySet,
    pub(crate) colliders: ColliderSet,
    pub(crate) impulse_joints: ImpulseJointSet,
    pub(crate) multibody_joints: MultibodyJointSet,
    pub(crate) ccd_solver: CCDSolver,
    pub(crate) collector: StepEventCollector,

    /// Hidden fixed body standing in for "the world" as a constraint endpoint.
    pub(crate) world_anchor: RigidBodyHandle,

    /// Live actors; `actors[i]` has id `first_actor + i`.
    pub(crate) actors: Vec<RigidActor>,
    /// Id of the first actor created since the last teardown. Ids below it are
    /// gone and never handed out again.
    pub(crate) first_actor: u32,
    /// Same layout as actors.
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) first_constraint: u32,
}

impl PhysicsScene {
    pub fn new(config: PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.timestep;

        let mut bodies = RigidBodySet::new();
        let world_anchor = bodies.insert(RigidBodyBuilder::fixed().build());

        Self {
            gravity: config.gravity,
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            collector: StepEventCollector::new(),
            world_anchor,
            actors: Vec::new(),
            first_actor: 0,
            constraints: Vec::new(),
            first_constraint: 0,
        }
    }

    pub fn gravity(&self) -> Vector3<f32> {
        self.gravity
    }

    /// Advance the simulation by `dt` seconds and return what happened.
    ///
    /// A non-positive `dt` does nothing.
    pub fn step(&mut self, dt: f32) -> StepEvents {
        if dt <= 0.0 {
            return StepEvents::default();
        }
        self.integration_parameters.dt = dt;

        let samples = self.sample_loads();
        let hooks = ();
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &hooks,
            &self.collector,
        );

        let mut events = self.collector.drain();
        events.broken = self.detect_breaks(dt, samples);
        events
    }

    /// Remove every actor and constraint from the engine.
    ///
    /// The registries are emptied, but the id counters keep running: stale ids
    /// report [`CourseError::ActorDestroyed`] or
    /// [`CourseError::ConstraintRemoved`] instead of aliasing new entries.
    ///
    /// [`CourseError::ActorDestroyed`]: crate::error::CourseError::ActorDestroyed
    /// [`CourseError::ConstraintRemoved`]: crate::error::CourseError::ConstraintRemoved
    pub fn teardown(&mut self) {
        // Broken constraints already left the joint set.
        for constraint in &self.constraints {
            if constraint.state == ConstraintState::Attached {
                self.impulse_joints.remove(constraint.joint, false);
            }
        }

        for actor in &self.actors {
            self.bodies.remove(
                actor.body,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }

        // Stale pairs from removed colliders must not leak into the next batch.
        let dropped = self.collector.drain();
        debug!(
            actors = self.actors.len(),
            constraints = self.constraints.len(),
            stale_events = dropped.triggers.len() + dropped.contacts.len(),
            "scene torn down"
        );

        self.first_actor += self.actors.len() as u32;
        self.actors.clear();
        self.first_constraint += self.constraints.len() as u32;
        self.constraints.clear();
    }

    /// World pose of a rigid body.
    pub(crate) fn body_pose(&self, body: RigidBodyHandle) -> Option<Isometry3<f32>> {
        let rb = self.bodies.get(body)?;
        Some(Isometry3::from_parts((*rb.translation()).into(), *rb.rotation()))
    }
}

impl Default for PhysicsScene {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}
