use rapier3d::na::{Isometry3, Vector3};
use rapier3d::prelude::*;
use tracing::debug;

use super::{ActorId, Geometry, Material, MotionKind, RigidActor, Rgba, ShapeIndex, ShapeRecord};
use crate::error::{CourseError, CourseResult};
use crate::filter::FilterData;
use crate::scene::PhysicsScene;
use crate::user_data::{ColliderTag, ShapeFlags, pack_tag, unpack_tag};

fn shape_flags(shape: &ShapeRecord) -> ShapeFlags {
    ShapeFlags::default()
        .with(ShapeFlags::TRIGGER, shape.trigger)
        .with(ShapeFlags::VISUAL_ONLY, !shape.simulated)
        .with(ShapeFlags::PLANE, shape.geometry.is_plane())
}

impl PhysicsScene {
    /// Static actor at `pose`. It never moves.
    pub fn create_static(&mut self, pose: Isometry3<f32>) -> ActorId {
        self.insert_actor(RigidBodyBuilder::fixed().pose(pose), MotionKind::Static, 0.0)
    }

    /// Dynamic actor at `pose`. `density` applies to every shape added later.
    pub fn create_dynamic(&mut self, pose: Isometry3<f32>, density: f32) -> ActorId {
        self.insert_actor(
            RigidBodyBuilder::dynamic().pose(pose),
            MotionKind::Dynamic,
            density,
        )
    }

    fn insert_actor(
        &mut self,
        builder: RigidBodyBuilder,
        kind: MotionKind,
        density: f32,
    ) -> ActorId {
        let id = ActorId(self.first_actor + self.actors.len() as u32);
        let body = self.bodies.insert(builder.build());
        self.actors.push(RigidActor {
            id,
            name: format!("actor{}", id.0),
            kind,
            body,
            density,
            filter: FilterData::default(),
            shapes: Vec::new(),
        });
        id
    }

    /// Registry slot of a live actor.
    fn actor_index(&self, id: ActorId) -> CourseResult<usize> {
        let index = id
            .0
            .checked_sub(self.first_actor)
            .ok_or(CourseError::ActorDestroyed(id))? as usize;
        if index >= self.actors.len() {
            return Err(CourseError::UnknownActor(id));
        }
        Ok(index)
    }

    /// Live actor lookup.
    pub fn actor(&self, id: ActorId) -> CourseResult<&RigidActor> {
        Ok(&self.actors[self.actor_index(id)?])
    }

    fn actor_mut(&mut self, id: ActorId) -> CourseResult<&mut RigidActor> {
        let index = self.actor_index(id)?;
        Ok(&mut self.actors[index])
    }

    fn shape_mut(&mut self, id: ActorId, index: ShapeIndex) -> CourseResult<&mut ShapeRecord> {
        let actor = self.actor_mut(id)?;
        let count = actor.shapes.len();
        actor.shapes.get_mut(index).ok_or(CourseError::ShapeOutOfRange {
            actor: id,
            index,
            count,
        })
    }

    /// Every live actor, in creation order.
    pub fn actors(&self) -> impl Iterator<Item = &RigidActor> {
        self.actors.iter()
    }

    pub fn find_actor(&self, name: &str) -> Option<ActorId> {
        self.actors().find(|a| a.name == name).map(|a| a.id)
    }

    /// Owning actor of a collider, read back from its packed user data.
    pub fn actor_for_collider(&self, collider: ColliderHandle) -> Option<ActorId> {
        let collider = self.colliders.get(collider)?;
        Some(ActorId(unpack_tag(collider.user_data).actor))
    }

    /// Attach a shape at `local_pose` in the actor's frame.
    ///
    /// The shape inherits the actor's current filter data. `material` defaults to
    /// [`Material::DEFAULT`].
    pub fn add_shape(
        &mut self,
        id: ActorId,
        geometry: Geometry,
        local_pose: Isometry3<f32>,
        material: Option<Material>,
    ) -> CourseResult<ShapeIndex> {
        let actor = self.actor(id)?;
        let (body, density, filter, kind) = (actor.body, actor.density, actor.filter, actor.kind);

        let builder = geometry
            .collider_builder()
            .ok_or(CourseError::DegenerateHull(id))?;
        let material = material.unwrap_or_default();
        let simulated = !geometry.is_visual_only();

        let mut builder = material
            .apply(builder)
            .translation(local_pose.translation.vector)
            .rotation(local_pose.rotation.scaled_axis())
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .enabled(simulated);
        if kind == MotionKind::Dynamic {
            builder = builder.density(density);
        }

        let mut record = ShapeRecord {
            geometry,
            local_pose,
            material,
            color: Rgba::WHITE,
            trigger: false,
            simulated,
            collider: ColliderHandle::invalid(),
        };
        let collider = builder
            .user_data(pack_tag(ColliderTag {
                actor: id.0,
                filter,
                flags: shape_flags(&record),
            }))
            .build();
        record.collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        let actor = self.actor_mut(id)?;
        actor.shapes.push(record);
        Ok(actor.shapes.len() - 1)
    }

    pub fn set_color(&mut self, id: ActorId, shape: ShapeIndex, color: Rgba) -> CourseResult<()> {
        self.shape_mut(id, shape)?.color = color;
        Ok(())
    }

    /// Set the filter identity of every shape on the actor, including shapes
    /// added afterwards.
    pub fn set_filtering(
        &mut self,
        id: ActorId,
        group_bits: u32,
        mask_bits: u32,
    ) -> CourseResult<()> {
        let actor = self.actor_mut(id)?;
        actor.filter = FilterData::new(group_bits, mask_bits);
        let handles: Vec<ColliderHandle> = actor.shapes.iter().map(|s| s.collider).collect();
        for handle in handles {
            self.repack(id, handle);
        }
        Ok(())
    }

    /// Mark a shape as trigger: it stops colliding and only reports overlaps.
    pub fn set_trigger(
        &mut self,
        id: ActorId,
        shape: ShapeIndex,
        enabled: bool,
    ) -> CourseResult<()> {
        let record = self.shape_mut(id, shape)?;
        record.trigger = enabled;
        let handle = record.collider;
        if let Some(collider) = self.colliders.get_mut(handle) {
            collider.set_sensor(enabled);
        }
        self.repack(id, handle);
        Ok(())
    }

    /// Toggle whether a shape takes part in the simulation at all.
    ///
    /// Cloth sheets are always visual-only and ignore `enabled = true`.
    pub fn set_simulated(
        &mut self,
        id: ActorId,
        shape: ShapeIndex,
        enabled: bool,
    ) -> CourseResult<()> {
        let record = self.shape_mut(id, shape)?;
        let enabled = enabled && !record.geometry.is_visual_only();
        record.simulated = enabled;
        let handle = record.collider;
        if let Some(collider) = self.colliders.get_mut(handle) {
            collider.set_enabled(enabled);
        }
        self.repack(id, handle);
        Ok(())
    }

    /// Switch a non-static actor between kinematic and dynamic motion.
    pub fn set_kinematic(&mut self, id: ActorId, enabled: bool) -> CourseResult<()> {
        let actor = self.actor_mut(id)?;
        if actor.kind == MotionKind::Static {
            return Err(CourseError::NotDynamic(id));
        }
        let (kind, body_type) = if enabled {
            (MotionKind::Kinematic, RigidBodyType::KinematicPositionBased)
        } else {
            (MotionKind::Dynamic, RigidBodyType::Dynamic)
        };
        actor.kind = kind;
        let body = actor.body;
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.set_body_type(body_type, true);
        }
        Ok(())
    }

    /// Rename an actor. Names are unique among live actors.
    pub fn set_name(&mut self, id: ActorId, name: impl Into<String>) -> CourseResult<()> {
        let name = name.into();
        if let Some(other) = self.find_actor(&name)
            && other != id
        {
            return Err(CourseError::DuplicateName(name));
        }
        self.actor_mut(id)?.name = name;
        Ok(())
    }

    pub fn set_gravity_enabled(&mut self, id: ActorId, enabled: bool) -> CourseResult<()> {
        let rb = self.body_mut(id)?;
        rb.set_gravity_scale(if enabled { 1.0 } else { 0.0 }, true);
        Ok(())
    }

    /// Continuous collision detection, for fast bodies that must not tunnel.
    pub fn enable_ccd(&mut self, id: ActorId, enabled: bool) -> CourseResult<()> {
        self.body_mut(id)?.enable_ccd(enabled);
        Ok(())
    }

    pub fn set_angular_damping(&mut self, id: ActorId, damping: f32) -> CourseResult<()> {
        self.body_mut(id)?.set_angular_damping(damping);
        Ok(())
    }

    pub fn actor_pose(&self, id: ActorId) -> CourseResult<Isometry3<f32>> {
        let body = self.actor(id)?.body;
        self.body_pose(body).ok_or(CourseError::UnknownActor(id))
    }

    /// World pose of one shape: actor pose composed with the shape's local pose.
    pub fn shape_world_pose(&self, id: ActorId, shape: ShapeIndex) -> CourseResult<Isometry3<f32>> {
        let actor = self.actor(id)?;
        let record = actor.shapes.get(shape).ok_or(CourseError::ShapeOutOfRange {
            actor: id,
            index: shape,
            count: actor.shapes.len(),
        })?;
        Ok(self.actor_pose(id)? * record.local_pose)
    }

    pub fn linear_velocity(&self, id: ActorId) -> CourseResult<Vector3<f32>> {
        let body = self.actor(id)?.body;
        self.bodies
            .get(body)
            .map(|rb| *rb.linvel())
            .ok_or(CourseError::UnknownActor(id))
    }

    pub fn angular_velocity(&self, id: ActorId) -> CourseResult<Vector3<f32>> {
        let body = self.actor(id)?.body;
        self.bodies
            .get(body)
            .map(|rb| *rb.angvel())
            .ok_or(CourseError::UnknownActor(id))
    }

    pub fn set_linear_velocity(&mut self, id: ActorId, velocity: Vector3<f32>) -> CourseResult<()> {
        self.body_mut(id)?.set_linvel(velocity, true);
        Ok(())
    }

    /// Move an actor instantly, keeping its velocities.
    pub fn teleport(&mut self, id: ActorId, pose: Isometry3<f32>) -> CourseResult<()> {
        let rb = self.body_mut(id)?;
        rb.set_translation(pose.translation.vector, true);
        rb.set_rotation(pose.rotation, true);
        Ok(())
    }

    /// Stop an actor dead and put it at `pose`.
    pub fn reset_motion(&mut self, id: ActorId, pose: Isometry3<f32>) -> CourseResult<()> {
        let rb = self.body_mut(id)?;
        rb.set_linvel(Vector3::zeros(), false);
        rb.set_angvel(Vector3::zeros(), false);
        rb.reset_forces(false);
        self.teleport(id, pose)
    }

    /// Push a dynamic actor. Static and kinematic actors are left alone.
    pub fn apply_impulse(&mut self, id: ActorId, impulse: Vector3<f32>) -> CourseResult<()> {
        if self.actor(id)?.kind != MotionKind::Dynamic {
            debug!(?id, "impulse ignored on non-dynamic actor");
            return Ok(());
        }
        self.body_mut(id)?.apply_impulse(impulse, true);
        Ok(())
    }

    fn body_mut(&mut self, id: ActorId) -> CourseResult<&mut RigidBody> {
        let body = self.actor(id)?.body;
        self.bodies.get_mut(body).ok_or(CourseError::UnknownActor(id))
    }

    /// Rewrite a collider's packed user data from the actor/shape records.
    fn repack(&mut self, id: ActorId, handle: ColliderHandle) {
        let Ok(actor) = self.actor(id) else {
            return;
        };
        let Some(record) = actor.shapes.iter().find(|s| s.collider == handle) else {
            return;
        };
        let tag = ColliderTag {
            actor: id.0,
            filter: actor.filter,
            flags: shape_flags(record),
        };
        if let Some(collider) = self.colliders.get_mut(handle) {
            collider.user_data = pack_tag(tag);
        }
    }
}
