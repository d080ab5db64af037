/*!
Collision/trigger event routing.

Rapier reports raw collision start/stop events while it steps. The
[`StepEventCollector`] buffers them, already split into the two feeds the game
cares about:

- trigger feed: a trigger shape started/stopped overlapping another shape
  (visual-only shapes and planes never show up here),
- contact feed: two actors started/stopped touching, reported only when their
  filter data mutually intersects.

After the step the whole batch is handed to the [`EventRouter`], which turns it
into game-state transitions. Nothing reads the game state while a batch is
half-applied.
*/

use std::sync::Mutex;

use rapier3d::na::{Isometry3, Translation3, UnitQuaternion};
use rapier3d::prelude::*;
use tracing::{debug, info, warn};

use crate::actor::ActorId;
use crate::constraint::{ConstraintBreakHandler, ConstraintId};
use crate::scene::PhysicsScene;
use crate::settings::{PLAYER_NAME, RECOVERY_POSITION};
use crate::user_data::{ColliderTag, unpack_tag, validate_tag};

/// Course-level outcome state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GameState {
    #[default]
    Running,
    Paused,
    Ended,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TouchKind {
    Found,
    Lost,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TriggerEvent {
    pub trigger: ColliderHandle,
    pub trigger_actor: ActorId,
    pub other: ColliderHandle,
    pub other_actor: ActorId,
    pub kind: TouchKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ContactEvent {
    pub actor_a: ActorId,
    pub actor_b: ActorId,
    pub kind: TouchKind,
}

/// Everything that happened during one simulation step.
#[derive(Clone, Debug, Default)]
pub struct StepEvents {
    pub triggers: Vec<TriggerEvent>,
    pub contacts: Vec<ContactEvent>,
    /// Constraints that broke during this step.
    pub broken: Vec<ConstraintId>,
}

/// One raw collider pair, classified.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Routed {
    Trigger(TriggerEvent),
    Contact(ContactEvent),
}

/// Decide which feed (if any) a raw pair belongs to.
pub(crate) fn classify(
    (h1, tag1): (ColliderHandle, ColliderTag),
    (h2, tag2): (ColliderHandle, ColliderTag),
    kind: TouchKind,
) -> Option<Routed> {
    if tag1.flags.is_visual_only() || tag2.flags.is_visual_only() {
        return None;
    }

    match (tag1.flags.is_trigger(), tag2.flags.is_trigger()) {
        (true, true) => None,
        (true, false) | (false, true) => {
            let ((trigger, trigger_tag), (other, other_tag)) = if tag1.flags.is_trigger() {
                ((h1, tag1), (h2, tag2))
            } else {
                ((h2, tag2), (h1, tag1))
            };
            // Planes are never meaningful trigger partners.
            if other_tag.flags.is_plane() {
                return None;
            }
            Some(Routed::Trigger(TriggerEvent {
                trigger,
                trigger_actor: ActorId(trigger_tag.actor),
                other,
                other_actor: ActorId(other_tag.actor),
                kind,
            }))
        }
        (false, false) => {
            if !tag1.filter.notifies(&tag2.filter) {
                return None;
            }
            Some(Routed::Contact(ContactEvent {
                actor_a: ActorId(tag1.actor),
                actor_b: ActorId(tag2.actor),
                kind,
            }))
        }
    }
}

/// Rapier event sink that buffers one step's worth of routed events.
///
/// Rapier requires `EventHandler: Send + Sync`, hence the mutex; the engine
/// calls back synchronously from inside `step`.
#[derive(Default)]
pub struct StepEventCollector {
    buffer: Mutex<StepEvents>,
}

impl StepEventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything collected since the last drain.
    pub fn drain(&self) -> StepEvents {
        let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *buffer)
    }

    fn tag(colliders: &ColliderSet, handle: ColliderHandle) -> Option<ColliderTag> {
        // Removed colliders still produce "stopped" events; ignore them.
        let collider = colliders.get(handle)?;
        if let Err(err) = validate_tag(collider.user_data) {
            warn!(?handle, err, "ignoring collider with malformed user data");
            return None;
        }
        Some(unpack_tag(collider.user_data))
    }
}

impl EventHandler for StepEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        let (h1, h2) = (event.collider1(), event.collider2());
        let (Some(tag1), Some(tag2)) = (Self::tag(colliders, h1), Self::tag(colliders, h2)) else {
            return;
        };
        let kind = if event.started() {
            TouchKind::Found
        } else {
            TouchKind::Lost
        };

        let Some(routed) = classify((h1, tag1), (h2, tag2), kind) else {
            return;
        };

        let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        match routed {
            Routed::Trigger(ev) => buffer.triggers.push(ev),
            Routed::Contact(ev) => buffer.contacts.push(ev),
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// Turns step batches into game-state transitions.
#[derive(Clone, Debug)]
pub struct EventRouter {
    goal_trigger: Option<ColliderHandle>,
    recovery_pose: Isometry3<f32>,
    inside_goal: bool,
    recoveries: u32,
}

impl Default for EventRouter {
    fn default() -> Self {
        let [x, y, z] = RECOVERY_POSITION;
        Self::new(Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::identity(),
        ))
    }
}

impl EventRouter {
    pub fn new(recovery_pose: Isometry3<f32>) -> Self {
        Self {
            goal_trigger: None,
            recovery_pose,
            inside_goal: false,
            recoveries: 0,
        }
    }

    /// Register the trigger shape whose touch ends the game.
    pub fn register_goal(&mut self, trigger: ColliderHandle) {
        self.goal_trigger = Some(trigger);
        self.inside_goal = false;
    }

    pub fn goal_trigger(&self) -> Option<ColliderHandle> {
        self.goal_trigger
    }

    pub fn recovery_pose(&self) -> Isometry3<f32> {
        self.recovery_pose
    }

    /// Whether something currently overlaps the goal trigger.
    pub fn inside_goal(&self) -> bool {
        self.inside_goal
    }

    /// How many times the ball has been recovered this session.
    pub fn recoveries(&self) -> u32 {
        self.recoveries
    }

    /// Apply a whole step batch. Call once per step, after the engine returns.
    pub fn process(
        &mut self,
        events: &StepEvents,
        scene: &mut PhysicsScene,
        state: &mut GameState,
    ) {
        for trigger in &events.triggers {
            self.on_trigger(trigger, state);
        }
        for contact in &events.contacts {
            self.on_contact(contact, scene);
        }
        for &id in &events.broken {
            self.on_constraint_break(id);
        }
    }

    fn on_trigger(&mut self, event: &TriggerEvent, state: &mut GameState) {
        if Some(event.trigger) != self.goal_trigger {
            return;
        }
        match event.kind {
            TouchKind::Found => {
                self.inside_goal = true;
                if *state == GameState::Running {
                    info!(actor = ?event.other_actor, "goal reached");
                    *state = GameState::Ended;
                }
            }
            TouchKind::Lost => {
                self.inside_goal = false;
            }
        }
    }

    fn on_contact(&mut self, event: &ContactEvent, scene: &mut PhysicsScene) {
        if event.kind != TouchKind::Found {
            return;
        }
        for actor in [event.actor_a, event.actor_b] {
            let is_player = scene
                .actor(actor)
                .map(|a| a.name() == PLAYER_NAME)
                .unwrap_or(false);
            if !is_player {
                continue;
            }
            match scene.reset_motion(actor, self.recovery_pose) {
                Ok(()) => {
                    self.recoveries += 1;
                    info!(?actor, "ball recovered after hazard contact");
                }
                Err(err) => warn!(?actor, %err, "could not recover ball"),
            }
        }
    }
}

impl ConstraintBreakHandler for EventRouter {
    /// Breakage has no gameplay consequence yet.
    fn on_constraint_break(&mut self, id: ConstraintId) {
        debug!(?id, "constraint broke");
    }
}
