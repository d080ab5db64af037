use thiserror::Error;

use crate::actor::{ActorId, ShapeIndex};
use crate::constraint::ConstraintId;

/// Configuration errors raised while building or mutating a course.
///
/// These signal programmer misuse. Nothing in the session tries to recover from
/// them; they propagate up to the caller that built the session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CourseError {
    #[error("actor {0:?} does not exist")]
    UnknownActor(ActorId),

    #[error("actor {0:?} was destroyed")]
    ActorDestroyed(ActorId),

    #[error("actor {actor:?} has no shape {index} (it has {count})")]
    ShapeOutOfRange {
        actor: ActorId,
        index: ShapeIndex,
        count: usize,
    },

    #[error("actor {0:?} is static and cannot change its motion kind")]
    NotDynamic(ActorId),

    #[error("convex hull for actor {0:?} is degenerate")]
    DegenerateHull(ActorId),

    #[error("constraint {0:?} does not exist")]
    UnknownConstraint(ConstraintId),

    #[error("constraint {0:?} was removed")]
    ConstraintRemoved(ConstraintId),

    #[error("constraint needs two distinct endpoints, got {0:?} twice")]
    SelfConstraint(ActorId),

    #[error("actor name {0:?} is already taken")]
    DuplicateName(String),
}

pub type CourseResult<T> = Result<T, CourseError>;
