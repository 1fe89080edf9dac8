//! Error kinds surfaced by the ECS framework.
//!
//! Every variant is a programmer-visible invariant violation. Nothing here is
//! retried: the frame driver aborts at the first error and reports it.

use thiserror::Error;

use crate::entities::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcsError {
    #[error("out of available entities (maximum {max})")]
    Exhausted { max: usize },

    #[error("entity {0} is not live")]
    NotLive(EntityId),

    #[error("linking {child} under {parent} would create a cycle in the entity graph")]
    Cycle { parent: EntityId, child: EntityId },

    #[error("system '{system}' failed: {reason}")]
    System {
        system: &'static str,
        reason: String,
    },
}

pub type EcsResult<T> = Result<T, EcsError>;
