//! Core of the hop engine: a small entity-component-system framework plus the
//! geometry, animation, timing and input pieces the game systems share.

pub mod animation;
pub mod bounding_box;
pub mod entities;
pub mod error;
pub mod input;
pub mod storage;
pub mod system;
pub mod time;

pub use entities::{EntityId, EntityManager};
pub use error::{EcsError, EcsResult};
pub use storage::ComponentStore;
pub use system::{Context, System};
