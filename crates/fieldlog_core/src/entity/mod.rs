//! Entity identity, snapshots and the entity store interface.

mod id;
mod snapshot;
mod store;

pub use id::EntityId;
pub use snapshot::EntitySnapshot;
pub use store::{EntityStore, MemoryEntityStore};
