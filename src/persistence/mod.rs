//! Durable snapshots of the loop state

pub mod snapshot;
pub mod store;

pub use snapshot::LoopSnapshot;
pub use store::{FileStore, MemoryStore, SnapshotStore};
