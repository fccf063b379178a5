//! The player path: externally-owned ordered list of moves and queued actions

pub mod entry;
pub mod log;
pub mod source;

pub use entry::{PathEntry, PlayerPath};
pub use log::PathLog;
pub use source::{list_actions, ActionSource, QueuedAction};
