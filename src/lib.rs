//! Loop Tracker - loop-mode action scheduler for a game-progress tracker
//!
//! Actions queued on the player path are worked through one at a time,
//! draining mana and growing region experience as they progress.

pub mod actions;
pub mod core;
pub mod events;
pub mod experience;
pub mod mana;
pub mod path;
pub mod persistence;
pub mod runtime;
pub mod scheduler;
pub mod state;

pub use crate::core::config::LoopConfig;
pub use crate::core::error::{LoopError, Result};
pub use crate::scheduler::{Dependencies, LoopState};
