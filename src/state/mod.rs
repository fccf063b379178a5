//! Externally-owned game state the scheduler reads and updates

pub mod game;

pub use game::{GameState, InventorySnapshot, TrackerState};
