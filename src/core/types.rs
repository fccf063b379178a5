//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Position of an entry in the externally-owned player path
///
/// Join key between path entries and the scheduler's tracking maps.
pub type SourceIndex = usize;

/// Percent progress of an action, 0.0 to 100.0
pub type Progress = f64;

/// Progress value at which an action is complete
pub const PROGRESS_COMPLETE: Progress = 100.0;

/// Identifier of a requested display frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(pub u64);

/// Coarse scheduler state derived from the cursor flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerPhase {
    /// Not processing; the queue may still hold actions
    Idle,
    /// A frame callback is advancing the current action
    Running,
    /// Halted by the player or by running out of mana
    Paused,
}
