//! Loop-mode action scheduler

mod completion;
pub mod deps;
pub mod frames;
pub mod loop_state;
mod persist;
pub mod tracking;

pub use deps::Dependencies;
pub use frames::{FrameScheduler, ManualFrames};
pub use loop_state::LoopState;
pub use tracking::ActionTracking;
