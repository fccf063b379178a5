//! Async hosting of the scheduler on tokio

pub mod driver;

pub use driver::{run_autosave, run_frames, LoopRuntime, SharedLoop, TimerFrames};
