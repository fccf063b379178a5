//! Notifications published by the scheduler

pub mod sink;

pub use sink::{EventLog, EventSink, LoopEvent, ResetReason};
