pub mod config;
pub mod error;
pub mod types;

pub use config::LoopConfig;
pub use error::{LoopError, Result};
