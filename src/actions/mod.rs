pub mod catalog;
pub mod cost;

pub use catalog::{Action, ActionKind, ActionType};
pub use cost::CostModel;
