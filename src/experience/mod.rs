//! Per-region experience and leveling

pub mod ledger;

pub use ledger::{ExperienceLedger, RegionXp};
