//! Action definitions and catalog

use crate::core::types::{Progress, SourceIndex, PROGRESS_COMPLETE};
use serde::{Deserialize, Serialize};

/// Tag of an action kind, without kind-specific payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    RegionMove,
    LocationCheck,
    Explore,
}

impl ActionType {
    /// Kinds the player may queue and remove directly
    pub const QUEUEABLE: [ActionType; 2] = [ActionType::LocationCheck, ActionType::Explore];

    /// Name used for custom path entries of this type
    pub fn custom_name(&self) -> Option<&'static str> {
        match self {
            ActionType::Explore => Some("explore"),
            ActionType::RegionMove | ActionType::LocationCheck => None,
        }
    }

    /// Resolve a custom path entry name, `None` for kinds the scheduler ignores
    pub fn from_custom_name(name: &str) -> Option<ActionType> {
        match name {
            "explore" => Some(ActionType::Explore),
            _ => None,
        }
    }
}

/// Kind-specific payload of an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Travel from the anchor region through an exit
    RegionMove { to: String, exit: Option<String> },
    /// Check a single location in the anchor region
    LocationCheck { location: String },
    /// Explore the anchor region
    Explore,
}

impl ActionKind {
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionKind::RegionMove { .. } => ActionType::RegionMove,
            ActionKind::LocationCheck { .. } => ActionType::LocationCheck,
            ActionKind::Explore => ActionType::Explore,
        }
    }
}

/// A normalized queue entry derived from the player path
///
/// Recomputed on every query; the scheduler never stores these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    /// Region the path entry is anchored to
    pub region: String,
    pub source_index: SourceIndex,
    pub progress: Progress,
    pub completed: bool,
}

impl Action {
    pub fn new(kind: ActionKind, region: impl Into<String>, source_index: SourceIndex) -> Self {
        Self {
            kind,
            region: region.into(),
            source_index,
            progress: 0.0,
            completed: false,
        }
    }

    pub fn action_type(&self) -> ActionType {
        self.kind.action_type()
    }

    /// Region that pays for and gains XP from this action
    ///
    /// Moves belong to no single region, so they are unaffiliated.
    pub fn affiliated_region(&self) -> Option<&str> {
        match self.kind {
            ActionKind::RegionMove { .. } => None,
            ActionKind::LocationCheck { .. } | ActionKind::Explore => Some(&self.region),
        }
    }

    pub fn location(&self) -> Option<&str> {
        match &self.kind {
            ActionKind::LocationCheck { location } => Some(location),
            _ => None,
        }
    }

    pub fn is_explore_of(&self, region: &str) -> bool {
        matches!(self.kind, ActionKind::Explore) && self.region == region
    }

    /// Not yet started: no progress and not completed
    pub fn is_pending(&self) -> bool {
        !self.completed && self.progress <= 0.0
    }

    pub fn remaining_fraction(&self) -> f64 {
        if self.completed {
            return 0.0;
        }
        ((PROGRESS_COMPLETE - self.progress) / PROGRESS_COMPLETE).clamp(0.0, 1.0)
    }
}
