//! Path entries and the player-path seam

use crate::actions::catalog::ActionType;
use crate::core::types::SourceIndex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// One step of the player path as the tracker records it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PathEntry {
    /// Travel between regions; starts a new visit of `to`
    #[serde(rename_all = "camelCase")]
    RegionMove { from: String, to: String, exit: Option<String> },
    /// Check a location belonging to `region`
    #[serde(rename_all = "camelCase")]
    LocationCheck { location: String, region: String },
    /// Named action anchored to a region; unknown names are ignored by the loop
    #[serde(rename_all = "camelCase")]
    CustomAction {
        action: String,
        region: String,
        #[serde(default)]
        params: Value,
    },
}

impl PathEntry {
    pub fn region_move(from: &str, to: &str, exit: Option<&str>) -> Self {
        PathEntry::RegionMove {
            from: from.to_string(),
            to: to.to_string(),
            exit: exit.map(str::to_string),
        }
    }

    pub fn location_check(location: &str, region: &str) -> Self {
        PathEntry::LocationCheck {
            location: location.to_string(),
            region: region.to_string(),
        }
    }

    pub fn custom(action: &str, region: &str) -> Self {
        PathEntry::CustomAction {
            action: action.to_string(),
            region: region.to_string(),
            params: Value::Null,
        }
    }

    /// Region the entry is anchored to (origin region for moves)
    pub fn region(&self) -> &str {
        match self {
            PathEntry::RegionMove { from, .. } => from,
            PathEntry::LocationCheck { region, .. } | PathEntry::CustomAction { region, .. } => {
                region
            }
        }
    }

    /// Loop action type this entry maps to, if any
    pub fn action_type(&self) -> Option<ActionType> {
        match self {
            PathEntry::RegionMove { .. } => Some(ActionType::RegionMove),
            PathEntry::LocationCheck { .. } => Some(ActionType::LocationCheck),
            PathEntry::CustomAction { action, .. } => ActionType::from_custom_name(action),
        }
    }

    /// Same kind and name as `other` within the same region
    pub fn same_slot(&self, other: &PathEntry) -> bool {
        match (self, other) {
            (
                PathEntry::LocationCheck { location: a, region: ra },
                PathEntry::LocationCheck { location: b, region: rb },
            ) => a == b && ra == rb,
            (
                PathEntry::CustomAction { action: a, region: ra, .. },
                PathEntry::CustomAction { action: b, region: rb, .. },
            ) => a == b && ra == rb,
            _ => false,
        }
    }
}

/// Externally-owned ordered path the loop queue is derived from
///
/// Occurrence indices count entries of the same kind and name inside one
/// region, in path order. Mutators return the position they touched so the
/// caller can re-key anything indexed by position.
pub trait PlayerPath {
    fn path(&self) -> Vec<PathEntry>;

    fn add_custom_action(&mut self, action: &str, region: &str, params: Value) -> Option<SourceIndex>;

    fn insert_custom_action_at(
        &mut self,
        action: &str,
        region: &str,
        occurrence: usize,
        params: Value,
    ) -> Option<SourceIndex>;

    fn remove_custom_action_at(&mut self, action: &str, region: &str, occurrence: usize) -> Option<SourceIndex>;

    /// Remove every entry mapping to `action_type`; moves are never removed
    fn remove_all_actions_of_type(&mut self, action_type: ActionType) -> usize;

    fn add_location_check(&mut self, location: &str, region: &str) -> Option<SourceIndex>;

    fn insert_location_check_at(&mut self, location: &str, region: &str, occurrence: usize) -> Option<SourceIndex>;

    fn remove_location_check_at(&mut self, location: &str, region: &str, occurrence: usize) -> Option<SourceIndex>;
}

impl<T: PlayerPath> PlayerPath for Arc<Mutex<T>> {
    fn path(&self) -> Vec<PathEntry> {
        self.lock().unwrap_or_else(|e| e.into_inner()).path()
    }

    fn add_custom_action(&mut self, action: &str, region: &str, params: Value) -> Option<SourceIndex> {
        self.lock()
            .unwrap_or_else(|e| e.into_inner())
            .add_custom_action(action, region, params)
    }

    fn insert_custom_action_at(
        &mut self,
        action: &str,
        region: &str,
        occurrence: usize,
        params: Value,
    ) -> Option<SourceIndex> {
        self.lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert_custom_action_at(action, region, occurrence, params)
    }

    fn remove_custom_action_at(&mut self, action: &str, region: &str, occurrence: usize) -> Option<SourceIndex> {
        self.lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove_custom_action_at(action, region, occurrence)
    }

    fn remove_all_actions_of_type(&mut self, action_type: ActionType) -> usize {
        self.lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove_all_actions_of_type(action_type)
    }

    fn add_location_check(&mut self, location: &str, region: &str) -> Option<SourceIndex> {
        self.lock()
            .unwrap_or_else(|e| e.into_inner())
            .add_location_check(location, region)
    }

    fn insert_location_check_at(&mut self, location: &str, region: &str, occurrence: usize) -> Option<SourceIndex> {
        self.lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert_location_check_at(location, region, occurrence)
    }

    fn remove_location_check_at(&mut self, location: &str, region: &str, occurrence: usize) -> Option<SourceIndex> {
        self.lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove_location_check_at(location, region, occurrence)
    }
}
