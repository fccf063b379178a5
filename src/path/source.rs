//! Action source adapter
//!
//! Derives the loop queue from the player path on every call and routes
//! queue edits back to the path, keeping the tracking maps keyed correctly.

use crate::actions::catalog::{Action, ActionKind, ActionType};
use crate::core::error::{LoopError, Result};
use crate::core::types::SourceIndex;
use crate::path::entry::{PathEntry, PlayerPath};
use crate::scheduler::tracking::ActionTracking;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// An action the player can put on the queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueuedAction {
    Explore { region: String },
    LocationCheck { location: String, region: String },
}

impl QueuedAction {
    pub fn action_type(&self) -> ActionType {
        match self {
            QueuedAction::Explore { .. } => ActionType::Explore,
            QueuedAction::LocationCheck { .. } => ActionType::LocationCheck,
        }
    }
}

fn to_action(entry: &PathEntry, source_index: SourceIndex) -> Option<Action> {
    let kind = match entry {
        PathEntry::RegionMove { to, exit, .. } => ActionKind::RegionMove {
            to: to.clone(),
            exit: exit.clone(),
        },
        PathEntry::LocationCheck { location, .. } => ActionKind::LocationCheck {
            location: location.clone(),
        },
        PathEntry::CustomAction { action, .. } => match ActionType::from_custom_name(action)? {
            ActionType::Explore => ActionKind::Explore,
            // Moves and checks never arrive as custom entries
            ActionType::RegionMove | ActionType::LocationCheck => return None,
        },
    };
    Some(Action::new(kind, entry.region(), source_index))
}

/// Normalize path entries into loop actions decorated with tracking state
pub fn list_actions(entries: &[PathEntry], tracking: &ActionTracking) -> Vec<Action> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| to_action(entry, index))
        .map(|mut action| {
            action.progress = tracking.progress(action.source_index);
            action.completed = tracking.is_completed(action.source_index);
            action
        })
        .collect()
}

/// Mutable view over the player path and the tracking maps it keys
pub struct ActionSource<'a> {
    path: &'a mut dyn PlayerPath,
    tracking: &'a mut ActionTracking,
}

impl<'a> ActionSource<'a> {
    pub fn new(path: &'a mut dyn PlayerPath, tracking: &'a mut ActionTracking) -> Self {
        Self { path, tracking }
    }

    pub fn list(&self) -> Vec<Action> {
        list_actions(&self.path.path(), self.tracking)
    }

    /// Add an action to the path, appended in its region or at an occurrence slot
    pub fn enqueue(&mut self, action: &QueuedAction, occurrence: Option<usize>) -> Result<SourceIndex> {
        let inserted = match (action, occurrence) {
            (QueuedAction::Explore { region }, None) => {
                self.path.add_custom_action(explore_name(), region, Value::Null)
            }
            (QueuedAction::Explore { region }, Some(n)) => {
                self.path.insert_custom_action_at(explore_name(), region, n, Value::Null)
            }
            (QueuedAction::LocationCheck { location, region }, None) => {
                self.path.add_location_check(location, region)
            }
            (QueuedAction::LocationCheck { location, region }, Some(n)) => {
                self.path.insert_location_check_at(location, region, n)
            }
        };
        let position = inserted
            .ok_or_else(|| LoopError::PathMutation(format!("could not enqueue {:?}", action)))?;
        self.tracking.insert_index(position);
        Ok(position)
    }

    /// Insert an explore directly after the explore at `source_index`
    pub fn repeat_explore_after(&mut self, source_index: SourceIndex, region: &str) -> Result<SourceIndex> {
        let entries = self.path.path();
        let slot = PathEntry::custom(explore_name(), region);
        let occurrence = occurrence_before(&entries, source_index, &slot) + 1;
        let position = self
            .path
            .insert_custom_action_at(explore_name(), region, occurrence, Value::Null)
            .ok_or_else(|| LoopError::PathMutation(format!("could not repeat explore of {region}")))?;
        self.tracking.insert_index(position);
        Ok(position)
    }

    /// Remove the entry at `source_index` and prune its tracking
    pub fn remove(&mut self, source_index: SourceIndex) -> Result<PathEntry> {
        let entries = self.path.path();
        let entry = entries
            .get(source_index)
            .cloned()
            .ok_or(LoopError::InvalidIndex(source_index))?;
        let occurrence = occurrence_before(&entries, source_index, &entry);

        let removed = match &entry {
            PathEntry::RegionMove { from, to, .. } => {
                return Err(LoopError::NotRemovable(format!("move {from} -> {to}")));
            }
            PathEntry::LocationCheck { location, region } => {
                self.path.remove_location_check_at(location, region, occurrence)
            }
            PathEntry::CustomAction { action, region, .. } => {
                self.path.remove_custom_action_at(action, region, occurrence)
            }
        };

        let position = removed.ok_or_else(|| {
            LoopError::PathMutation(format!("path refused to remove entry {source_index}"))
        })?;
        self.tracking.remove_index(position);
        Ok(entry)
    }

    /// Remove every action of the given types; moves are always kept
    ///
    /// Tracking is re-keyed from what the path actually dropped. A path that
    /// drops fewer entries than asked is reported as a mutation failure.
    pub fn clear(&mut self, types: &[ActionType]) -> Result<usize> {
        let types: Vec<ActionType> = types
            .iter()
            .copied()
            .filter(|t| *t != ActionType::RegionMove)
            .collect();

        let before = self.path.path();
        let requested = before
            .iter()
            .filter(|entry| entry.action_type().is_some_and(|t| types.contains(&t)))
            .count();

        let removed: usize = types
            .iter()
            .map(|t| self.path.remove_all_actions_of_type(*t))
            .sum();
        let dropped = removed_positions(&before, &self.path.path());
        self.tracking.remove_positions(&dropped);

        if removed != requested || dropped.len() != requested {
            return Err(LoopError::PathMutation(format!(
                "cleared {} of {} actions",
                dropped.len(),
                requested
            )));
        }
        Ok(removed)
    }
}

/// Positions of `before` missing from `after`, where `after` only lost entries
pub fn removed_positions(before: &[PathEntry], after: &[PathEntry]) -> BTreeSet<SourceIndex> {
    let mut kept = after.iter().peekable();
    before
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            if kept.peek() == Some(&entry) {
                kept.next();
                None
            } else {
                Some(index)
            }
        })
        .collect()
}

fn explore_name() -> &'static str {
    ActionType::Explore.custom_name().unwrap_or("explore")
}

/// Count of same-slot entries before `index`
fn occurrence_before(entries: &[PathEntry], index: SourceIndex, slot: &PathEntry) -> usize {
    entries
        .iter()
        .take(index)
        .filter(|entry| entry.same_slot(slot))
        .count()
}
