//! In-memory player path
//!
//! The path is a sequence of region visits. A visit starts at the starting
//! region or right after a move into a region, and ends at the next move.
//! Actions appended for a region land at the end of its latest visit.

use crate::actions::catalog::ActionType;
use crate::core::types::SourceIndex;
use crate::path::entry::{PathEntry, PlayerPath};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathLog {
    start_region: String,
    entries: Vec<PathEntry>,
}

impl PathLog {
    pub fn new(start_region: &str) -> Self {
        Self {
            start_region: start_region.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Region the player is in at the end of the path
    pub fn current_region(&self) -> &str {
        self.entries
            .iter()
            .rev()
            .find_map(|entry| match entry {
                PathEntry::RegionMove { to, .. } => Some(to.as_str()),
                _ => None,
            })
            .unwrap_or(&self.start_region)
    }

    /// Record a move out of the current region
    pub fn move_to(&mut self, to: &str, exit: Option<&str>) -> SourceIndex {
        let from = self.current_region().to_string();
        self.entries.push(PathEntry::region_move(&from, to, exit));
        self.entries.len() - 1
    }

    /// Append a raw entry at the end of the path
    pub fn push(&mut self, entry: PathEntry) -> SourceIndex {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Position just after the last entry of the region's latest visit
    fn visit_end(&self, region: &str) -> Option<usize> {
        let mut current = self.start_region.as_str();
        let mut end = (current == region).then_some(0);
        for (i, entry) in self.entries.iter().enumerate() {
            if let PathEntry::RegionMove { to, .. } = entry {
                current = to;
            }
            if current == region {
                end = Some(i + 1);
            }
        }
        end
    }

    fn slot_positions(&self, slot: &PathEntry) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.same_slot(slot))
            .map(|(i, _)| i)
            .collect()
    }

    fn append_in_region(&mut self, entry: PathEntry) -> SourceIndex {
        let position = self.visit_end(entry.region()).unwrap_or(self.entries.len());
        self.entries.insert(position, entry);
        position
    }

    /// Insert so the entry becomes occurrence `occurrence` of its slot
    fn insert_occurrence(&mut self, entry: PathEntry, occurrence: usize) -> SourceIndex {
        let positions = self.slot_positions(&entry);
        let anchored = match occurrence {
            0 => positions.first().copied(),
            n => positions.get(n - 1).or(positions.last()).map(|p| p + 1),
        };
        let position = anchored
            .or_else(|| self.visit_end(entry.region()))
            .unwrap_or(self.entries.len());
        self.entries.insert(position, entry);
        position
    }

    fn remove_occurrence(&mut self, slot: &PathEntry, occurrence: usize) -> Option<SourceIndex> {
        let position = *self.slot_positions(slot).get(occurrence)?;
        self.entries.remove(position);
        Some(position)
    }
}

impl PlayerPath for PathLog {
    fn path(&self) -> Vec<PathEntry> {
        self.entries.clone()
    }

    fn add_custom_action(&mut self, action: &str, region: &str, params: Value) -> Option<SourceIndex> {
        let entry = PathEntry::CustomAction {
            action: action.to_string(),
            region: region.to_string(),
            params,
        };
        Some(self.append_in_region(entry))
    }

    fn insert_custom_action_at(
        &mut self,
        action: &str,
        region: &str,
        occurrence: usize,
        params: Value,
    ) -> Option<SourceIndex> {
        let entry = PathEntry::CustomAction {
            action: action.to_string(),
            region: region.to_string(),
            params,
        };
        Some(self.insert_occurrence(entry, occurrence))
    }

    fn remove_custom_action_at(&mut self, action: &str, region: &str, occurrence: usize) -> Option<SourceIndex> {
        self.remove_occurrence(&PathEntry::custom(action, region), occurrence)
    }

    fn remove_all_actions_of_type(&mut self, action_type: ActionType) -> usize {
        if action_type == ActionType::RegionMove {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|entry| entry.action_type() != Some(action_type));
        before - self.entries.len()
    }

    fn add_location_check(&mut self, location: &str, region: &str) -> Option<SourceIndex> {
        Some(self.append_in_region(PathEntry::location_check(location, region)))
    }

    fn insert_location_check_at(&mut self, location: &str, region: &str, occurrence: usize) -> Option<SourceIndex> {
        Some(self.insert_occurrence(PathEntry::location_check(location, region), occurrence))
    }

    fn remove_location_check_at(&mut self, location: &str, region: &str, occurrence: usize) -> Option<SourceIndex> {
        self.remove_occurrence(&PathEntry::location_check(location, region), occurrence)
    }
}
