//! Progress map and completed set, keyed by path position
//!
//! Keys follow their actions: removing or inserting a path entry shifts
//! every later key so progress never jumps to a neighbouring action.

use crate::core::types::{Progress, SourceIndex, PROGRESS_COMPLETE};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionTracking {
    progress: BTreeMap<SourceIndex, Progress>,
    completed: BTreeSet<SourceIndex>,
}

impl ActionTracking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self, index: SourceIndex) -> Progress {
        self.progress.get(&index).copied().unwrap_or(0.0)
    }

    pub fn is_tracked(&self, index: SourceIndex) -> bool {
        self.progress.contains_key(&index)
    }

    pub fn is_completed(&self, index: SourceIndex) -> bool {
        self.completed.contains(&index)
    }

    /// Start tracking at 0 unless already tracked
    pub fn ensure(&mut self, index: SourceIndex) {
        self.progress.entry(index).or_insert(0.0);
    }

    /// Add progress, capped at 100; returns the new value
    pub fn advance(&mut self, index: SourceIndex, delta: Progress) -> Progress {
        let entry = self.progress.entry(index).or_insert(0.0);
        *entry = (*entry + delta.max(0.0)).min(PROGRESS_COMPLETE);
        *entry
    }

    /// Pin progress at exactly 100 and mark completed
    pub fn complete(&mut self, index: SourceIndex) {
        self.progress.insert(index, PROGRESS_COMPLETE);
        self.completed.insert(index);
    }

    /// Drop the entry at `index` and shift later keys down
    pub fn remove_index(&mut self, index: SourceIndex) {
        self.rekey(|key| match key.cmp(&index) {
            std::cmp::Ordering::Less => Some(key),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(key - 1),
        });
    }

    /// Make room for a path entry inserted at `index`
    pub fn insert_index(&mut self, index: SourceIndex) {
        self.rekey(|key| Some(if key >= index { key + 1 } else { key }));
    }

    /// Drop several positions at once; positions refer to the path before removal
    pub fn remove_positions(&mut self, positions: &BTreeSet<SourceIndex>) {
        self.rekey(|key| {
            if positions.contains(&key) {
                None
            } else {
                Some(key - positions.range(..key).count())
            }
        });
    }

    fn rekey(&mut self, map: impl Fn(SourceIndex) -> Option<SourceIndex>) {
        self.progress = std::mem::take(&mut self.progress)
            .into_iter()
            .filter_map(|(key, value)| map(key).map(|k| (k, value)))
            .collect();
        self.completed = std::mem::take(&mut self.completed)
            .into_iter()
            .filter_map(&map)
            .collect();
    }

    pub fn clear(&mut self) {
        self.progress.clear();
        self.completed.clear();
    }

    pub fn progress_entries(&self) -> Vec<(SourceIndex, Progress)> {
        self.progress.iter().map(|(&k, &v)| (k, v)).collect()
    }

    pub fn completed_entries(&self) -> Vec<SourceIndex> {
        self.completed.iter().copied().collect()
    }

    /// Replace all tracking from persisted entries
    pub fn restore(&mut self, progress: Vec<(SourceIndex, Progress)>, completed: Vec<SourceIndex>) {
        self.progress = progress
            .into_iter()
            .filter(|(_, value)| value.is_finite())
            .map(|(key, value)| (key, value.clamp(0.0, PROGRESS_COMPLETE)))
            .collect();
        self.completed = completed.into_iter().collect();
    }
}
