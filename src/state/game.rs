//! Game-state seam and an in-memory tracker implementation

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Item name -> count, as published on inventory change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot(pub BTreeMap<String, i64>);

impl InventorySnapshot {
    /// Sum of positive counts
    pub fn total_items(&self) -> u64 {
        self.0.values().filter(|&&count| count > 0).map(|&count| count as u64).sum()
    }
}

impl FromIterator<(String, i64)> for InventorySnapshot {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Checked locations, location items and inventory
pub trait GameState {
    fn is_location_checked(&self, location: &str) -> bool;

    /// Mark a location checked; returns false if it already was
    fn check_location(&mut self, location: &str) -> bool;

    /// Item placed at a location, if known
    fn location_item(&self, location: &str) -> Option<String>;

    fn add_item_to_inventory(&mut self, item: &str);
}

impl<T: GameState> GameState for Arc<Mutex<T>> {
    fn is_location_checked(&self, location: &str) -> bool {
        self.lock().unwrap_or_else(|e| e.into_inner()).is_location_checked(location)
    }

    fn check_location(&mut self, location: &str) -> bool {
        self.lock().unwrap_or_else(|e| e.into_inner()).check_location(location)
    }

    fn location_item(&self, location: &str) -> Option<String> {
        self.lock().unwrap_or_else(|e| e.into_inner()).location_item(location)
    }

    fn add_item_to_inventory(&mut self, item: &str) {
        self.lock().unwrap_or_else(|e| e.into_inner()).add_item_to_inventory(item)
    }
}

/// In-memory game state for headless runs and tests
#[derive(Debug, Clone, Default)]
pub struct TrackerState {
    checked: AHashSet<String>,
    items: AHashMap<String, String>,
    inventory: BTreeMap<String, i64>,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the item found at a location
    pub fn with_item(mut self, location: &str, item: &str) -> Self {
        self.items.insert(location.to_string(), item.to_string());
        self
    }

    pub fn with_checked(mut self, location: &str) -> Self {
        self.checked.insert(location.to_string());
        self
    }

    pub fn item_count(&self, item: &str) -> i64 {
        self.inventory.get(item).copied().unwrap_or(0)
    }

    pub fn checked_count(&self) -> usize {
        self.checked.len()
    }

    pub fn inventory_snapshot(&self) -> InventorySnapshot {
        InventorySnapshot(self.inventory.clone())
    }
}

impl GameState for TrackerState {
    fn is_location_checked(&self, location: &str) -> bool {
        self.checked.contains(location)
    }

    fn check_location(&mut self, location: &str) -> bool {
        self.checked.insert(location.to_string())
    }

    fn location_item(&self, location: &str) -> Option<String> {
        self.items.get(location).cloned()
    }

    fn add_item_to_inventory(&mut self, item: &str) {
        *self.inventory.entry(item.to_string()).or_insert(0) += 1;
    }
}
