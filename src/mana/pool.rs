//! Mana pool - the resource every loop action drains

use crate::core::config::LoopConfig;
use crate::state::game::InventorySnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManaPool {
    current: f64,
    max: f64,
    base: f64,
    per_item: f64,
}

impl ManaPool {
    /// Full pool sized for an empty inventory
    pub fn new(config: &LoopConfig) -> Self {
        Self {
            current: config.base_mana,
            max: config.base_mana,
            base: config.base_mana,
            per_item: config.mana_per_item,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// Recompute max from an inventory snapshot, clamping current down
    pub fn recalc(&mut self, inventory: &InventorySnapshot) {
        let items = inventory.total_items();
        self.max = self.base + items as f64 * self.per_item;
        self.current = self.current.min(self.max);
    }

    /// Drain up to `amount`, returning what was actually spent
    pub fn consume(&mut self, amount: f64) -> f64 {
        if !(amount > 0.0) {
            return 0.0;
        }
        let spent = amount.min(self.current);
        self.current = (self.current - spent).max(0.0);
        spent
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }

    /// Set current mana from a persisted value, clamped into range
    pub fn restore(&mut self, current: f64) {
        self.current = if current.is_finite() {
            current.clamp(0.0, self.max)
        } else {
            self.max
        };
    }
}
