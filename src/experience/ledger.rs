//! Region experience ledger
//!
//! Each region levels independently. Thresholds grow linearly:
//! 100 XP for level 1, then 20 more for every level after.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// XP needed to leave level 0
const BASE_THRESHOLD: f64 = 100.0;

/// Threshold growth per level
const THRESHOLD_PER_LEVEL: f64 = 20.0;

/// Highest reachable level; XP past it is discarded
pub const MAX_LEVEL: u32 = 10_000;

pub fn threshold_for_level(level: u32) -> f64 {
    BASE_THRESHOLD + level as f64 * THRESHOLD_PER_LEVEL
}

/// Experience record of a single region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegionXp {
    pub level: u32,
    pub xp: f64,
    pub xp_for_next_level: f64,
}

impl Default for RegionXp {
    fn default() -> Self {
        Self {
            level: 0,
            xp: 0.0,
            xp_for_next_level: threshold_for_level(0),
        }
    }
}

impl RegionXp {
    /// Add XP, rolling overflow into level-ups
    ///
    /// Returns every level reached, lowest first.
    pub fn gain(&mut self, amount: f64) -> Vec<u32> {
        let mut reached = Vec::new();
        if !(amount > 0.0 && amount.is_finite()) {
            return reached;
        }

        if self.level >= MAX_LEVEL {
            self.xp = 0.0;
            return reached;
        }

        self.xp += amount;
        while self.xp >= self.xp_for_next_level {
            self.xp -= self.xp_for_next_level;
            self.level += 1;
            self.xp_for_next_level = threshold_for_level(self.level);
            reached.push(self.level);
            if self.level >= MAX_LEVEL {
                self.xp = 0.0;
                break;
            }
        }
        reached
    }

    /// Whether a record read from outside is within reachable bounds
    pub fn is_plausible(&self) -> bool {
        self.level <= MAX_LEVEL && self.xp.is_finite() && self.xp >= 0.0
    }

    /// Restore the invariants on a record that came from outside
    pub fn normalized(mut self) -> Self {
        self.level = self.level.min(MAX_LEVEL);
        if !(self.xp >= 0.0 && self.xp.is_finite()) {
            self.xp = 0.0;
        }
        self.xp_for_next_level = threshold_for_level(self.level);
        let overflow = self.xp;
        self.xp = 0.0;
        self.gain(overflow);
        self
    }
}

/// Region name -> experience record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperienceLedger {
    regions: AHashMap<String, RegionXp>,
}

impl ExperienceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for a region, creating a zeroed one on first access
    pub fn record(&mut self, region: &str) -> &RegionXp {
        self.regions.entry(region.to_string()).or_default()
    }

    /// Level of a region without creating a record
    pub fn level(&self, region: &str) -> u32 {
        self.regions.get(region).map(|r| r.level).unwrap_or(0)
    }

    /// Grant XP to a region, returning the levels reached in order
    pub fn add_xp(&mut self, region: &str, amount: f64) -> Vec<u32> {
        let reached = self.regions.entry(region.to_string()).or_default().gain(amount);
        for level in &reached {
            tracing::debug!("Region {} reached level {}", region, level);
        }
        reached
    }

    pub fn insert(&mut self, region: String, record: RegionXp) {
        self.regions.insert(region, record.normalized());
    }

    /// Entries sorted by region name
    pub fn entries(&self) -> Vec<(String, RegionXp)> {
        let mut entries: Vec<_> = self
            .regions
            .iter()
            .map(|(name, record)| (name.clone(), record.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
