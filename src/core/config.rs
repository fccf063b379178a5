//! Loop-mode configuration with documented constants
//!
//! Every tunable number the scheduler uses lives here. Values can be
//! overridden from a TOML file; missing keys keep their defaults.

use crate::core::error::{LoopError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the loop-mode scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    // === COSTS ===
    /// Base mana cost of a region move
    pub move_cost: f64,

    /// Base mana cost of a location check
    pub check_cost: f64,

    /// Base mana cost of exploring a region
    pub explore_cost: f64,

    /// Fractional cost reduction applied per region level
    ///
    /// Applied geometrically: cost = base * (1 - reduction)^level.
    /// At 0.05 a level 10 region costs about 60% of base.
    pub reduction_per_level: f64,

    /// Lowest fraction of the base cost a leveled region can reach
    ///
    /// Keeps every cost strictly positive no matter how high the level.
    pub min_cost_ratio: f64,

    // === MANA ===
    /// Maximum mana with an empty inventory
    pub base_mana: f64,

    /// Extra maximum mana per inventory item
    pub mana_per_item: f64,

    /// Mana drained per second of wall time at speed 1.0
    ///
    /// A move (cost 10) takes one second at speed 1, a check (cost 100)
    /// ten seconds.
    pub mana_per_second: f64,

    // === EXPERIENCE ===
    /// Region XP granted per point of mana spent in that region
    pub xp_per_mana: f64,

    // === SPEED ===
    /// Speed multiplier used before the player changes it
    pub default_speed: f64,

    /// Lower clamp for the speed multiplier
    pub min_speed: f64,

    /// Upper clamp for the speed multiplier
    pub max_speed: f64,

    /// Whether a fresh scheduler wraps around when the queue runs out
    pub auto_restart: bool,

    // === PERSISTENCE ===
    /// Seconds between automatic saves
    pub autosave_secs: u64,

    /// Key of the persisted record in the snapshot store
    pub storage_key: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            move_cost: 10.0,
            check_cost: 100.0,
            explore_cost: 50.0,
            reduction_per_level: 0.05,
            min_cost_ratio: 0.1,

            base_mana: 100.0,
            mana_per_item: 10.0,
            mana_per_second: 10.0,

            xp_per_mana: 1.0,

            default_speed: 1.0,
            min_speed: 0.1,
            max_speed: 100.0,
            auto_restart: false,

            autosave_secs: 60,
            storage_key: "loop_state".to_string(),
        }
    }
}

impl LoopConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text, keeping defaults for absent keys
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: LoopConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file on disk
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_secs.max(1))
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let costs = [
            ("move_cost", self.move_cost),
            ("check_cost", self.check_cost),
            ("explore_cost", self.explore_cost),
        ];
        for (name, cost) in costs {
            if !(cost > 0.0 && cost.is_finite()) {
                return Err(LoopError::Config(format!("{name} must be positive, got {cost}")));
            }
        }

        if !(0.0..1.0).contains(&self.reduction_per_level) {
            return Err(LoopError::Config(format!(
                "reduction_per_level ({}) must be in [0, 1)",
                self.reduction_per_level
            )));
        }

        // Ratio 0 would let a high enough level make actions free
        if !(self.min_cost_ratio > 0.0 && self.min_cost_ratio <= 1.0) {
            return Err(LoopError::Config(format!(
                "min_cost_ratio ({}) must be in (0, 1]",
                self.min_cost_ratio
            )));
        }

        if self.base_mana <= 0.0 || self.mana_per_item < 0.0 {
            return Err(LoopError::Config("Mana capacity must be positive".into()));
        }

        if self.mana_per_second <= 0.0 {
            return Err(LoopError::Config("mana_per_second must be positive".into()));
        }

        if self.xp_per_mana < 0.0 {
            return Err(LoopError::Config("xp_per_mana must not be negative".into()));
        }

        if !(self.min_speed > 0.0 && self.min_speed <= self.max_speed) {
            return Err(LoopError::Config(format!(
                "speed range [{}, {}] is invalid",
                self.min_speed, self.max_speed
            )));
        }

        Ok(())
    }

    /// Clamp a requested speed multiplier into the configured range
    pub fn clamp_speed(&self, speed: f64) -> f64 {
        if speed.is_nan() {
            return self.default_speed.clamp(self.min_speed, self.max_speed);
        }
        speed.clamp(self.min_speed, self.max_speed)
    }
}
