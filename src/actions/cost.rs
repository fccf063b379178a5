//! Mana cost model
//!
//! Costs shrink geometrically as a region levels up, down to a floor that
//! keeps every action strictly positive.

use crate::actions::catalog::{Action, ActionType};
use crate::core::config::LoopConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    move_cost: f64,
    check_cost: f64,
    explore_cost: f64,
    reduction_per_level: f64,
    min_cost_ratio: f64,
}

impl CostModel {
    pub fn from_config(config: &LoopConfig) -> Self {
        Self {
            move_cost: config.move_cost,
            check_cost: config.check_cost,
            explore_cost: config.explore_cost,
            reduction_per_level: config.reduction_per_level,
            min_cost_ratio: config.min_cost_ratio,
        }
    }

    pub fn base_cost(&self, action_type: ActionType) -> f64 {
        match action_type {
            ActionType::RegionMove => self.move_cost,
            ActionType::LocationCheck => self.check_cost,
            ActionType::Explore => self.explore_cost,
        }
    }

    /// Multiplier applied to the base cost at a given region level
    pub fn level_multiplier(&self, level: u32) -> f64 {
        let curve = (1.0 - self.reduction_per_level).powf(level as f64);
        curve.max(self.min_cost_ratio)
    }

    /// Mana cost of an action type; `None` level means no region affiliation
    pub fn cost(&self, action_type: ActionType, region_level: Option<u32>) -> f64 {
        let base = self.base_cost(action_type);
        match region_level {
            Some(level) => base * self.level_multiplier(level),
            None => base,
        }
    }

    /// Cost of a concrete action given a lookup for its region's level
    pub fn cost_of(&self, action: &Action, level_of: impl FnOnce(&str) -> u32) -> f64 {
        let level = action.affiliated_region().map(level_of);
        self.cost(action.action_type(), level)
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::from_config(&LoopConfig::default())
    }
}
