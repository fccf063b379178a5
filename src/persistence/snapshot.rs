//! Persisted loop record
//!
//! Field names match the record the tracker has always written. Loading is
//! per-field: a malformed field falls back to its default on its own and the
//! rest of the record still restores.

use crate::core::error::Result;
use crate::core::types::{Progress, SourceIndex};
use crate::experience::ledger::RegionXp;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopSnapshot {
    /// Max is left out: it is recomputed from the inventory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_mana: Option<f64>,
    #[serde(rename = "regionXP")]
    pub region_xp: Vec<(String, RegionXp)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_restart_queue: Option<bool>,
    pub action_progress: Vec<(SourceIndex, Progress)>,
    pub action_completed: Vec<SourceIndex>,
    pub current_action_index: usize,
    pub repeat_explore_states: Vec<(String, bool)>,
}

impl LoopSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse stored text; only unparseable JSON is an error
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            tracing::warn!("Persisted loop state is not an object, starting fresh");
            return Self::default();
        };

        Self {
            current_mana: field(object, "currentMana"),
            region_xp: region_records(object),
            game_speed: field(object, "gameSpeed"),
            auto_restart_queue: field(object, "autoRestartQueue"),
            action_progress: field(object, "actionProgress").unwrap_or_default(),
            action_completed: field(object, "actionCompleted").unwrap_or_default(),
            current_action_index: field(object, "currentActionIndex").unwrap_or_default(),
            repeat_explore_states: field(object, "repeatExploreStates").unwrap_or_default(),
        }
    }
}

/// Decode the ledger one region at a time, dropping only bad entries
fn region_records(object: &Map<String, Value>) -> Vec<(String, RegionXp)> {
    let entries: Vec<Value> = field(object, "regionXP").unwrap_or_default();
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<(String, RegionXp)>(entry) {
            Ok((region, record)) if record.is_plausible() => Some((region, record)),
            Ok((region, record)) => {
                tracing::warn!(
                    "Ignoring out-of-range XP record for {}: level {} xp {}",
                    region,
                    record.level,
                    record.xp
                );
                None
            }
            Err(err) => {
                tracing::warn!("Ignoring malformed XP record: {}", err);
                None
            }
        })
        .collect()
}

fn field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<T> {
    let value = object.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!("Ignoring malformed persisted field {}: {}", key, err);
            None
        }
    }
}
