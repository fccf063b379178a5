//! Snapshot and restore of scheduler-owned state

use crate::core::error::Result;
use crate::events::sink::LoopEvent;
use crate::persistence::snapshot::LoopSnapshot;
use crate::persistence::store::SnapshotStore;
use crate::scheduler::loop_state::LoopState;

impl LoopState {
    pub fn snapshot(&self) -> LoopSnapshot {
        LoopSnapshot {
            current_mana: Some(self.mana.current()),
            region_xp: self.ledger.entries(),
            game_speed: Some(self.speed),
            auto_restart_queue: Some(self.auto_restart),
            action_progress: self.tracking.progress_entries(),
            action_completed: self.tracking.completed_entries(),
            current_action_index: self.current_action_index,
            repeat_explore_states: self
                .repeat_explore
                .iter()
                .map(|(region, enabled)| (region.clone(), *enabled))
                .collect(),
        }
    }

    /// Replace scheduler state from a snapshot; absent fields get defaults
    pub fn restore(&mut self, snapshot: LoopSnapshot) {
        match snapshot.current_mana {
            Some(current) => self.mana.restore(current),
            None => self.mana.refill(),
        }

        self.ledger.clear();
        for (region, record) in snapshot.region_xp {
            self.ledger.insert(region, record);
        }

        self.speed = self
            .config
            .clamp_speed(snapshot.game_speed.unwrap_or(self.config.default_speed));
        self.auto_restart = snapshot.auto_restart_queue.unwrap_or(self.config.auto_restart);
        self.tracking
            .restore(snapshot.action_progress, snapshot.action_completed);
        self.current_action_index = snapshot.current_action_index;
        self.repeat_explore = snapshot.repeat_explore_states.into_iter().collect();
        self.current_source = None;
        self.last_frame = None;

        self.publish(LoopEvent::StateLoaded);
        self.publish_mana();
    }

    pub fn save(&self, store: &mut dyn SnapshotStore) -> Result<()> {
        let json = self.snapshot().to_json()?;
        store.save(&self.config.storage_key, &json)?;
        tracing::debug!("Saved loop state ({} bytes)", json.len());
        Ok(())
    }

    /// Restore from the store once; returns whether anything was restored
    ///
    /// Absent or corrupt records leave the fresh defaults in place.
    pub fn initialize(&mut self, store: &dyn SnapshotStore) -> bool {
        if self.initialized {
            tracing::debug!("initialize() called twice, ignoring");
            return false;
        }
        self.initialized = true;

        let text = match store.load(&self.config.storage_key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::debug!("No saved loop state");
                return false;
            }
            Err(err) => {
                tracing::warn!("Could not read saved loop state: {}", err);
                return false;
            }
        };

        match LoopSnapshot::from_json(&text) {
            Ok(snapshot) => {
                self.restore(snapshot);
                tracing::info!("Restored saved loop state");
                true
            }
            Err(err) => {
                tracing::warn!("Saved loop state is corrupt, starting fresh: {}", err);
                false
            }
        }
    }
}
