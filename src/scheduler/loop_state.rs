//! Loop-mode scheduler
//!
//! Drives one current action at a time through frame callbacks. Each frame
//! converts elapsed wall time into mana spent on the current action; spent
//! mana becomes progress and region XP. The action list itself is never
//! stored: it is derived from the player path on every query and joined to
//! the tracking maps by source index.

use crate::actions::catalog::{Action, ActionType};
use crate::actions::cost::CostModel;
use crate::core::config::LoopConfig;
use crate::core::error::{LoopError, Result};
use crate::core::types::{FrameHandle, SchedulerPhase, SourceIndex, PROGRESS_COMPLETE};
use crate::events::sink::{LoopEvent, ResetReason};
use crate::experience::ledger::{ExperienceLedger, RegionXp};
use crate::mana::pool::ManaPool;
use crate::path::entry::PathEntry;
use crate::path::source::{list_actions, removed_positions, ActionSource, QueuedAction};
use crate::scheduler::deps::Dependencies;
use crate::scheduler::tracking::ActionTracking;
use crate::state::game::{GameState, InventorySnapshot};
use std::collections::BTreeMap;
use std::time::Duration;

/// Progress within this distance of 100 counts as complete
const COMPLETION_EPSILON: f64 = 1e-9;

pub struct LoopState {
    pub(super) config: LoopConfig,
    pub(super) costs: CostModel,
    pub(super) ledger: ExperienceLedger,
    pub(super) mana: ManaPool,
    pub(super) tracking: ActionTracking,
    pub(super) repeat_explore: BTreeMap<String, bool>,
    pub(super) current_action_index: usize,
    pub(super) current_source: Option<SourceIndex>,
    pub(super) is_processing: bool,
    pub(super) is_paused: bool,
    pub(super) speed: f64,
    pub(super) auto_restart: bool,
    pub(super) last_frame: Option<Duration>,
    pub(super) pending_frame: Option<FrameHandle>,
    pub(super) deps: Dependencies,
    pub(super) initialized: bool,
}

impl LoopState {
    /// Build a scheduler, validating the config first
    pub fn try_new(config: LoopConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Build a scheduler; an invalid config is replaced by the defaults
    pub fn new(config: LoopConfig) -> Self {
        match config.validate() {
            Ok(()) => Self::from_valid(config),
            Err(err) => {
                tracing::warn!("Rejecting loop config, using defaults: {}", err);
                Self::from_valid(LoopConfig::default())
            }
        }
    }

    fn from_valid(config: LoopConfig) -> Self {
        Self {
            costs: CostModel::from_config(&config),
            ledger: ExperienceLedger::new(),
            mana: ManaPool::new(&config),
            tracking: ActionTracking::new(),
            repeat_explore: BTreeMap::new(),
            current_action_index: 0,
            current_source: None,
            is_processing: false,
            is_paused: false,
            speed: config.clamp_speed(config.default_speed),
            auto_restart: config.auto_restart,
            last_frame: None,
            pending_frame: None,
            deps: Dependencies::new(),
            initialized: false,
            config,
        }
    }

    pub fn with_dependencies(config: LoopConfig, deps: Dependencies) -> Self {
        let mut state = Self::new(config);
        state.deps = deps;
        state
    }

    /// Wire collaborators that were not ready at construction
    pub fn set_dependencies(&mut self, deps: Dependencies) {
        self.deps.merge(deps);
    }

    // === QUERIES ===

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn phase(&self) -> SchedulerPhase {
        if self.is_paused {
            SchedulerPhase::Paused
        } else if self.is_processing {
            SchedulerPhase::Running
        } else {
            SchedulerPhase::Idle
        }
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn auto_restart(&self) -> bool {
        self.auto_restart
    }

    pub fn mana(&self) -> &ManaPool {
        &self.mana
    }

    pub fn tracking(&self) -> &ActionTracking {
        &self.tracking
    }

    pub fn current_action_index(&self) -> usize {
        self.current_action_index
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    /// Experience record for a region, created on first access
    pub fn region_record(&mut self, region: &str) -> RegionXp {
        self.ledger.record(region).clone()
    }

    pub fn ledger(&self) -> &ExperienceLedger {
        &self.ledger
    }

    pub fn is_repeat_explore(&self, region: &str) -> bool {
        self.repeat_explore.get(region).copied().unwrap_or(false)
    }

    /// Current queue derived from the player path
    pub fn actions(&self) -> Vec<Action> {
        match self.entries() {
            Ok(entries) => list_actions(&entries, &self.tracking),
            Err(err) => {
                tracing::warn!("Cannot list loop actions: {}", err);
                Vec::new()
            }
        }
    }

    /// Action the loop is working on, if processing or paused mid-action
    pub fn current_action(&self) -> Option<Action> {
        let source = self.current_source?;
        self.actions().into_iter().find(|a| a.source_index == source)
    }

    /// Mana cost of an action at its region's current level
    pub fn action_cost(&self, action: &Action) -> f64 {
        self.costs.cost_of(action, |region| self.ledger.level(region))
    }

    /// Mana still needed to finish the queue from the cursor on
    pub fn queue_mana_estimate(&self) -> f64 {
        self.actions()
            .iter()
            .skip(self.current_action_index)
            .map(|action| self.action_cost(action) * action.remaining_fraction())
            .sum()
    }

    // === CONTROL ===

    /// Begin or resume processing at the cursor
    pub fn start(&mut self) {
        if self.is_processing || self.is_paused {
            tracing::debug!(
                "start() ignored: processing={} paused={}",
                self.is_processing,
                self.is_paused
            );
            return;
        }

        let missing = self.deps.missing_for_processing();
        if !missing.is_empty() {
            tracing::warn!("Cannot start loop, missing: {}", missing.join(", "));
            return;
        }

        let actions = self.actions();
        if actions.is_empty() {
            tracing::debug!("start() ignored: queue is empty");
            return;
        }

        let index = if self.current_action_index < actions.len() {
            self.current_action_index
        } else {
            0
        };

        self.is_processing = true;
        self.last_frame = None;
        self.publish(LoopEvent::ProcessingStarted);
        tracing::info!("Loop processing started at action {}", index);

        if let Err(err) = self.select_from(index) {
            tracing::error!("Failed to select starting action: {}", err);
            self.halt();
            return;
        }

        if self.is_processing {
            self.request_frame();
        }
    }

    /// Cancel the pending frame; progress is kept for a later start()
    pub fn stop(&mut self) {
        self.cancel_pending_frame();
        self.last_frame = None;
        if self.is_processing {
            self.is_processing = false;
            self.publish(LoopEvent::ProcessingStopped);
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        if paused {
            if self.is_paused {
                return;
            }
            self.stop();
            self.is_paused = true;
            self.publish(LoopEvent::Paused);
        } else {
            if !self.is_paused {
                return;
            }
            self.is_paused = false;
            self.publish(LoopEvent::Resumed);
            if !self.actions().is_empty() {
                self.start();
            }
        }
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = self.config.clamp_speed(speed);
        self.last_frame = None;
        if self.pending_frame.is_some() {
            self.request_frame();
        }
        self.publish(LoopEvent::SpeedChanged { speed: self.speed });
    }

    pub fn set_auto_restart(&mut self, enabled: bool) {
        self.auto_restart = enabled;
        self.publish(LoopEvent::AutoRestartChanged { enabled });
    }

    pub fn toggle_auto_restart(&mut self) -> bool {
        self.set_auto_restart(!self.auto_restart);
        self.auto_restart
    }

    pub fn set_repeat_explore(&mut self, region: &str, enabled: bool) {
        self.repeat_explore.insert(region.to_string(), enabled);
        self.publish(LoopEvent::RepeatExploreChanged {
            region: region.to_string(),
            enabled,
        });
    }

    /// Zero all progress, rewind to the first action and refill mana
    pub fn reset_loop(&mut self) {
        self.tracking.clear();
        self.current_action_index = 0;
        self.current_source = None;
        self.last_frame = None;
        self.mana.refill();
        self.publish_mana();
        self.publish(LoopEvent::LoopReset {
            paused: self.is_paused,
            reason: ResetReason::Manual,
        });

        if self.is_processing {
            if let Err(err) = self.select_from(0) {
                tracing::error!("Failed to restart loop: {}", err);
                self.halt();
            }
        }
    }

    /// React to an inventory change published by the game
    pub fn on_inventory_updated(&mut self, inventory: &InventorySnapshot) {
        self.mana.recalc(inventory);
        self.publish_mana();
    }

    // === QUEUE EDITS ===

    pub fn enqueue_action(&mut self, action: &QueuedAction, occurrence: Option<usize>) -> Result<SourceIndex> {
        let anchor = self.current_source;
        let position = self.source()?.enqueue(action, occurrence)?;
        if let Some(current) = anchor {
            let moved = if current >= position { current + 1 } else { current };
            self.relocate_cursor(moved, true);
        }
        self.publish(LoopEvent::QueueUpdated);
        Ok(position)
    }

    /// Remove a queued action by its source index
    pub fn remove_action(&mut self, source_index: SourceIndex) -> Result<PathEntry> {
        let anchor = self.current_source;
        let removed = self.source()?.remove(source_index)?;
        if let Some(current) = anchor {
            match current.cmp(&source_index) {
                std::cmp::Ordering::Less => self.relocate_cursor(current, true),
                std::cmp::Ordering::Equal => self.relocate_cursor(current, false),
                std::cmp::Ordering::Greater => self.relocate_cursor(current - 1, true),
            }
        }
        self.publish(LoopEvent::QueueUpdated);
        self.stop_if_empty();
        Ok(removed)
    }

    /// Remove every action of the given types, all queueable kinds by default
    pub fn clear_actions(&mut self, types: Option<&[ActionType]>) -> Result<usize> {
        let types = types.unwrap_or(&ActionType::QUEUEABLE);
        let before = self.entries()?;
        let anchor = self.current_source;
        let result = self.source()?.clear(types);

        let dropped = removed_positions(&before, &self.entries()?);
        if let Some(current) = anchor {
            let shifted = current - dropped.range(..current).count();
            self.relocate_cursor(shifted, !dropped.contains(&current));
        }
        self.publish(LoopEvent::QueueUpdated);
        self.stop_if_empty();
        result
    }

    // === FRAME LOOP ===

    /// Frame callback; `now` is the host's monotonic frame timestamp
    pub fn on_frame(&mut self, handle: FrameHandle, now: Duration) {
        if self.pending_frame != Some(handle) {
            tracing::debug!("Ignoring stale frame {:?}", handle);
            return;
        }
        self.pending_frame = None;

        if !self.is_processing {
            return;
        }

        if let Err(err) = self.tick(now) {
            tracing::error!("Loop tick failed, stopping: {}", err);
            self.halt();
            return;
        }

        if self.is_processing && self.pending_frame.is_none() {
            self.request_frame();
        }
    }

    fn tick(&mut self, now: Duration) -> Result<()> {
        // First frame of a run only records its timestamp
        let Some(last) = self.last_frame.replace(now) else {
            return Ok(());
        };
        let elapsed = now.saturating_sub(last).as_secs_f64();

        let actions = list_actions(&self.entries()?, &self.tracking);
        if actions.is_empty() {
            tracing::debug!("Queue emptied while processing");
            self.finish_queue();
            return Ok(());
        }

        let index = if self.current_action_index < actions.len() {
            self.current_action_index
        } else {
            tracing::debug!(
                "Cursor {} out of range for {} actions, wrapping",
                self.current_action_index,
                actions.len()
            );
            0
        };

        let mut action = actions[index].clone();
        if self.current_source != Some(action.source_index) {
            // The path changed under the cursor; treat as a fresh pick
            self.select_from(index)?;
            return Ok(());
        }

        let cost = self.action_cost(&action);
        let wanted = elapsed * self.speed * self.config.mana_per_second;
        let progress_before = self.tracking.progress(action.source_index);
        let remaining_cost = (PROGRESS_COMPLETE - progress_before).max(0.0) / PROGRESS_COMPLETE * cost;
        let spent = self.mana.consume(wanted.min(remaining_cost));

        let progress = if spent >= remaining_cost {
            self.tracking.advance(action.source_index, PROGRESS_COMPLETE)
        } else {
            self.tracking
                .advance(action.source_index, spent / cost * PROGRESS_COMPLETE)
        };

        if let Some(region) = action.affiliated_region().map(str::to_string) {
            self.grant_xp(&region, spent * self.config.xp_per_mana);
        }
        self.publish_mana();

        if progress >= PROGRESS_COMPLETE - COMPLETION_EPSILON {
            action.progress = progress;
            self.complete_current(&action, index)?;
        }

        if self.mana.is_depleted() {
            self.handle_depletion()?;
        }

        Ok(())
    }

    fn grant_xp(&mut self, region: &str, amount: f64) {
        let levels = self.ledger.add_xp(region, amount);
        let record = self.ledger.record(region).clone();
        for level in levels {
            self.publish(LoopEvent::XpChanged {
                region: region.to_string(),
                record: record.clone(),
                level_up: Some(level),
            });
        }
        self.publish(LoopEvent::XpChanged {
            region: region.to_string(),
            record,
            level_up: None,
        });
    }

    // === INTERNALS ===

    pub(super) fn publish(&mut self, event: LoopEvent) {
        match self.deps.events.as_mut() {
            Some(events) => events.publish(event),
            None => tracing::trace!("No event sink wired, dropping {:?}", event),
        }
    }

    pub(super) fn publish_mana(&mut self) {
        self.publish(LoopEvent::ManaChanged {
            current: self.mana.current(),
            max: self.mana.max(),
        });
    }

    pub(super) fn entries(&self) -> Result<Vec<PathEntry>> {
        self.deps
            .path
            .as_deref()
            .map(|path| path.path())
            .ok_or(LoopError::MissingDependency("player path"))
    }

    pub(super) fn source(&mut self) -> Result<ActionSource<'_>> {
        let path = self
            .deps
            .path
            .as_deref_mut()
            .ok_or(LoopError::MissingDependency("player path"))?;
        Ok(ActionSource::new(path, &mut self.tracking))
    }

    pub(super) fn game(&mut self) -> Result<&mut (dyn GameState + Send + 'static)> {
        self.deps
            .game
            .as_deref_mut()
            .ok_or(LoopError::MissingDependency("game state"))
    }

    /// Replace any outstanding frame request with a fresh one
    pub(super) fn request_frame(&mut self) {
        self.cancel_pending_frame();
        match self.deps.frames.as_mut() {
            Some(frames) => self.pending_frame = Some(frames.request_frame()),
            None => {
                tracing::warn!("No frame scheduler wired, loop cannot advance");
                self.is_processing = false;
            }
        }
    }

    pub(super) fn cancel_pending_frame(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            if let Some(frames) = self.deps.frames.as_mut() {
                frames.cancel_frame(handle);
            }
        }
    }

    /// Stop after a failure, leaving progress as it was
    pub(super) fn halt(&mut self) {
        self.stop();
    }

    /// Idle with no current action after the last action finished
    pub(super) fn finish_queue(&mut self) {
        self.cancel_pending_frame();
        self.is_processing = false;
        self.current_source = None;
        self.last_frame = None;
        tracing::info!("Loop queue completed");
        self.publish(LoopEvent::QueueCompleted);
    }

    /// Point the cursor at `anchor` (a post-edit path position)
    ///
    /// When the current action itself was removed the cursor lands on
    /// whatever now follows it.
    fn relocate_cursor(&mut self, anchor: SourceIndex, still_present: bool) {
        let actions = self.actions();
        self.current_action_index = actions
            .iter()
            .take_while(|action| action.source_index < anchor)
            .count();
        self.current_source = still_present.then_some(anchor);
    }

    fn stop_if_empty(&mut self) {
        if self.is_processing && self.actions().is_empty() {
            tracing::debug!("Queue is empty, stopping");
            self.stop();
        }
    }
}

impl std::fmt::Debug for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopState")
            .field("phase", &self.phase())
            .field("current_action_index", &self.current_action_index)
            .field("mana", &self.mana)
            .field("speed", &self.speed)
            .field("auto_restart", &self.auto_restart)
            .field("deps", &self.deps)
            .finish()
    }
}
