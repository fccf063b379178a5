//! Action completion, cursor advancement and mana depletion

use crate::actions::catalog::{Action, ActionKind};
use crate::core::error::Result;
use crate::events::sink::{LoopEvent, ResetReason};
use crate::path::source::list_actions;
use crate::scheduler::loop_state::LoopState;

impl LoopState {
    /// Finish the current action and move the cursor past it
    pub(super) fn complete_current(&mut self, action: &Action, index: usize) -> Result<()> {
        self.apply_effect(action)?;
        self.tracking.complete(action.source_index);

        let mut done = action.clone();
        done.progress = crate::core::types::PROGRESS_COMPLETE;
        done.completed = true;
        tracing::debug!("Completed {:?} in {}", done.kind, done.region);
        self.publish(LoopEvent::ActionCompleted { action: done });

        if matches!(action.kind, ActionKind::Explore) && self.is_repeat_explore(&action.region) {
            self.repeat_explore(action, index)?;
        }

        self.select_from(index + 1)
    }

    /// Side effect of finishing an action; runs once per completion
    fn apply_effect(&mut self, action: &Action) -> Result<()> {
        match &action.kind {
            ActionKind::LocationCheck { location } => {
                let game = self.game()?;
                let newly_checked = game.check_location(location);
                let item = game.location_item(location);
                if newly_checked {
                    if let Some(item) = &item {
                        game.add_item_to_inventory(item);
                    }
                }
                self.publish(LoopEvent::LocationChecked {
                    location: location.clone(),
                    region: action.region.clone(),
                    item,
                });
            }
            ActionKind::RegionMove { to, exit } => {
                self.publish(LoopEvent::MoveCompleted {
                    from: action.region.clone(),
                    to: to.clone(),
                    exit: exit.clone(),
                });
            }
            ActionKind::Explore => {
                self.publish(LoopEvent::ExploreCompleted {
                    region: action.region.clone(),
                });
            }
        }
        Ok(())
    }

    /// Queue another explore of the same region unless one is already waiting
    fn repeat_explore(&mut self, action: &Action, index: usize) -> Result<()> {
        let already_queued = list_actions(&self.entries()?, &self.tracking)
            .iter()
            .skip(index + 1)
            .any(|later| later.is_explore_of(&action.region) && later.is_pending());
        if already_queued {
            return Ok(());
        }

        self.source()?
            .repeat_explore_after(action.source_index, &action.region)?;
        tracing::debug!("Repeating explore of {}", action.region);
        self.publish(LoopEvent::ExploreRepeated {
            region: action.region.clone(),
        });
        self.publish(LoopEvent::QueueUpdated);
        Ok(())
    }

    /// Make the first runnable action at or after `index` current
    ///
    /// Checks for locations that are already checked are removed from the
    /// path as they are passed. Past the end the queue either wraps (with
    /// auto-restart) or completes.
    pub(super) fn select_from(&mut self, index: usize) -> Result<()> {
        let mut index = index;
        let mut wrapped = false;

        loop {
            let actions = list_actions(&self.entries()?, &self.tracking);
            if actions.is_empty() {
                self.current_action_index = 0;
                self.finish_queue();
                return Ok(());
            }

            if index >= actions.len() {
                if self.auto_restart && !wrapped {
                    wrapped = true;
                    index = 0;
                    self.tracking.clear();
                    self.current_source = None;
                    tracing::info!("Queue finished, auto-restarting");
                    self.publish(LoopEvent::LoopReset {
                        paused: false,
                        reason: ResetReason::QueueWrapped,
                    });
                    continue;
                }
                self.current_action_index = index;
                self.finish_queue();
                return Ok(());
            }

            let action = &actions[index];
            if let Some(location) = action.location() {
                if self.game()?.is_location_checked(location) {
                    tracing::debug!("Skipping already checked location {}", location);
                    let source_index = action.source_index;
                    self.source()?.remove(source_index)?;
                    self.current_source = match self.current_source {
                        Some(current) if current > source_index => Some(current - 1),
                        Some(current) if current == source_index => None,
                        other => other,
                    };
                    self.publish(LoopEvent::QueueUpdated);
                    continue;
                }
            }

            if action.completed {
                index += 1;
                continue;
            }

            let action = action.clone();
            self.begin_action(action, index);
            return Ok(());
        }
    }

    /// Make `action` current; resuming the same action is not a new start
    fn begin_action(&mut self, mut action: Action, index: usize) {
        self.current_action_index = index;
        let resumed = self.current_source == Some(action.source_index);
        self.current_source = Some(action.source_index);
        self.tracking.ensure(action.source_index);
        if resumed {
            tracing::debug!("Resuming {:?} in {}", action.kind, action.region);
            return;
        }
        action.progress = self.tracking.progress(action.source_index);
        self.publish(LoopEvent::NewActionStarted { action, index });
    }

    /// Mana ran dry mid-frame: refill, then suspend or rewind
    pub(super) fn handle_depletion(&mut self) -> Result<()> {
        self.mana.refill();
        self.publish_mana();

        if !self.is_processing {
            return Ok(());
        }

        if self.auto_restart {
            tracing::info!("Mana depleted, restarting loop");
            self.tracking.clear();
            self.current_action_index = 0;
            self.current_source = None;
            self.publish(LoopEvent::LoopReset {
                paused: false,
                reason: ResetReason::ManaDepleted,
            });
            self.select_from(0)
        } else {
            tracing::info!("Mana depleted, pausing loop");
            self.stop();
            self.is_paused = true;
            self.publish(LoopEvent::LoopReset {
                paused: true,
                reason: ResetReason::ManaDepleted,
            });
            Ok(())
        }
    }
}
