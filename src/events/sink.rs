//! Loop events and the sinks that receive them
//!
//! Publishing is fire-and-forget: sinks return nothing and the scheduler
//! never waits on a listener.

use crate::actions::catalog::Action;
use crate::experience::ledger::RegionXp;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetReason {
    /// Mana hit zero mid-action
    ManaDepleted,
    /// The queue ran out with auto-restart enabled
    QueueWrapped,
    /// Requested by the host
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoopEvent {
    ManaChanged { current: f64, max: f64 },
    /// Published on every tick that grants XP and once per level reached
    XpChanged { region: String, record: RegionXp, level_up: Option<u32> },
    QueueUpdated,
    ProcessingStarted,
    ProcessingStopped,
    Paused,
    Resumed,
    SpeedChanged { speed: f64 },
    ActionCompleted { action: Action },
    NewActionStarted { action: Action, index: usize },
    ExploreRepeated { region: String },
    QueueCompleted,
    LoopReset { paused: bool, reason: ResetReason },
    AutoRestartChanged { enabled: bool },
    RepeatExploreChanged { region: String, enabled: bool },
    StateLoaded,

    // Domain effects for discovery tracking
    ExploreCompleted { region: String },
    LocationChecked { location: String, region: String, item: Option<String> },
    MoveCompleted { from: String, to: String, exit: Option<String> },
}

/// Receiver of loop notifications
pub trait EventSink {
    fn publish(&mut self, event: LoopEvent);
}

impl EventSink for tokio::sync::mpsc::UnboundedSender<LoopEvent> {
    fn publish(&mut self, event: LoopEvent) {
        // A closed channel just means nobody is listening
        let _ = self.send(event);
    }
}

impl<T: EventSink> EventSink for Arc<Mutex<T>> {
    fn publish(&mut self, event: LoopEvent) {
        self.lock().unwrap_or_else(|e| e.into_inner()).publish(event)
    }
}

/// Sink that keeps every event in a shared buffer
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<LoopEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LoopEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<LoopEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn count(&self, matches: impl Fn(&LoopEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|event| matches(event))
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl EventSink for EventLog {
    fn publish(&mut self, event: LoopEvent) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }
}
