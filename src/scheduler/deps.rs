//! Collaborators wired into the scheduler after construction

use crate::events::sink::EventSink;
use crate::path::entry::PlayerPath;
use crate::scheduler::frames::FrameScheduler;
use crate::state::game::GameState;

/// External collaborators; any of them may be wired late
#[derive(Default)]
pub struct Dependencies {
    pub events: Option<Box<dyn EventSink + Send>>,
    pub game: Option<Box<dyn GameState + Send>>,
    pub path: Option<Box<dyn PlayerPath + Send>>,
    pub frames: Option<Box<dyn FrameScheduler + Send>>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, events: impl EventSink + Send + 'static) -> Self {
        self.events = Some(Box::new(events));
        self
    }

    pub fn with_game(mut self, game: impl GameState + Send + 'static) -> Self {
        self.game = Some(Box::new(game));
        self
    }

    pub fn with_path(mut self, path: impl PlayerPath + Send + 'static) -> Self {
        self.path = Some(Box::new(path));
        self
    }

    pub fn with_frames(mut self, frames: impl FrameScheduler + Send + 'static) -> Self {
        self.frames = Some(Box::new(frames));
        self
    }

    /// Take every collaborator `other` provides, keeping ours for the rest
    pub fn merge(&mut self, other: Dependencies) {
        if other.events.is_some() {
            self.events = other.events;
        }
        if other.game.is_some() {
            self.game = other.game;
        }
        if other.path.is_some() {
            self.path = other.path;
        }
        if other.frames.is_some() {
            self.frames = other.frames;
        }
    }

    /// Names of collaborators the frame loop cannot run without
    pub fn missing_for_processing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.path.is_none() {
            missing.push("player path");
        }
        if self.game.is_none() {
            missing.push("game state");
        }
        if self.frames.is_none() {
            missing.push("frame scheduler");
        }
        missing
    }
}

impl std::fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependencies")
            .field("events", &self.events.is_some())
            .field("game", &self.game.is_some())
            .field("path", &self.path.is_some())
            .field("frames", &self.frames.is_some())
            .finish()
    }
}
