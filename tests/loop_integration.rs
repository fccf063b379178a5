//! Loop scheduler integration tests
//!
//! Drives `LoopState` by hand through `ManualFrames`, with the path and game
//! state shared so the tests can inspect and mutate them between frames.

use loop_tracker::actions::{ActionKind, ActionType};
use loop_tracker::core::types::{FrameHandle, SchedulerPhase};
use loop_tracker::core::LoopError;
use loop_tracker::events::{EventLog, LoopEvent, ResetReason};
use loop_tracker::path::{PathEntry, PathLog, PlayerPath, QueuedAction};
use loop_tracker::scheduler::ManualFrames;
use loop_tracker::state::{GameState, InventorySnapshot, TrackerState};
use loop_tracker::{Dependencies, LoopConfig, LoopState};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Harness {
    state: LoopState,
    frames: ManualFrames,
    events: EventLog,
    game: Arc<Mutex<TrackerState>>,
    path: Arc<Mutex<PathLog>>,
    clock: Duration,
}

impl Harness {
    fn new(path: PathLog, game: TrackerState, config: LoopConfig) -> Self {
        let frames = ManualFrames::new();
        let events = EventLog::new();
        let game = Arc::new(Mutex::new(game));
        let path = Arc::new(Mutex::new(path));
        let deps = Dependencies::new()
            .with_events(events.clone())
            .with_game(Arc::clone(&game))
            .with_path(Arc::clone(&path))
            .with_frames(frames.clone());
        Self {
            state: LoopState::with_dependencies(config, deps),
            frames,
            events,
            game,
            path,
            clock: Duration::from_secs(100),
        }
    }

    /// Fire the outstanding frame `step` after the previous one
    fn frame(&mut self, step: Duration) -> bool {
        let Some(handle) = self.frames.take_next() else {
            return false;
        };
        self.clock += step;
        self.state.on_frame(handle, self.clock);
        true
    }

    fn frames(&mut self, count: usize, step: Duration) {
        for _ in 0..count {
            if !self.frame(step) {
                break;
            }
        }
    }

    fn entries(&self) -> Vec<PathEntry> {
        self.path.lock().unwrap().path()
    }

    fn position(&self, matches: impl Fn(&LoopEvent) -> bool) -> Option<usize> {
        self.events.events().iter().position(matches)
    }
}

fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

fn config_with_mana(base_mana: f64) -> LoopConfig {
    LoopConfig {
        base_mana,
        ..LoopConfig::default()
    }
}

fn checks(locations: &[&str]) -> PathLog {
    let mut path = PathLog::new("Menu");
    for location in locations {
        path.add_location_check(location, "Menu");
    }
    path
}

fn explore_at_start() -> PathLog {
    let mut path = PathLog::new("Menu");
    path.add_custom_action("explore", "Menu", Value::Null);
    path
}

fn explores_of(entries: &[PathEntry], region: &str) -> usize {
    entries
        .iter()
        .filter(|entry| entry.action_type() == Some(ActionType::Explore) && entry.region() == region)
        .count()
}

// ============================================================================
// Single move scenario
// ============================================================================

#[test]
fn test_single_move_spends_its_full_cost() {
    let mut path = PathLog::new("Menu");
    path.move_to("Forest", Some("Menu -> Forest"));
    let mut h = Harness::new(path, TrackerState::new(), LoopConfig::default());

    h.state.set_speed(10.0);
    h.state.start();
    assert_eq!(h.state.phase(), SchedulerPhase::Running);

    // First frame only stamps the clock, the second covers the whole move
    h.frame(secs(1));
    assert_eq!(h.state.mana().current(), 100.0);
    h.frame(secs(1));

    assert_eq!(h.state.mana().current(), 90.0);
    assert_eq!(h.state.phase(), SchedulerPhase::Idle);
    assert!(!h.state.has_pending_frame());

    let started = h
        .position(|e| matches!(e, LoopEvent::NewActionStarted { index: 0, .. }))
        .expect("new action started");
    let completed = h
        .position(|e| matches!(e, LoopEvent::QueueCompleted))
        .expect("queue completed");
    assert!(started < completed);
    assert_eq!(h.events.count(|e| matches!(e, LoopEvent::MoveCompleted { .. })), 1);
}

#[test]
fn test_single_move_over_many_small_frames() {
    let mut path = PathLog::new("Menu");
    path.move_to("Forest", None);
    let mut h = Harness::new(path, TrackerState::new(), LoopConfig::default());

    h.state.set_speed(10.0);
    h.state.start();
    h.frames(20, Duration::from_millis(7));

    assert_eq!(h.state.phase(), SchedulerPhase::Idle);
    assert!((h.state.mana().current() - 90.0).abs() < 1e-9);
}

#[test]
fn test_moves_grant_no_region_xp() {
    let mut path = PathLog::new("Menu");
    path.move_to("Forest", None);
    let mut h = Harness::new(path, TrackerState::new(), LoopConfig::default());

    h.state.set_speed(10.0);
    h.state.start();
    h.frames(3, secs(1));

    assert!(h.state.ledger().is_empty());
    assert_eq!(h.events.count(|e| matches!(e, LoopEvent::XpChanged { .. })), 0);
}

// ============================================================================
// Start conditions
// ============================================================================

#[test]
fn test_start_without_dependencies_is_noop() {
    let mut state = LoopState::new(LoopConfig::default());
    state.start();
    assert_eq!(state.phase(), SchedulerPhase::Idle);
    assert!(!state.has_pending_frame());
}

#[test]
fn test_start_without_frames_is_noop() {
    let events = EventLog::new();
    let deps = Dependencies::new()
        .with_events(events.clone())
        .with_game(TrackerState::new())
        .with_path(checks(&["A"]));
    let mut state = LoopState::with_dependencies(LoopConfig::default(), deps);

    state.start();
    assert!(!state.is_processing());
    assert!(events.events().is_empty());

    // Wiring the missing piece later makes start() work
    let frames = ManualFrames::new();
    state.set_dependencies(Dependencies::new().with_frames(frames.clone()));
    state.start();
    assert!(state.is_processing());
    assert_eq!(frames.pending().len(), 1);
}

#[test]
fn test_start_on_empty_queue_is_noop() {
    let mut h = Harness::new(PathLog::new("Menu"), TrackerState::new(), LoopConfig::default());
    h.state.start();
    assert_eq!(h.state.phase(), SchedulerPhase::Idle);
    assert!(h.events.events().is_empty());
}

#[test]
fn test_start_twice_keeps_one_frame() {
    let mut h = Harness::new(checks(&["A"]), TrackerState::new(), LoopConfig::default());
    h.state.start();
    h.state.start();
    assert_eq!(h.frames.pending().len(), 1);
    assert_eq!(h.events.count(|e| matches!(e, LoopEvent::ProcessingStarted)), 1);
}

// ============================================================================
// Frame handles and speed
// ============================================================================

#[test]
fn test_set_speed_replaces_pending_frame() {
    let mut h = Harness::new(checks(&["A"]), TrackerState::new(), LoopConfig::default());
    h.state.start();
    let first = h.frames.pending()[0];

    h.state.set_speed(4.0);
    let pending = h.frames.pending();
    assert_eq!(pending.len(), 1);
    assert_ne!(pending[0], first);

    // The superseded handle is ignored
    h.state.on_frame(first, secs(1));
    assert!(h.state.has_pending_frame());
    assert_eq!(h.frames.pending(), pending);
    assert_eq!(h.state.speed(), 4.0);
}

#[test]
fn test_unknown_frame_handle_is_ignored() {
    let mut h = Harness::new(checks(&["A"]), TrackerState::new(), LoopConfig::default());
    h.state.start();
    h.state.on_frame(FrameHandle(9_999), secs(5));
    assert!(h.state.has_pending_frame());
    assert_eq!(h.state.tracking().progress(0), 0.0);
}

#[test]
fn test_set_speed_clamps() {
    let mut h = Harness::new(checks(&["A"]), TrackerState::new(), LoopConfig::default());
    h.state.set_speed(1_000.0);
    assert_eq!(h.state.speed(), 100.0);
    h.state.set_speed(0.0);
    assert_eq!(h.state.speed(), 0.1);
    h.state.set_speed(f64::NAN);
    assert_eq!(h.state.speed(), 1.0);
}

#[test]
fn test_stop_keeps_progress() {
    let mut h = Harness::new(checks(&["A"]), TrackerState::new(), LoopConfig::default());
    h.state.start();
    h.frames(3, secs(1));
    let progress = h.state.tracking().progress(0);
    assert_eq!(progress, 20.0);

    h.state.stop();
    assert_eq!(h.state.phase(), SchedulerPhase::Idle);
    assert!(h.frames.pending().is_empty());

    h.state.start();
    h.frames(2, secs(1));
    assert_eq!(h.state.tracking().progress(0), 30.0);
}

// ============================================================================
// Depletion
// ============================================================================

#[test]
fn test_depletion_pauses_and_keeps_progress() {
    let mut h = Harness::new(explore_at_start(), TrackerState::new(), config_with_mana(30.0));
    h.state.start();

    h.frames(3, secs(1));
    assert_eq!(h.state.tracking().progress(0), 40.0);
    assert_eq!(h.state.mana().current(), 10.0);

    h.frame(secs(1));
    assert_eq!(h.state.phase(), SchedulerPhase::Paused);
    assert_eq!(h.state.mana().current(), h.state.mana().max());
    assert_eq!(h.state.tracking().progress(0), 60.0);
    assert!(h.frames.pending().is_empty());
    assert_eq!(
        h.events.count(|e| matches!(
            e,
            LoopEvent::LoopReset {
                paused: true,
                reason: ResetReason::ManaDepleted
            }
        )),
        1
    );
}

#[test]
fn test_depletion_with_auto_restart_rewinds() {
    let mut h = Harness::new(explore_at_start(), TrackerState::new(), config_with_mana(30.0));
    h.state.set_auto_restart(true);
    h.state.start();
    h.frames(4, secs(1));

    assert_eq!(h.state.phase(), SchedulerPhase::Running);
    assert_eq!(h.state.tracking().progress(0), 0.0);
    assert_eq!(h.state.current_action_index(), 0);
    assert_eq!(h.state.mana().current(), 30.0);
    assert!(h.state.has_pending_frame());
    assert_eq!(
        h.events.count(|e| matches!(
            e,
            LoopEvent::LoopReset {
                paused: false,
                reason: ResetReason::ManaDepleted
            }
        )),
        1
    );
}

#[test]
fn test_pause_and_resume() {
    let mut h = Harness::new(checks(&["A"]), TrackerState::new(), LoopConfig::default());
    h.state.start();
    h.frames(2, secs(1));

    h.state.set_paused(true);
    assert_eq!(h.state.phase(), SchedulerPhase::Paused);
    assert!(h.frames.pending().is_empty());

    // Paused wins over start()
    h.state.start();
    assert_eq!(h.state.phase(), SchedulerPhase::Paused);

    h.state.set_paused(false);
    assert_eq!(h.state.phase(), SchedulerPhase::Running);
    assert_eq!(h.frames.pending().len(), 1);
    assert_eq!(h.state.tracking().progress(0), 10.0);
    assert_eq!(h.events.count(|e| matches!(e, LoopEvent::Paused)), 1);
    assert_eq!(h.events.count(|e| matches!(e, LoopEvent::Resumed)), 1);
}

#[test]
fn test_resume_does_not_restart_action() {
    let mut h = Harness::new(checks(&["A"]), TrackerState::new(), LoopConfig::default());
    h.state.start();
    h.frames(2, secs(1));

    h.state.set_paused(true);
    h.state.set_paused(false);
    h.state.stop();
    h.state.start();

    assert_eq!(h.events.count(|e| matches!(e, LoopEvent::NewActionStarted { .. })), 1);
    assert_eq!(h.state.current_action().map(|a| a.progress), Some(10.0));
}

#[test]
fn test_resume_after_depletion_does_not_restart_action() {
    let mut h = Harness::new(explore_at_start(), TrackerState::new(), config_with_mana(30.0));
    h.state.start();
    h.frames(4, secs(1));
    assert_eq!(h.state.phase(), SchedulerPhase::Paused);

    h.state.set_paused(false);
    assert_eq!(h.state.phase(), SchedulerPhase::Running);
    assert_eq!(h.events.count(|e| matches!(e, LoopEvent::NewActionStarted { .. })), 1);
}

#[test]
fn test_invalid_config_falls_back_to_defaults() {
    let config = LoopConfig {
        move_cost: 0.0,
        ..LoopConfig::default()
    };
    assert!(matches!(
        LoopState::try_new(config.clone()),
        Err(LoopError::Config(_))
    ));

    let state = LoopState::new(config);
    assert_eq!(state.config(), &LoopConfig::default());
    assert_eq!(state.mana().max(), 100.0);
}

// ============================================================================
// Completion and queue wrap
// ============================================================================

#[test]
fn test_checked_locations_are_skipped() {
    let game = TrackerState::new().with_checked("A").with_item("B", "Sword");
    let mut h = Harness::new(checks(&["A", "B"]), game, config_with_mana(500.0));

    h.state.start();
    let current = h.state.current_action().expect("current action");
    assert_eq!(current.location(), Some("B"));
    assert_eq!(h.entries(), vec![PathEntry::location_check("B", "Menu")]);

    h.state.set_speed(10.0);
    h.frames(3, secs(1));

    assert_eq!(h.state.phase(), SchedulerPhase::Idle);
    assert!(h.game.lock().unwrap().is_location_checked("B"));
    assert_eq!(h.game.lock().unwrap().item_count("Sword"), 1);
    assert!(h.state.tracking().completed_entries().iter().all(|i| *i == 0));

    let started_on_a = h.events.count(|e| match e {
        LoopEvent::NewActionStarted { action, .. } => action.location() == Some("A"),
        _ => false,
    });
    assert_eq!(started_on_a, 0);
}

#[test]
fn test_only_checked_locations_completes_queue() {
    let game = TrackerState::new().with_checked("A").with_checked("B");
    let mut h = Harness::new(checks(&["A", "B"]), game, LoopConfig::default());

    h.state.start();

    assert!(h.entries().is_empty());
    assert_eq!(h.state.phase(), SchedulerPhase::Idle);
    assert!(!h.state.has_pending_frame());
    assert!(h.frames.pending().is_empty());
    assert_eq!(h.events.count(|e| matches!(e, LoopEvent::NewActionStarted { .. })), 0);

    let started = h
        .position(|e| matches!(e, LoopEvent::ProcessingStarted))
        .expect("processing started");
    let completed = h
        .position(|e| matches!(e, LoopEvent::QueueCompleted))
        .expect("queue completed");
    assert!(started < completed);
}

#[test]
fn test_item_granted_only_on_new_check() {
    let game = TrackerState::new().with_item("A", "Key");
    let mut h = Harness::new(checks(&["A"]), game, config_with_mana(500.0));

    h.state.set_speed(10.0);
    h.state.start();
    // The host checks A itself while the loop is working on it
    h.game.lock().unwrap().check_location("A");
    h.frames(3, secs(1));

    assert_eq!(h.game.lock().unwrap().item_count("Key"), 0);
    assert_eq!(
        h.events.count(|e| matches!(e, LoopEvent::LocationChecked { .. })),
        1
    );
}

#[test]
fn test_auto_restart_wraps_the_queue() {
    let mut path = PathLog::new("Menu");
    path.move_to("Forest", None);
    let mut h = Harness::new(path, TrackerState::new(), config_with_mana(1_000.0));

    h.state.set_auto_restart(true);
    h.state.set_speed(10.0);
    h.state.start();
    h.frames(2, secs(1));

    assert_eq!(h.state.phase(), SchedulerPhase::Running);
    assert_eq!(h.state.mana().current(), 990.0);
    assert_eq!(h.state.tracking().progress(0), 0.0);
    assert!(!h.state.tracking().is_completed(0));
    assert_eq!(
        h.events.count(|e| matches!(
            e,
            LoopEvent::LoopReset {
                reason: ResetReason::QueueWrapped,
                ..
            }
        )),
        1
    );
    assert_eq!(h.events.count(|e| matches!(e, LoopEvent::NewActionStarted { .. })), 2);
    assert_eq!(h.events.count(|e| matches!(e, LoopEvent::QueueCompleted)), 0);
}

#[test]
fn test_xp_levels_lower_costs() {
    let mut path = explore_at_start();
    path.add_custom_action("explore", "Menu", Value::Null);
    path.add_custom_action("explore", "Menu", Value::Null);
    let mut h = Harness::new(path, TrackerState::new(), config_with_mana(1_000.0));

    h.state.set_speed(10.0);
    h.state.start();
    h.frames(3, secs(1));

    // Two explores paid 50 each: level 1 with no leftover
    let record = h.state.region_record("Menu");
    assert_eq!(record.level, 1);
    assert_eq!(record.xp, 0.0);
    assert_eq!(record.xp_for_next_level, 120.0);

    let third = h.state.current_action().expect("third explore");
    assert!((h.state.action_cost(&third) - 47.5).abs() < 1e-9);
    assert_eq!(
        h.events
            .count(|e| matches!(e, LoopEvent::XpChanged { level_up: Some(1), .. })),
        1
    );
}

// ============================================================================
// Repeat explore
// ============================================================================

#[test]
fn test_repeat_explore_injects_once() {
    let mut path = PathLog::new("Menu");
    path.move_to("Forest", None);
    path.add_custom_action("explore", "Forest", Value::Null);
    let mut h = Harness::new(path, TrackerState::new(), config_with_mana(1_000.0));

    h.state.set_repeat_explore("Forest", true);
    h.state.set_speed(10.0);
    h.state.start();
    // Stamp, finish the move, finish the explore
    h.frames(3, secs(1));

    let entries = h.entries();
    assert_eq!(explores_of(&entries, "Forest"), 2);
    assert_eq!(entries.len(), 3);
    assert_eq!(h.events.count(|e| matches!(e, LoopEvent::ExploreRepeated { .. })), 1);
    let current = h.state.current_action().expect("repeated explore");
    assert_eq!(current.source_index, 2);
    assert!(matches!(current.kind, ActionKind::Explore));

    // Another explore already waits later: no injection this time
    h.state
        .enqueue_action(&QueuedAction::Explore { region: "Forest".into() }, None)
        .unwrap();
    assert_eq!(h.state.current_action().map(|a| a.source_index), Some(2));
    h.frame(secs(1));

    assert_eq!(explores_of(&h.entries(), "Forest"), 3);
    assert_eq!(h.events.count(|e| matches!(e, LoopEvent::ExploreRepeated { .. })), 1);
    assert_eq!(h.state.current_action().map(|a| a.source_index), Some(3));
}

#[test]
fn test_repeat_explore_off_by_default() {
    let mut h = Harness::new(explore_at_start(), TrackerState::new(), config_with_mana(1_000.0));
    h.state.set_speed(10.0);
    h.state.start();
    h.frames(2, secs(1));
    assert_eq!(explores_of(&h.entries(), "Menu"), 1);
    assert_eq!(h.state.phase(), SchedulerPhase::Idle);
}

// ============================================================================
// Queue edits
// ============================================================================

#[test]
fn test_remove_action_prunes_only_its_tracking() {
    let mut h = Harness::new(checks(&["A", "B", "C"]), TrackerState::new(), LoopConfig::default());
    h.state.start();
    h.frames(3, secs(1));
    assert_eq!(h.state.tracking().progress(0), 20.0);

    let removed = h.state.remove_action(2).unwrap();
    assert_eq!(removed, PathEntry::location_check("C", "Menu"));
    assert!(!h.state.tracking().is_tracked(2));
    assert_eq!(h.state.tracking().progress(0), 20.0);
    assert_eq!(h.state.current_action().map(|a| a.source_index), Some(0));
    assert_eq!(h.state.actions().len(), 2);
}

#[test]
fn test_removing_earlier_action_follows_current() {
    let mut path = checks(&["A", "B"]);
    path.add_custom_action("explore", "Menu", Value::Null);
    let mut h = Harness::new(path, TrackerState::new(), config_with_mana(1_000.0));
    h.state.set_speed(10.0);
    h.state.start();
    // A completes, B is current
    h.frames(2, secs(1));
    assert_eq!(h.state.current_action_index(), 1);
    h.frame(Duration::from_millis(500));
    assert_eq!(h.state.tracking().progress(1), 50.0);

    h.state.remove_action(0).unwrap();
    let current = h.state.current_action().expect("B still current");
    assert_eq!(current.location(), Some("B"));
    assert_eq!(current.source_index, 0);
    assert_eq!(current.progress, 50.0);
    assert_eq!(h.state.current_action_index(), 0);
    assert!(h.state.tracking().completed_entries().is_empty());
}

#[test]
fn test_removing_current_moves_to_next() {
    let mut h = Harness::new(checks(&["A", "B"]), TrackerState::new(), LoopConfig::default());
    h.state.start();
    h.frames(2, secs(1));

    h.state.remove_action(0).unwrap();
    assert!(h.state.current_action().is_none());
    h.frame(secs(1));

    let current = h.state.current_action().expect("B picked up");
    assert_eq!(current.location(), Some("B"));
    assert_eq!(current.progress, 0.0);
}

#[test]
fn test_remove_rejects_moves_and_bad_indices() {
    let mut path = PathLog::new("Menu");
    path.move_to("Forest", None);
    let mut h = Harness::new(path, TrackerState::new(), LoopConfig::default());

    assert!(matches!(h.state.remove_action(0), Err(LoopError::NotRemovable(_))));
    assert!(matches!(h.state.remove_action(7), Err(LoopError::InvalidIndex(7))));
    assert_eq!(h.entries().len(), 1);
}

#[test]
fn test_removing_last_action_stops_processing() {
    let mut h = Harness::new(checks(&["A"]), TrackerState::new(), LoopConfig::default());
    h.state.start();
    h.state.remove_action(0).unwrap();
    assert_eq!(h.state.phase(), SchedulerPhase::Idle);
    assert!(h.frames.pending().is_empty());
}

#[test]
fn test_clear_actions_keeps_moves() {
    let mut path = PathLog::new("Menu");
    path.add_location_check("A", "Menu");
    path.move_to("Forest", None);
    path.add_custom_action("explore", "Forest", Value::Null);
    let mut h = Harness::new(path, TrackerState::new(), LoopConfig::default());

    let removed = h
        .state
        .clear_actions(Some(&[ActionType::Explore][..]))
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(h.entries().len(), 2);

    let removed = h.state.clear_actions(None).unwrap();
    assert_eq!(removed, 1);
    assert_eq!(h.entries().len(), 1);
    assert!(matches!(h.entries()[0], PathEntry::RegionMove { .. }));
}

#[test]
fn test_enqueue_at_occurrence() {
    let mut path = PathLog::new("Menu");
    path.add_location_check("A", "Menu");
    path.add_location_check("A", "Menu");
    let mut h = Harness::new(path, TrackerState::new(), LoopConfig::default());

    let position = h
        .state
        .enqueue_action(
            &QueuedAction::Explore {
                region: "Menu".into(),
            },
            None,
        )
        .unwrap();
    assert_eq!(position, 2);

    let position = h
        .state
        .enqueue_action(
            &QueuedAction::LocationCheck {
                location: "A".into(),
                region: "Menu".into(),
            },
            Some(1),
        )
        .unwrap();
    assert_eq!(position, 1);
    assert_eq!(h.entries().len(), 4);
    assert_eq!(h.events.count(|e| matches!(e, LoopEvent::QueueUpdated)), 2);
}

// ============================================================================
// Resets, inventory and estimates
// ============================================================================

#[test]
fn test_reset_loop_zeroes_progress() {
    let mut h = Harness::new(checks(&["A", "B"]), TrackerState::new(), LoopConfig::default());
    h.state.start();
    h.frames(3, secs(1));
    assert!(h.state.mana().current() < 100.0);

    h.state.reset_loop();
    assert_eq!(h.state.tracking().progress(0), 0.0);
    assert_eq!(h.state.mana().current(), 100.0);
    assert_eq!(h.state.current_action_index(), 0);
    assert_eq!(h.state.phase(), SchedulerPhase::Running);
    assert_eq!(
        h.events.count(|e| matches!(
            e,
            LoopEvent::LoopReset {
                reason: ResetReason::Manual,
                ..
            }
        )),
        1
    );
}

#[test]
fn test_inventory_raises_max_mana() {
    let mut h = Harness::new(checks(&["A"]), TrackerState::new(), LoopConfig::default());
    let inventory: InventorySnapshot = vec![("Sword".to_string(), 2), ("Key".to_string(), 1)]
        .into_iter()
        .collect();
    h.state.on_inventory_updated(&inventory);

    assert_eq!(h.state.mana().max(), 130.0);
    assert_eq!(h.state.mana().current(), 100.0);
    assert!(h
        .events
        .events()
        .contains(&LoopEvent::ManaChanged { current: 100.0, max: 130.0 }));
}

#[test]
fn test_queue_mana_estimate() {
    let mut path = PathLog::new("Menu");
    path.add_location_check("A", "Menu");
    path.move_to("Forest", None);
    path.add_custom_action("explore", "Forest", Value::Null);
    let h = Harness::new(path, TrackerState::new(), LoopConfig::default());

    assert!((h.state.queue_mana_estimate() - 160.0).abs() < 1e-9);
}

#[test]
fn test_toggle_auto_restart() {
    let mut h = Harness::new(checks(&["A"]), TrackerState::new(), LoopConfig::default());
    assert!(h.state.toggle_auto_restart());
    assert!(!h.state.toggle_auto_restart());
    assert_eq!(
        h.events.count(|e| matches!(e, LoopEvent::AutoRestartChanged { .. })),
        2
    );
}

// ============================================================================
// Failures inside a frame
// ============================================================================

/// Path that refuses to drop location checks
struct StubbornPath(PathLog);

impl PlayerPath for StubbornPath {
    fn path(&self) -> Vec<PathEntry> {
        self.0.path()
    }

    fn add_custom_action(&mut self, action: &str, region: &str, params: Value) -> Option<usize> {
        self.0.add_custom_action(action, region, params)
    }

    fn insert_custom_action_at(
        &mut self,
        action: &str,
        region: &str,
        occurrence: usize,
        params: Value,
    ) -> Option<usize> {
        self.0.insert_custom_action_at(action, region, occurrence, params)
    }

    fn remove_custom_action_at(&mut self, action: &str, region: &str, occurrence: usize) -> Option<usize> {
        self.0.remove_custom_action_at(action, region, occurrence)
    }

    fn remove_all_actions_of_type(&mut self, action_type: ActionType) -> usize {
        self.0.remove_all_actions_of_type(action_type)
    }

    fn add_location_check(&mut self, location: &str, region: &str) -> Option<usize> {
        self.0.add_location_check(location, region)
    }

    fn insert_location_check_at(&mut self, location: &str, region: &str, occurrence: usize) -> Option<usize> {
        self.0.insert_location_check_at(location, region, occurrence)
    }

    fn remove_location_check_at(&mut self, _location: &str, _region: &str, _occurrence: usize) -> Option<usize> {
        None
    }
}

#[test]
fn test_failed_tick_stops_cleanly() {
    let frames = ManualFrames::new();
    let game = Arc::new(Mutex::new(TrackerState::new()));
    let deps = Dependencies::new()
        .with_game(Arc::clone(&game))
        .with_path(StubbornPath(checks(&["A", "B"])))
        .with_frames(frames.clone());
    let mut state = LoopState::with_dependencies(config_with_mana(1_000.0), deps);

    state.set_speed(10.0);
    state.start();
    // B gets checked elsewhere, so finishing A tries to drop it
    game.lock().unwrap().check_location("B");

    let mut clock = secs(1);
    while let Some(handle) = frames.take_next() {
        clock += secs(1);
        state.on_frame(handle, clock);
    }

    assert_eq!(state.phase(), SchedulerPhase::Idle);
    assert!(!state.has_pending_frame());
    assert!(state.tracking().is_completed(0));
}
