//! Headless Loop Runner
//!
//! Runs the loop scheduler against a sample path on a timer-driven frame
//! source, autosaving to a directory, and prints the notifications it emits.

use clap::Parser;
use loop_tracker::events::LoopEvent;
use loop_tracker::path::{PathLog, PlayerPath};
use loop_tracker::persistence::FileStore;
use loop_tracker::runtime::{LoopRuntime, TimerFrames};
use loop_tracker::state::TrackerState;
use loop_tracker::{Dependencies, LoopConfig, LoopState, Result};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Runtime;

/// Headless Loop Runner - drive loop mode without a UI
#[derive(Parser, Debug)]
#[command(name = "loop_sim")]
#[command(about = "Run the loop-mode scheduler on a sample path")]
struct Args {
    /// TOML file overriding the default loop configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the autosaved loop state
    #[arg(long, default_value = "loop_state")]
    state_dir: PathBuf,

    /// Speed multiplier
    #[arg(long, default_value_t = 10.0)]
    speed: f64,

    /// Wall-clock seconds to run before stopping
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,

    /// Milliseconds between frames
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Wrap around instead of stopping when the queue or mana runs out
    #[arg(long)]
    auto_restart: bool,

    /// Keep re-exploring the forest
    #[arg(long)]
    repeat_forest: bool,

    /// Print every event as JSON, including per-frame mana and XP ticks
    #[arg(long)]
    json: bool,
}

fn sample_path() -> PathLog {
    let mut path = PathLog::new("Menu");
    path.move_to("Forest", Some("Menu -> Forest"));
    path.add_custom_action("explore", "Forest", Value::Null);
    path.add_location_check("Old Stump", "Forest");
    path.move_to("Cave", Some("Forest -> Cave"));
    path.add_location_check("Chest", "Cave");
    path.add_custom_action("explore", "Cave", Value::Null);
    path
}

fn sample_state() -> TrackerState {
    TrackerState::new()
        .with_item("Old Stump", "Sword")
        .with_item("Chest", "Lantern")
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match &args.config {
        Some(path) => LoopConfig::load_from_toml(path)?,
        None => LoopConfig::default(),
    };

    let game = Arc::new(Mutex::new(sample_state()));
    let path = Arc::new(Mutex::new(sample_path()));
    let frames = TimerFrames::new();
    let (events, mut receiver) = tokio::sync::mpsc::unbounded_channel();

    let deps = Dependencies::new()
        .with_events(events)
        .with_game(Arc::clone(&game))
        .with_path(Arc::clone(&path))
        .with_frames(frames.clone());
    let mut state = LoopState::with_dependencies(config, deps);

    let store = FileStore::new(&args.state_dir);
    if state.initialize(&store) {
        tracing::info!("Resumed from {}", args.state_dir.display());
    }
    state.set_speed(args.speed);
    state.set_auto_restart(args.auto_restart);
    state.set_repeat_explore("Forest", args.repeat_forest);

    let shared = Arc::new(Mutex::new(state));
    let rt = Runtime::new()?;

    rt.block_on(async {
        let runtime = LoopRuntime::spawn(
            Arc::clone(&shared),
            frames,
            store,
            Duration::from_millis(args.frame_ms.max(1)),
        );
        shared.lock().unwrap_or_else(|e| e.into_inner()).start();

        let deadline = tokio::time::sleep(Duration::from_secs_f64(args.seconds.max(0.0)));
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                event = receiver.recv() => {
                    let Some(event) = event else { break };
                    report(&event, args.json);

                    if let LoopEvent::LocationChecked { .. } = event {
                        let inventory = game.lock().unwrap_or_else(|e| e.into_inner()).inventory_snapshot();
                        shared
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .on_inventory_updated(&inventory);
                    }
                    if matches!(event, LoopEvent::QueueCompleted) {
                        break;
                    }
                }
            }
        }

        shared.lock().unwrap_or_else(|e| e.into_inner()).stop();
        if runtime.shutdown().await.is_some() {
            tracing::info!("Loop state saved to {}", args.state_dir.display());
        }
    });

    let mut state = shared.lock().unwrap_or_else(|e| e.into_inner());
    println!();
    println!("--- Loop Summary ---");
    println!("Phase: {:?}", state.phase());
    println!("Mana: {:.1}/{:.1}", state.mana().current(), state.mana().max());
    for region in ["Forest", "Cave"] {
        let record = state.region_record(region);
        println!(
            "{}: level {} ({:.1}/{:.0} xp)",
            region, record.level, record.xp, record.xp_for_next_level
        );
    }
    println!(
        "Checked locations: {}",
        game.lock().unwrap_or_else(|e| e.into_inner()).checked_count()
    );
    Ok(())
}

fn report(event: &LoopEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(err) => tracing::warn!("Could not encode event: {}", err),
        }
        return;
    }

    match event {
        // Per-frame noise
        LoopEvent::ManaChanged { .. } | LoopEvent::XpChanged { level_up: None, .. } => {}
        LoopEvent::XpChanged { region, level_up: Some(level), .. } => {
            println!("{} reached level {}", region, level);
        }
        LoopEvent::NewActionStarted { action, index } => {
            println!("[{}] {:?} in {}", index, action.kind, action.region);
        }
        LoopEvent::LocationChecked { location, item, .. } => match item {
            Some(item) => println!("Checked {} and found {}", location, item),
            None => println!("Checked {}", location),
        },
        other => println!("{:?}", other),
    }
}
