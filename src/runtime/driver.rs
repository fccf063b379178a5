//! Tokio frame source and autosave timer
//!
//! A fixed-period interval stands in for the display refresh. Only the
//! handle the scheduler most recently requested is ever fired.

use crate::core::types::FrameHandle;
use crate::persistence::store::SnapshotStore;
use crate::scheduler::frames::FrameScheduler;
use crate::scheduler::loop_state::LoopState;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub type SharedLoop = Arc<Mutex<LoopState>>;

fn lock(state: &SharedLoop) -> MutexGuard<'_, LoopState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Frame scheduler holding at most one outstanding request
#[derive(Debug, Clone, Default)]
pub struct TimerFrames {
    inner: Arc<Mutex<TimerInner>>,
}

#[derive(Debug, Default)]
struct TimerInner {
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl TimerFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the outstanding request, if any, so it can be fired
    pub fn take_due(&self) -> Option<FrameHandle> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).pending.is_some()
    }
}

impl FrameScheduler for TimerFrames {
    fn request_frame(&mut self) -> FrameHandle {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.next_id += 1;
        let handle = FrameHandle(inner.next_id);
        inner.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.pending == Some(handle) {
            inner.pending = None;
        }
    }
}

/// Fire pending frames every `period` until shutdown is signalled
pub async fn run_frames(
    state: SharedLoop,
    frames: TimerFrames,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let origin = Instant::now();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Some(handle) = frames.take_due() {
                    lock(&state).on_frame(handle, origin.elapsed());
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    tracing::debug!("Frame source stopped");
}

/// Save the shared state every `period`, plus once more on shutdown
pub async fn run_autosave<S>(
    state: SharedLoop,
    mut store: S,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> S
where
    S: SnapshotStore + Send,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(err) = lock(&state).save(&mut store) {
                    tracing::warn!("Autosave failed: {}", err);
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    if let Err(err) = lock(&state).save(&mut store) {
        tracing::warn!("Final save failed: {}", err);
    }
    store
}

/// Frame and autosave tasks running for one shared scheduler
pub struct LoopRuntime<S> {
    shutdown: watch::Sender<bool>,
    frames: JoinHandle<()>,
    autosave: JoinHandle<S>,
}

impl<S> LoopRuntime<S>
where
    S: SnapshotStore + Send + 'static,
{
    /// Spawn both tasks; must be called from inside a tokio runtime
    pub fn spawn(state: SharedLoop, frames: TimerFrames, store: S, frame_period: Duration) -> Self {
        let autosave_period = lock(&state).config().autosave_interval();
        let (shutdown, receiver) = watch::channel(false);
        let frames = tokio::spawn(run_frames(
            Arc::clone(&state),
            frames,
            frame_period,
            receiver.clone(),
        ));
        let autosave = tokio::spawn(run_autosave(state, store, autosave_period, receiver));
        Self {
            shutdown,
            frames,
            autosave,
        }
    }

    /// Stop both tasks and hand back the store after its final save
    pub async fn shutdown(self) -> Option<S> {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.frames.await {
            tracing::error!("Frame task panicked: {}", err);
        }
        match self.autosave.await {
            Ok(store) => Some(store),
            Err(err) => {
                tracing::error!("Autosave task panicked: {}", err);
                None
            }
        }
    }
}
