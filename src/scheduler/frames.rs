//! Frame scheduling seam
//!
//! The host owns the display-frame source. The scheduler asks for one frame
//! at a time and the host later calls back with the handle it was given.

use crate::core::types::FrameHandle;
use std::sync::{Arc, Mutex};

pub trait FrameScheduler {
    /// Ask for a callback on the next frame
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request; unknown or already-fired handles are ignored
    fn cancel_frame(&mut self, handle: FrameHandle);
}

impl<T: FrameScheduler> FrameScheduler for Arc<Mutex<T>> {
    fn request_frame(&mut self) -> FrameHandle {
        self.lock().unwrap_or_else(|e| e.into_inner()).request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.lock().unwrap_or_else(|e| e.into_inner()).cancel_frame(handle)
    }
}

/// Frame source driven by hand, for tests and headless hosts
///
/// Clones share the same queue so the host can keep one clone and hand
/// another to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualFrames {
    inner: Arc<Mutex<ManualInner>>,
}

#[derive(Debug, Default)]
struct ManualInner {
    next_id: u64,
    pending: Vec<FrameHandle>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles requested and not yet fired or cancelled
    pub fn pending(&self) -> Vec<FrameHandle> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).pending.clone()
    }

    /// Pop the oldest outstanding handle so the host can fire it
    pub fn take_next(&self) -> Option<FrameHandle> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.pending.is_empty() {
            None
        } else {
            Some(inner.pending.remove(0))
        }
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&mut self) -> FrameHandle {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.next_id += 1;
        let handle = FrameHandle(inner.next_id);
        inner.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pending
            .retain(|pending| *pending != handle);
    }
}
