//! Round timer lifecycle
//!
//! A backend schedules a repeating callback and hands back a handle.
//! `RoundTimer` owns that handle and cancels it when dropped, so whatever
//! path takes the session out of play (game over, reset, teardown) also
//! stops the timer.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Cancels one scheduled repeating task
pub trait TimerHandle {
    fn cancel(&mut self);
}

/// Schedules the repeating round-timer callback
pub trait TimerBackend {
    type Handle: TimerHandle;

    fn schedule(&mut self, interval_ms: u32) -> Self::Handle;
}

/// Scoped ownership of a scheduled timer
pub struct RoundTimer<H: TimerHandle> {
    handle: H,
    interval_ms: u32,
}

impl<H: TimerHandle> RoundTimer<H> {
    pub fn start<B: TimerBackend<Handle = H>>(backend: &mut B, interval_ms: u32) -> Self {
        log::debug!("Round timer started ({}ms)", interval_ms);
        Self {
            handle: backend.schedule(interval_ms),
            interval_ms,
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}

impl<H: TimerHandle> Drop for RoundTimer<H> {
    fn drop(&mut self) {
        self.handle.cancel();
        log::debug!("Round timer cancelled");
    }
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: u32,
    /// Live schedules: id -> interval
    active: BTreeMap<u32, u32>,
}

/// In-process backend driven by the caller's own loop (native and tests)
#[derive(Debug, Clone, Default)]
pub struct ManualTimers {
    state: Rc<RefCell<ManualState>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of schedules that have not been cancelled
    pub fn active_count(&self) -> usize {
        self.state.borrow().active.len()
    }

    /// Interval of the first live schedule, if any
    pub fn active_interval(&self) -> Option<u32> {
        self.state.borrow().active.values().next().copied()
    }
}

impl TimerBackend for ManualTimers {
    type Handle = ManualHandle;

    fn schedule(&mut self, interval_ms: u32) -> ManualHandle {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.active.insert(id, interval_ms);
        ManualHandle {
            id,
            state: Rc::clone(&self.state),
        }
    }
}

pub struct ManualHandle {
    id: u32,
    state: Rc<RefCell<ManualState>>,
}

impl TimerHandle for ManualHandle {
    fn cancel(&mut self) {
        self.state.borrow_mut().active.remove(&self.id);
    }
}
