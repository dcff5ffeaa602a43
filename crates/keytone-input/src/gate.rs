//! Listen gate
//!
//! A two-state Paused/Active gate the device read loop checks once per
//! iteration before its blocking read. Built as a park/signal primitive
//! (mutex-guarded flag plus condvar), not an exclusive lock: `pause` and
//! `resume` may be called from any thread, in any order, idempotently.
//!
//! The gate starts Paused. Pausing a gate that is never resumed keeps the
//! loop parked indefinitely; that is the caller's obligation, not a
//! detected error. The gate does not own the device resource.

use std::sync::{Condvar, Mutex, PoisonError};

/// Pause/resume control for the device read loop
#[derive(Debug)]
pub struct ListenGate {
    paused: Mutex<bool>,
    resumed: Condvar,
}

impl ListenGate {
    /// Create a gate in the Paused state
    pub fn new() -> Self {
        Self {
            paused: Mutex::new(true),
            resumed: Condvar::new(),
        }
    }

    /// Switch to Active and wake all parked loops. Idempotent.
    pub fn resume(&self) {
        let mut paused = self.paused.lock().unwrap_or_else(PoisonError::into_inner);
        *paused = false;
        self.resumed.notify_all();
    }

    /// Switch to Paused; the loop parks before its next read. Idempotent.
    pub fn pause(&self) {
        let mut paused = self.paused.lock().unwrap_or_else(PoisonError::into_inner);
        *paused = true;
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Park the calling thread until the gate is Active
    ///
    /// Returns immediately if already Active. Spurious wakeups re-check the
    /// state and park again.
    pub fn wait_until_active(&self) {
        let mut paused = self.paused.lock().unwrap_or_else(PoisonError::into_inner);
        while *paused {
            paused = self
                .resumed
                .wait(paused)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Default for ListenGate {
    fn default() -> Self {
        Self::new()
    }
}
