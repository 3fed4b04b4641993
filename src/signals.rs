//! Shared flags between the control loops.
//!
//! The only cross-context state in the firmware.  Each flag has a single
//! writer:
//!
//! | Flag          | Written by                     | Read by              |
//! |---------------|--------------------------------|----------------------|
//! | `StopSignal`  | continuous runner (main loop)  | breathing worker     |
//! | `BreathArm`   | trigger listener (arm),        | breath task          |
//! |               | breath task (disarm)           |                      |
//!
//! Both are plain atomics.  `StopSignal` only ever goes false → true, so
//! the worker polling it at step granularity needs nothing stronger than
//! acquire/release ordering.

use std::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

/// One-shot stop request shared with the breathing worker thread.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the worker to stop.  Idempotent.
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// "Run one breath cycle" flag for the triggered loop.
#[derive(Debug, Default)]
pub struct BreathArm(AtomicBool);

impl BreathArm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn disarm(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
