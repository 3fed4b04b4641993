//! Mock hardware adapters for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO/PWM registers.  Recorders share
//! their history through `Arc<Mutex<..>>` so a clone can be moved into the
//! breathing worker thread while the test keeps a handle.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use breathbeat::app::events::AppEvent;
use breathbeat::app::ports::{ClockPort, ConsolePort, EventSink, Line, PulsePort, ServoPort};
use breathbeat::error::ActuatorError;
use breathbeat::signals::StopSignal;
use embedded_hal::delay::DelayNs;

// ── Servo ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockServo {
    pub writes: Arc<Mutex<Vec<f32>>>,
    /// Fail every write once this many have succeeded.
    pub fail_after: Option<usize>,
    /// Request this stop signal right after the given write count.
    pub stop_after: Option<(usize, StopSignal)>,
}

#[allow(dead_code)]
impl MockServo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }

    pub fn stopping_after(n: usize, stop: StopSignal) -> Self {
        Self {
            stop_after: Some((n, stop)),
            ..Self::default()
        }
    }

    pub fn history(&self) -> Vec<f32> {
        self.writes.lock().unwrap().clone()
    }
}

impl ServoPort for MockServo {
    fn write_angle(&mut self, degrees: f32) -> Result<(), ActuatorError> {
        let mut writes = self.writes.lock().unwrap();
        if self.fail_after.is_some_and(|n| writes.len() >= n) {
            return Err(ActuatorError::PwmWriteFailed);
        }
        writes.push(degrees);
        if let Some((n, stop)) = &self.stop_after {
            if writes.len() == *n {
                stop.request();
            }
        }
        Ok(())
    }
}

// ── Heartbeat output ──────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockPulse {
    pub levels: Vec<bool>,
}

#[allow(dead_code)]
impl MockPulse {
    pub fn is_active(&self) -> bool {
        self.levels.last().copied().unwrap_or(false)
    }
}

impl PulsePort for MockPulse {
    fn set_active(&mut self, active: bool) -> Result<(), ActuatorError> {
        self.levels.push(active);
        Ok(())
    }
}

// ── Simulated time ────────────────────────────────────────────

/// Manually advanced clock, shared between the delay and the console.
#[derive(Clone, Default)]
pub struct SimClock(Rc<Cell<u32>>);

#[allow(dead_code)]
impl SimClock {
    pub fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

impl ClockPort for SimClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}

/// Delay that advances a [`SimClock`] instead of sleeping.
pub struct SimDelay(pub SimClock);

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.advance(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.advance(ms);
    }
}

// ── Console ───────────────────────────────────────────────────

/// Lines that become readable once the clock reaches their timestamp.
#[allow(dead_code)]
pub struct ScriptedConsole {
    clock: SimClock,
    script: VecDeque<(u32, Line)>,
    interrupt_at: Option<u32>,
}

#[allow(dead_code)]
impl ScriptedConsole {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            script: VecDeque::new(),
            interrupt_at: None,
        }
    }

    pub fn line_at(mut self, at_ms: u32, text: &str) -> Self {
        let mut line = Line::new();
        line.push_str(text).unwrap();
        self.script.push_back((at_ms, line));
        self
    }

    pub fn interrupt_at(mut self, at_ms: u32) -> Self {
        self.interrupt_at = Some(at_ms);
        self
    }
}

impl ConsolePort for ScriptedConsole {
    fn line_available(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.script.front().is_some_and(|(at, _)| *at <= now)
    }

    fn read_line(&mut self) -> Option<Line> {
        if self.line_available() {
            self.script.pop_front().map(|(_, line)| line)
        } else {
            None
        }
    }

    fn interrupt_requested(&mut self) -> bool {
        self.interrupt_at.is_some_and(|at| self.clock.now_ms() >= at)
    }
}

/// Console that raises the interrupt after a number of polls.
pub struct InterruptAfter {
    pub polls_left: usize,
}

impl ConsolePort for InterruptAfter {
    fn line_available(&mut self) -> bool {
        false
    }

    fn read_line(&mut self) -> Option<Line> {
        None
    }

    fn interrupt_requested(&mut self) -> bool {
        if self.polls_left == 0 {
            return true;
        }
        self.polls_left -= 1;
        false
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct EventLog(pub Arc<Mutex<Vec<AppEvent>>>);

#[allow(dead_code)]
impl EventLog {
    pub fn events(&self) -> Vec<AppEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}
