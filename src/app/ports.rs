//! Port traits: the hexagonal boundary between control logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controllers / Runners (domain)
//! ```
//!
//! Drivers and adapters (servo, heartbeat motor, console, clock, event
//! sinks) implement these traits.  The controllers consume them via
//! generics, so the control loops never touch hardware directly and run
//! unchanged against the mocks in `tests/`.
//!
//! Suspension uses [`embedded_hal::delay::DelayNs`] directly rather than a
//! port of our own.

use crate::error::ActuatorError;

/// Maximum accepted console line length (bytes).
pub const LINE_CAPACITY: usize = 64;

/// One console line, without its terminator.
pub type Line = heapless::String<LINE_CAPACITY>;

// ───────────────────────────────────────────────────────────────
// Servo port (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Positional servo: "set position" is the only capability the domain uses.
pub trait ServoPort {
    /// Command the servo to `degrees`.  Implementations clamp to the
    /// servo's configured range.
    fn write_angle(&mut self, degrees: f32) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Pulse port (domain → heartbeat motor)
// ───────────────────────────────────────────────────────────────

/// Digital output driving the heartbeat motor.
///
/// `active` is the logical state; the adapter owns the electrical
/// polarity.  The domain never reads the pin back.
pub trait PulsePort {
    fn set_active(&mut self, active: bool) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Console port (serial → domain)
// ───────────────────────────────────────────────────────────────

/// Line-oriented, non-blocking text input.
pub trait ConsolePort {
    /// `true` if a complete line can be read without blocking.
    fn line_available(&mut self) -> bool;

    /// Take the next complete line, if any.
    fn read_line(&mut self) -> Option<Line>;

    /// `true` once an operator interrupt (Ctrl-C) has been received.
    /// Latches; never resets.
    fn interrupt_requested(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Wraps at `u32::MAX`; callers take
/// differences with `wrapping_sub`.
pub trait ClockPort {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples the tick scheduler from the tasks)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the [`Scheduler`](crate::scheduler::Scheduler)
/// invokes when a task falls due.
///
/// The triggered runner implements this by dispatching to the trigger
/// listener, breath task, and heartbeat controller; the scheduler itself
/// knows nothing about hardware.
pub trait SchedulerDelegate {
    /// Called when a task's period has elapsed.
    fn on_task_due(&mut self, task: TaskKind, now_ms: u32);
}

/// Discriminant passed to [`SchedulerDelegate::on_task_due`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Poll the console for a re-arm line.
    TriggerPoll,
    /// Advance (or run) the breath cycle.
    Breath,
    /// Re-evaluate the heartbeat output.
    Heartbeat,
}
