//! Outbound application events.
//!
//! Controllers and runners emit these through the
//! [`EventSink`](super::ports::EventSink) port in place of ad-hoc prints.
//! Adapters on the other side decide what to do with them.

use crate::config::RunMode;
use crate::control::breath::{BreathOutcome, BreathPhase};
use crate::control::heartbeat::HeartbeatPhase;

/// Structured events emitted by the control loops.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A runner has started.
    Started(RunMode),

    /// The breath plan entered a new phase.
    BreathPhaseChanged(BreathPhase),

    /// One servo step of a sweep was commanded.
    ServoStep {
        phase: BreathPhase,
        step: u32,
        angle: f32,
    },

    /// A breath cycle finished or was cut short.
    BreathCycleEnded(BreathOutcome),

    /// The heartbeat output changed phase.
    HeartbeatPhaseChanged(HeartbeatPhase),

    /// The heartbeat controller is disabled by config.
    HeartbeatDisabled,

    /// A console line armed one breath cycle.
    BreathArmed,

    /// No console input for the idle-notice interval.
    AwaitingTrigger,

    /// An operator interrupt was received.
    InterruptReceived,

    /// Graceful shutdown finished; servo parked at `neutral_angle`.
    ShutdownComplete { neutral_angle: f32 },

    /// Calibration angle written.
    Calibrated { angle: f32 },
}
