//! Heartbeat pulse controller.
//!
//! A "lub-dub" pattern on the vibration motor, derived purely from the time
//! elapsed since the current cycle started.  Re-evaluated every tick; there
//! are no timers or events.
//!
//! ```text
//!  active ┃▇▇▇▇▇┃     ┃▇▇▇▇▇┃
//!         ┃ Lub ┃ Rest┃ Dub ┃        Rest          ┃ (reset)
//!         0    pulse second second+pulse   interval-slack
//! ```
//!
//! The cycle restarts once `elapsed >= interval - slack`.  The slack is the
//! loop delay of the caller, so the real period is only approximate.

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, PulsePort};
use crate::config::PropConfig;
use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatPhase {
    /// First pulse.
    Lub,
    /// Second pulse.  Same length and strength as `Lub`.
    Dub,
    /// Motor off.
    Rest,
}

impl HeartbeatPhase {
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Rest)
    }
}

/// Timing of one heartbeat cycle (all milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatTiming {
    /// Full beat period.
    pub interval_ms: u32,
    /// Offset of the second pulse from the cycle start.
    pub second_beat_at_ms: u32,
    /// Length of each pulse.
    pub pulse_ms: u32,
    /// Subtracted from the interval when deciding to restart the cycle.
    pub slack_ms: u32,
}

impl HeartbeatTiming {
    pub fn from_config(config: &PropConfig) -> Self {
        let h = &config.heartbeat;
        Self {
            interval_ms: config.heartbeat_interval_ms(),
            second_beat_at_ms: h.lub_duration_ms,
            pulse_ms: h.vibrate_duration_ms,
            slack_ms: h.loop_delay_ms,
        }
    }

    /// Phase for a given time since cycle start.
    pub fn phase_at(&self, elapsed_ms: u32) -> HeartbeatPhase {
        if elapsed_ms < self.pulse_ms {
            HeartbeatPhase::Lub
        } else if elapsed_ms >= self.second_beat_at_ms
            && elapsed_ms < self.second_beat_at_ms + self.pulse_ms
        {
            HeartbeatPhase::Dub
        } else {
            HeartbeatPhase::Rest
        }
    }

    /// `true` once the cycle should restart.
    pub fn cycle_expired(&self, elapsed_ms: u32) -> bool {
        elapsed_ms >= self.interval_ms.saturating_sub(self.slack_ms)
    }
}

/// Drives the heartbeat output from a monotonic clock.
#[derive(Debug, Clone)]
pub struct HeartbeatController {
    timing: HeartbeatTiming,
    cycle_start_ms: u32,
    last_phase: Option<HeartbeatPhase>,
}

impl HeartbeatController {
    /// Start the first cycle at `now_ms`.
    pub fn new(timing: HeartbeatTiming, now_ms: u32) -> Self {
        Self {
            timing,
            cycle_start_ms: now_ms,
            last_phase: None,
        }
    }

    /// Evaluate the phase at `now_ms`, drive the output, and restart the
    /// cycle if its interval has run out.
    pub fn tick(
        &mut self,
        now_ms: u32,
        pulse: &mut impl PulsePort,
        sink: &mut impl EventSink,
    ) -> Result<HeartbeatPhase, ActuatorError> {
        let elapsed = now_ms.wrapping_sub(self.cycle_start_ms);
        let phase = self.timing.phase_at(elapsed);
        pulse.set_active(phase.is_active())?;

        if self.last_phase != Some(phase) {
            self.last_phase = Some(phase);
            sink.emit(&AppEvent::HeartbeatPhaseChanged(phase));
        }

        if self.timing.cycle_expired(elapsed) {
            self.cycle_start_ms = now_ms;
        }
        Ok(phase)
    }
}
