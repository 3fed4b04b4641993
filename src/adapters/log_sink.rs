//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the `log`
//! facade (ESP-IDF logger on the device, whatever the host installs in
//! tests).  Per-step servo angles and heartbeat phase changes are chatty
//! and only logged when `verbose` is set.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Clone, Copy)]
pub struct LogEventSink {
    verbose: bool,
}

impl LogEventSink {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(mode) => {
                info!("START | mode={:?}", mode);
            }
            AppEvent::BreathPhaseChanged(phase) => {
                info!("BREATH | phase={:?}", phase);
            }
            AppEvent::ServoStep { phase, step, angle } => {
                if self.verbose {
                    debug!("BREATH | {:?} step={} angle={:.0}", phase, step, angle);
                }
            }
            AppEvent::BreathCycleEnded(outcome) => {
                info!("BREATH | cycle {:?}", outcome);
            }
            AppEvent::HeartbeatPhaseChanged(phase) => {
                if self.verbose {
                    debug!("HEART | {:?}", phase);
                }
            }
            AppEvent::HeartbeatDisabled => {
                info!("HEART | disabled");
            }
            AppEvent::BreathArmed => {
                info!("TRIG | line received, breath armed");
            }
            AppEvent::AwaitingTrigger => {
                info!("TRIG | waiting for input");
            }
            AppEvent::InterruptReceived => {
                warn!("TRIG | interrupt received");
            }
            AppEvent::ShutdownComplete { neutral_angle } => {
                info!("STOP | worker stopped, servo parked at {:.0}°", neutral_angle);
            }
            AppEvent::Calibrated { angle } => {
                info!("CAL | servo set to {:.0}°", angle);
            }
        }
    }
}
