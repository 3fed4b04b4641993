//! Continuous program: breathe forever, beat the heart until interrupted.
//!
//! ```text
//!  main task                          breath worker (APP core)
//!  ─────────                          ────────────────────────
//!  spawn worker ───────────────────▶  run_continuous(servo)
//!  loop every loop_delay_ms:             │  checks stop before
//!    Ctrl-C?  ──▶ stop.request() ─────▶  │  every sweep step
//!    heartbeat.tick()                    ▼
//!  wait shutdown_grace_ms            returns servo
//!  join ◀──────────────────────────────────┘
//!  servo → neutral, motor off
//! ```
//!
//! The worker owns the servo while it runs and hands it back through the
//! join so the main task can park it.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{ClockPort, ConsolePort, EventSink, PulsePort, ServoPort};
use crate::config::{PropConfig, RunMode};
use crate::control::breath::{BreathController, BreathProfile};
use crate::control::heartbeat::{HeartbeatController, HeartbeatTiming};
use crate::drivers::task_pin::{self, Core};
use crate::error::{ActuatorError, ConfigError, Error};
use crate::signals::StopSignal;

const WORKER_PRIORITY: u8 = 5;
const WORKER_STACK_KB: usize = 16;

/// Why the main loop stopped.
enum LoopExit {
    Interrupted,
    WorkerExited,
    HeartbeatFault(ActuatorError),
}

/// Runs the continuous program against any set of ports.
#[derive(Debug, Clone)]
pub struct ContinuousRunner {
    breath: BreathController,
    heartbeat: Option<HeartbeatTiming>,
    loop_delay_ms: u32,
    shutdown_grace_ms: u32,
    neutral_angle: f32,
}

impl ContinuousRunner {
    pub fn new(config: &PropConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            breath: BreathController::new(BreathProfile::from_config(config)?),
            heartbeat: config
                .heartbeat
                .enabled
                .then(|| HeartbeatTiming::from_config(config)),
            loop_delay_ms: config.heartbeat.loop_delay_ms,
            shutdown_grace_ms: config.shutdown_grace_ms,
            neutral_angle: config.breath.neutral_angle,
        })
    }

    /// Run until the console interrupt arrives or the worker fails.
    ///
    /// `delay` is cloned into the worker thread; `sink` likewise.  Returns
    /// `Ok(())` after a graceful shutdown with the servo at the neutral
    /// angle and the heartbeat output inactive.
    pub fn run<S, P, C, K, D, E>(
        &self,
        servo: S,
        pulse: &mut P,
        console: &mut C,
        clock: &K,
        delay: &mut D,
        sink: &mut E,
    ) -> Result<(), Error>
    where
        S: ServoPort + Send + 'static,
        P: PulsePort,
        C: ConsolePort,
        K: ClockPort,
        D: DelayNs + Clone + Send + 'static,
        E: EventSink + Clone + Send + 'static,
    {
        sink.emit(&AppEvent::Started(RunMode::Continuous));

        let stop = StopSignal::new();
        let worker = {
            let breath = self.breath;
            let stop = stop.clone();
            let mut delay = delay.clone();
            let mut sink = sink.clone();
            let mut servo = servo;
            task_pin::spawn_on_core(
                Core::App,
                WORKER_PRIORITY,
                WORKER_STACK_KB,
                "breath\0",
                move || {
                    let result = breath.run_continuous(&mut servo, &mut delay, &stop, &mut sink);
                    (servo, result)
                },
            )
            .map_err(|e| {
                warn!("continuous: worker spawn failed: {}", e);
                Error::Init("breath worker spawn")
            })?
        };

        let mut heartbeat = match self.heartbeat {
            Some(timing) => Some(HeartbeatController::new(timing, clock.now_ms())),
            None => {
                pulse.set_active(false)?;
                sink.emit(&AppEvent::HeartbeatDisabled);
                None
            }
        };

        let exit = loop {
            if console.interrupt_requested() {
                sink.emit(&AppEvent::InterruptReceived);
                break LoopExit::Interrupted;
            }
            if worker.is_finished() {
                break LoopExit::WorkerExited;
            }
            if let Some(hb) = heartbeat.as_mut() {
                if let Err(e) = hb.tick(clock.now_ms(), pulse, sink) {
                    break LoopExit::HeartbeatFault(e);
                }
            }
            delay.delay_ms(self.loop_delay_ms);
        };

        stop.request();
        if !matches!(exit, LoopExit::WorkerExited) {
            info!("continuous: waiting {} ms for breath worker", self.shutdown_grace_ms);
            delay.delay_ms(self.shutdown_grace_ms);
        }
        let (mut servo, worker_result) = worker
            .join()
            .map_err(|_| Error::Worker("breath worker panicked"))?;

        if let LoopExit::HeartbeatFault(e) = exit {
            return Err(e.into());
        }
        if let Err(e) = worker_result {
            warn!("continuous: breath worker failed: {}", e);
            // Motor off before bailing; the servo is already faulted.
            let _ = pulse.set_active(false);
            return Err(e.into());
        }

        servo.write_angle(self.neutral_angle)?;
        pulse.set_active(false)?;
        sink.emit(&AppEvent::ShutdownComplete {
            neutral_angle: self.neutral_angle,
        });
        Ok(())
    }
}
