//! Triggered program: one breath per console line, heartbeat throughout.
//!
//! Single-threaded.  Every `tick_ms` the [`Scheduler`] fires three tasks in
//! slot order:
//!
//! | Slot | Task          | Action                                         |
//! |------|---------------|------------------------------------------------|
//! | 0    | `TriggerPoll` | read a console line, arm breathing             |
//! | 1    | `Breath`      | run (or advance) the armed breath cycle        |
//! | 2    | `Heartbeat`   | re-evaluate the lub-dub output                 |
//!
//! Under [`BreathScheduling::Blocking`] the breath task runs the whole
//! cycle inline, so the console and heartbeat stall until it ends.  Under
//! [`BreathScheduling::Interleaved`] it issues only the steps that are due,
//! and the trigger task leaves console lines unread until the cycle ends.
//! Either way each line yields exactly one breath.
//!
//! There is no graceful shutdown here: a Ctrl-C is reported and ignored.

use embedded_hal::delay::DelayNs;
use log::warn;

use crate::adapters::hardware::PropHardware;
use crate::app::events::AppEvent;
use crate::app::ports::{
    ClockPort, ConsolePort, EventSink, PulsePort, SchedulerDelegate, ServoPort, TaskKind,
};
use crate::config::{BreathScheduling, PropConfig, RunMode};
use crate::control::breath::{BreathController, BreathProfile, BreathTask};
use crate::control::heartbeat::{HeartbeatController, HeartbeatTiming};
use crate::control::trigger::LineTrigger;
use crate::error::{ActuatorError, ConfigError, Error};
use crate::scheduler::{Scheduler, TaskSpec};
use crate::signals::BreathArm;

/// Breath execution under the configured policy.
#[derive(Debug, Clone)]
enum BreathRunner {
    Blocking(BreathController),
    Interleaved(BreathTask),
}

pub struct TriggeredRunner {
    scheduler: Scheduler,
    trigger: LineTrigger,
    arm: BreathArm,
    breath: BreathRunner,
    heartbeat: Option<HeartbeatController>,
    tick_ms: u32,
    last_tick_ms: u32,
    interrupt_seen: bool,
}

impl TriggeredRunner {
    pub fn new(config: &PropConfig, now_ms: u32) -> Result<Self, ConfigError> {
        let profile = BreathProfile::from_config(config)?;
        let breath = match config.breath.scheduling {
            BreathScheduling::Blocking => BreathRunner::Blocking(BreathController::new(profile)),
            BreathScheduling::Interleaved => BreathRunner::Interleaved(BreathTask::new(profile)),
        };
        let heartbeat = config
            .heartbeat
            .enabled
            .then(|| HeartbeatController::new(HeartbeatTiming::from_config(config), now_ms));

        let tick_ms = config.trigger.tick_ms;
        let mut scheduler = Scheduler::new();
        for (label, kind, enabled) in [
            ("trigger", TaskKind::TriggerPoll, true),
            ("breath", TaskKind::Breath, true),
            ("heartbeat", TaskKind::Heartbeat, heartbeat.is_some()),
        ] {
            scheduler.add(TaskSpec {
                label,
                kind,
                period_ms: tick_ms,
                enabled,
            });
        }

        Ok(Self {
            scheduler,
            trigger: LineTrigger::new(config.trigger.idle_notice_ms, now_ms),
            arm: BreathArm::new(),
            breath,
            heartbeat,
            tick_ms,
            last_tick_ms: now_ms,
            interrupt_seen: false,
        })
    }

    /// `true` while a breath cycle is armed and not yet finished.
    pub fn breath_armed(&self) -> bool {
        self.arm.is_armed()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Announce the program and park the heartbeat output if disabled.
    pub fn start<S, P, C, K, D>(
        &mut self,
        hw: &mut PropHardware<S, P, C, K, D>,
        sink: &mut impl EventSink,
    ) -> Result<(), Error>
    where
        P: PulsePort,
    {
        sink.emit(&AppEvent::Started(RunMode::Triggered));
        if self.heartbeat.is_none() {
            hw.parts_mut().pulse.set_active(false)?;
            sink.emit(&AppEvent::HeartbeatDisabled);
        }
        Ok(())
    }

    /// One pass of the loop: fire due tasks, then sleep `tick_ms`.
    pub fn tick<S, P, C, K, D>(
        &mut self,
        hw: &mut PropHardware<S, P, C, K, D>,
        sink: &mut impl EventSink,
    ) -> Result<(), Error>
    where
        S: ServoPort,
        P: PulsePort,
        C: ConsolePort,
        K: ClockPort,
        D: DelayNs,
    {
        let parts = hw.parts_mut();
        let now = parts.clock.now_ms();
        let delta = now.wrapping_sub(self.last_tick_ms);
        self.last_tick_ms = now;

        if !self.interrupt_seen && parts.console.interrupt_requested() {
            self.interrupt_seen = true;
            sink.emit(&AppEvent::InterruptReceived);
            warn!("triggered: interrupt ignored, this program has no shutdown path");
        }

        let mut dispatch = Dispatch {
            trigger: &mut self.trigger,
            arm: &self.arm,
            breath: &mut self.breath,
            heartbeat: self.heartbeat.as_mut(),
            servo: parts.servo,
            pulse: parts.pulse,
            console: parts.console,
            clock: parts.clock,
            delay: &mut *parts.delay,
            sink,
            fault: None,
        };
        self.scheduler.tick(delta, now, &mut dispatch);
        if let Some(e) = dispatch.fault {
            return Err(e.into());
        }

        parts.delay.delay_ms(self.tick_ms);
        Ok(())
    }

    /// Start, then tick until an actuator fails.
    pub fn run<S, P, C, K, D>(
        &mut self,
        hw: &mut PropHardware<S, P, C, K, D>,
        sink: &mut impl EventSink,
    ) -> Result<(), Error>
    where
        S: ServoPort,
        P: PulsePort,
        C: ConsolePort,
        K: ClockPort,
        D: DelayNs,
    {
        self.start(hw, sink)?;
        loop {
            self.tick(hw, sink)?;
        }
    }
}

// ── Scheduler delegate ────────────────────────────────────────
//
// Borrows the runner's tasks and the hardware for the length of one tick.
// `on_task_due` cannot return an error, so the first actuator fault is
// parked in `fault` and later tasks of the tick are skipped.

struct Dispatch<'a, S, P, C, K, D, E> {
    trigger: &'a mut LineTrigger,
    arm: &'a BreathArm,
    breath: &'a mut BreathRunner,
    heartbeat: Option<&'a mut HeartbeatController>,
    servo: &'a mut S,
    pulse: &'a mut P,
    console: &'a mut C,
    clock: &'a K,
    delay: &'a mut D,
    sink: &'a mut E,
    fault: Option<ActuatorError>,
}

impl<S, P, C, K, D, E> Dispatch<'_, S, P, C, K, D, E>
where
    S: ServoPort,
    P: PulsePort,
    C: ConsolePort,
    K: ClockPort,
    D: DelayNs,
    E: EventSink,
{
    fn run_task(&mut self, task: TaskKind, now_ms: u32) -> Result<(), ActuatorError> {
        match task {
            TaskKind::TriggerPoll => {
                // Lines that arrive mid-cycle stay queued in the console
                // and arm the next cycle once this one ends.
                if matches!(&*self.breath, BreathRunner::Interleaved(task) if task.is_running()) {
                    return Ok(());
                }
                self.trigger.poll(self.console, now_ms, self.arm, self.sink);
            }
            TaskKind::Breath => match self.breath {
                BreathRunner::Blocking(controller) => {
                    if self.arm.is_armed() {
                        controller.run_cycle(self.servo, self.delay, None, self.sink)?;
                        self.arm.disarm();
                    }
                }
                BreathRunner::Interleaved(task) => {
                    task.poll(now_ms, self.arm, self.servo, self.sink)?;
                }
            },
            TaskKind::Heartbeat => {
                if let Some(hb) = self.heartbeat.as_deref_mut() {
                    // Fresh reading: a blocking breath may have run since
                    // the tick started.
                    hb.tick(self.clock.now_ms(), self.pulse, self.sink)?;
                }
            }
        }
        Ok(())
    }
}

impl<S, P, C, K, D, E> SchedulerDelegate for Dispatch<'_, S, P, C, K, D, E>
where
    S: ServoPort,
    P: PulsePort,
    C: ConsolePort,
    K: ClockPort,
    D: DelayNs,
    E: EventSink,
{
    fn on_task_due(&mut self, task: TaskKind, now_ms: u32) {
        if self.fault.is_some() {
            return;
        }
        if let Err(e) = self.run_task(task, now_ms) {
            warn!("triggered: {:?} task failed: {}", task, e);
            self.fault = Some(e);
        }
    }
}
