//! Breathing cycle controller.
//!
//! One breath is a fixed plan of servo commands:
//!
//! ```text
//!  angle
//!   end ┤        ╭──────╮
//!       │      ╱          ╲
//!       │    ╱              ╲
//! start ┤───╯                ╰──────
//!       └──┬────────┬──────┬────────┬──▶ t
//!        Inhale   Pause  Exhale   Pause
//!        (cubic)         (sine)
//! ```
//!
//! [`BreathStepper`] yields that plan step by step.  It is consumed either
//! blocking ([`BreathController`], which sleeps between steps) or
//! cooperatively ([`BreathTask`], which issues whatever steps have fallen
//! due each time it is polled).

use embedded_hal::delay::DelayNs;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, ServoPort};
use crate::config::PropConfig;
use crate::control::easing::Easing;
use crate::error::{ActuatorError, ConfigError};
use crate::signals::{BreathArm, StopSignal};

/// Phase of one breath cycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathPhase {
    Inhale,
    PauseAfterInhale,
    Exhale,
    PauseAfterExhale,
}

impl BreathPhase {
    /// Curve used by a sweep phase; `None` for pauses.
    pub fn easing(self) -> Option<Easing> {
        match self {
            Self::Inhale => Some(Easing::Cubic),
            Self::Exhale => Some(Easing::Sine),
            Self::PauseAfterInhale | Self::PauseAfterExhale => None,
        }
    }

    /// The phase that follows this one (wraps to `Inhale`).
    pub fn next(self) -> Self {
        match self {
            Self::Inhale => Self::PauseAfterInhale,
            Self::PauseAfterInhale => Self::Exhale,
            Self::Exhale => Self::PauseAfterExhale,
            Self::PauseAfterExhale => Self::Inhale,
        }
    }
}

/// How a breath cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathOutcome {
    Completed,
    /// The stop signal was observed before a sweep step.
    Stopped,
}

/// Geometry and timing of one breath.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathProfile {
    start_angle: f32,
    end_angle: f32,
    breath_duration_ms: u32,
    pause_duration_ms: u32,
    steps: u32,
}

impl BreathProfile {
    /// `steps` must be at least 2: sample times are spaced by
    /// `breath_duration / (steps - 1)`.
    pub fn new(
        start_angle: f32,
        end_angle: f32,
        breath_duration_ms: u32,
        pause_duration_ms: u32,
        steps: u32,
    ) -> Result<Self, ConfigError> {
        if steps < 2 {
            return Err(ConfigError::ValidationFailed("breath.steps must be >= 2"));
        }
        Ok(Self {
            start_angle,
            end_angle,
            breath_duration_ms,
            pause_duration_ms,
            steps,
        })
    }

    pub fn from_config(config: &PropConfig) -> Result<Self, ConfigError> {
        let b = &config.breath;
        Self::new(
            b.rest_angle,
            config.inhale_angle(),
            b.breath_duration_ms,
            b.pause_duration_ms,
            b.steps,
        )
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Sleep between two sweep steps.
    pub fn step_hold_ms(&self) -> u32 {
        self.breath_duration_ms / self.steps
    }

    /// Commanded angle for `step` of a sweep phase, truncated to whole
    /// degrees.  Pauses hold the angle of the preceding sweep's end.
    pub fn angle_at(&self, phase: BreathPhase, step: u32) -> f32 {
        let duration = self.breath_duration_ms as f32;
        let t = step as f32 * duration / (self.steps - 1) as f32;
        let angle = match phase {
            BreathPhase::Inhale => Easing::Cubic.apply(t, self.start_angle, self.end_angle, duration),
            BreathPhase::Exhale => Easing::Sine.apply(t, self.end_angle, self.start_angle, duration),
            BreathPhase::PauseAfterInhale => self.end_angle,
            BreathPhase::PauseAfterExhale => self.start_angle,
        };
        angle.trunc()
    }
}

/// One entry of the breath plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathStep {
    pub phase: BreathPhase,
    /// Position within the sweep (always 0 for pauses).
    pub index: u32,
    /// Servo command, `None` for pauses.
    pub angle: Option<f32>,
    /// Time to hold before the next step.
    pub hold_ms: u32,
}

/// Iterator over the `2 * steps + 2` entries of one breath.
#[derive(Debug, Clone)]
pub struct BreathStepper {
    profile: BreathProfile,
    phase: BreathPhase,
    index: u32,
    finished: bool,
}

impl BreathStepper {
    pub fn new(profile: BreathProfile) -> Self {
        Self {
            profile,
            phase: BreathPhase::Inhale,
            index: 0,
            finished: false,
        }
    }

    fn advance_phase(&mut self) {
        self.index = 0;
        if self.phase == BreathPhase::PauseAfterExhale {
            self.finished = true;
        } else {
            self.phase = self.phase.next();
        }
    }
}

impl Iterator for BreathStepper {
    type Item = BreathStep;

    fn next(&mut self) -> Option<BreathStep> {
        if self.finished {
            return None;
        }
        let phase = self.phase;
        if phase.easing().is_some() {
            let step = BreathStep {
                phase,
                index: self.index,
                angle: Some(self.profile.angle_at(phase, self.index)),
                hold_ms: self.profile.step_hold_ms(),
            };
            self.index += 1;
            if self.index == self.profile.steps {
                self.advance_phase();
            }
            Some(step)
        } else {
            let step = BreathStep {
                phase,
                index: 0,
                angle: None,
                hold_ms: self.profile.pause_duration_ms,
            };
            self.advance_phase();
            Some(step)
        }
    }
}

/// Issue one plan entry: report phase changes, command the servo for moves.
fn issue_step(
    step: &BreathStep,
    last_phase: &mut Option<BreathPhase>,
    servo: &mut impl ServoPort,
    sink: &mut impl EventSink,
) -> Result<(), ActuatorError> {
    if *last_phase != Some(step.phase) {
        *last_phase = Some(step.phase);
        sink.emit(&AppEvent::BreathPhaseChanged(step.phase));
    }
    if let Some(angle) = step.angle {
        servo.write_angle(angle)?;
        sink.emit(&AppEvent::ServoStep {
            phase: step.phase,
            step: step.index,
            angle,
        });
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
//  Blocking controller
// ═══════════════════════════════════════════════════════════════

/// Runs breath cycles inline, sleeping between steps.
#[derive(Debug, Clone, Copy)]
pub struct BreathController {
    profile: BreathProfile,
}

impl BreathController {
    pub fn new(profile: BreathProfile) -> Self {
        Self { profile }
    }

    /// Run one full cycle.
    ///
    /// With a stop signal, it is checked before every sweep step (never
    /// during a pause) and the cycle returns [`BreathOutcome::Stopped`] as
    /// soon as it is seen.  The servo is left where it is.
    pub fn run_cycle(
        &self,
        servo: &mut impl ServoPort,
        delay: &mut impl DelayNs,
        stop: Option<&StopSignal>,
        sink: &mut impl EventSink,
    ) -> Result<BreathOutcome, ActuatorError> {
        let mut last_phase = None;
        for step in BreathStepper::new(self.profile) {
            if step.angle.is_some() && stop.is_some_and(StopSignal::is_requested) {
                sink.emit(&AppEvent::BreathCycleEnded(BreathOutcome::Stopped));
                return Ok(BreathOutcome::Stopped);
            }
            issue_step(&step, &mut last_phase, servo, sink)?;
            delay.delay_ms(step.hold_ms);
        }
        sink.emit(&AppEvent::BreathCycleEnded(BreathOutcome::Completed));
        Ok(BreathOutcome::Completed)
    }

    /// Breathe until `stop` is requested.
    pub fn run_continuous(
        &self,
        servo: &mut impl ServoPort,
        delay: &mut impl DelayNs,
        stop: &StopSignal,
        sink: &mut impl EventSink,
    ) -> Result<(), ActuatorError> {
        while !stop.is_requested() {
            if self.run_cycle(servo, delay, Some(stop), sink)? == BreathOutcome::Stopped {
                break;
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Cooperative task
// ═══════════════════════════════════════════════════════════════

/// Breath cycle advanced by a fixed-tick loop instead of sleeping.
///
/// Starts a cycle on the first poll that sees the arm flag set, and
/// disarms it once the final pause has elapsed.
#[derive(Debug, Clone)]
pub struct BreathTask {
    profile: BreathProfile,
    stepper: Option<BreathStepper>,
    due_ms: u32,
    last_phase: Option<BreathPhase>,
}

impl BreathTask {
    pub fn new(profile: BreathProfile) -> Self {
        Self {
            profile,
            stepper: None,
            due_ms: 0,
            last_phase: None,
        }
    }

    /// `true` while a cycle is in progress.
    pub fn is_running(&self) -> bool {
        self.stepper.is_some()
    }

    /// Issue every step that is due at `now_ms`.
    pub fn poll(
        &mut self,
        now_ms: u32,
        arm: &BreathArm,
        servo: &mut impl ServoPort,
        sink: &mut impl EventSink,
    ) -> Result<(), ActuatorError> {
        if self.stepper.is_none() {
            if !arm.is_armed() {
                return Ok(());
            }
            self.stepper = Some(BreathStepper::new(self.profile));
            self.due_ms = now_ms;
            self.last_phase = None;
        }

        // Signed distance keeps the comparison valid across u32 wrap.
        while (now_ms.wrapping_sub(self.due_ms) as i32) >= 0 {
            let Some(stepper) = self.stepper.as_mut() else {
                break;
            };
            match stepper.next() {
                Some(step) => {
                    issue_step(&step, &mut self.last_phase, servo, sink)?;
                    self.due_ms = self.due_ms.wrapping_add(step.hold_ms);
                }
                None => {
                    self.stepper = None;
                    arm.disarm();
                    sink.emit(&AppEvent::BreathCycleEnded(BreathOutcome::Completed));
                }
            }
        }
        Ok(())
    }
}
