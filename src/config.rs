//! Prop configuration parameters
//!
//! All tunable parameters for the breathing servo, heartbeat motor, and
//! console trigger.  Defaults match the shipped prop; a firmware build may
//! override them with a JSON document (see [`PropConfig::from_json`]).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which control program the firmware runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// Breathing runs forever on a worker thread; heartbeat in the main loop.
    Continuous,
    /// One breath per console line; single-threaded cooperative loop.
    Triggered,
    /// Write the calibration angle once and hold.
    Calibrate,
}

/// How the triggered loop runs a breath cycle relative to the other tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreathScheduling {
    /// Run the whole cycle inline.  Heartbeat and console polling stall
    /// for the length of the cycle.
    Blocking,
    /// Issue breath steps as they fall due, one scheduler tick at a time.
    Interleaved,
}

/// Servo hardware parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServoConfig {
    /// Signal pin.
    pub pin: i32,
    /// Pulse width at `min_deg` (microseconds).
    pub min_pulse_us: f32,
    /// Pulse width at `max_deg` (microseconds).
    pub max_pulse_us: f32,
    pub min_deg: f32,
    pub max_deg: f32,
    /// PWM frame rate (Hz).
    pub pwm_frequency_hz: u32,
}

/// Breathing motion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreathConfig {
    /// Servo angle at full exhale (the mechanism's true zero).
    pub rest_angle: f32,
    /// Degrees travelled on inhale.
    pub sweep_deg: f32,
    /// Duration of one inhale or exhale sweep (milliseconds).
    pub breath_duration_ms: u32,
    /// Hold after each sweep (milliseconds).
    pub pause_duration_ms: u32,
    /// Servo commands per sweep.  Must be at least 2.
    pub steps: u32,
    /// Angle the servo parks at on shutdown.
    pub neutral_angle: f32,
    pub scheduling: BreathScheduling,
}

/// Heartbeat motor timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    pub enabled: bool,
    /// Beats per minute.
    pub bpm: u32,
    /// Offset of the second pulse from the cycle start (milliseconds).
    pub lub_duration_ms: u32,
    /// Length of each pulse (milliseconds).
    pub vibrate_duration_ms: u32,
    /// Main-loop period in continuous mode; also the cycle reset slack.
    pub loop_delay_ms: u32,
}

/// Console trigger loop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Cooperative loop period (milliseconds).
    pub tick_ms: u32,
    /// Interval between "waiting for trigger" notices (milliseconds).
    pub idle_notice_ms: u32,
}

/// Core prop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropConfig {
    pub mode: RunMode,
    /// Log every servo step and heartbeat phase change.
    pub debug: bool,
    pub servo: ServoConfig,
    pub breath: BreathConfig,
    pub heartbeat: HeartbeatConfig,
    pub trigger: TriggerConfig,
    /// Time allowed for the breathing worker to observe the stop signal.
    pub shutdown_grace_ms: u32,
    /// Angle written by the calibration mode.
    pub calibration_angle: f32,
}

impl Default for PropConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Continuous,
            debug: true,
            servo: ServoConfig {
                pin: crate::pins::BREATH_SERVO_GPIO,
                min_pulse_us: 500.0,
                max_pulse_us: 2500.0,
                min_deg: 0.0,
                max_deg: 270.0,
                pwm_frequency_hz: 50,
            },
            breath: BreathConfig {
                rest_angle: 140.0,
                sweep_deg: 45.0,
                breath_duration_ms: 2000,
                pause_duration_ms: 500,
                steps: 100,
                neutral_angle: 80.0,
                scheduling: BreathScheduling::Blocking,
            },
            heartbeat: HeartbeatConfig {
                enabled: true,
                bpm: 50, // 90 bpm is the motor's practical ceiling
                lub_duration_ms: 250,
                vibrate_duration_ms: 150,
                loop_delay_ms: 50,
            },
            trigger: TriggerConfig {
                tick_ms: 10,
                idle_notice_ms: 5000,
            },
            shutdown_grace_ms: 1000,
            calibration_angle: 140.0,
        }
    }
}

impl PropConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            log::warn!("config: JSON parse error: {}", e);
            ConfigError::Malformed
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Angle at the top of the inhale.
    pub fn inhale_angle(&self) -> f32 {
        self.breath.rest_angle + self.breath.sweep_deg
    }

    /// Full heartbeat period in milliseconds.
    pub fn heartbeat_interval_ms(&self) -> u32 {
        60_000 / self.heartbeat.bpm.max(1)
    }

    /// Reject values the control loops cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.servo;
        if s.max_deg <= s.min_deg {
            return Err(ConfigError::ValidationFailed(
                "servo.max_deg must exceed servo.min_deg",
            ));
        }
        if s.max_pulse_us <= s.min_pulse_us {
            return Err(ConfigError::ValidationFailed(
                "servo.max_pulse_us must exceed servo.min_pulse_us",
            ));
        }
        if s.pwm_frequency_hz == 0 || s.max_pulse_us >= 1_000_000.0 / s.pwm_frequency_hz as f32 {
            return Err(ConfigError::ValidationFailed(
                "servo pulse must fit inside one PWM period",
            ));
        }

        let in_range = |a: f32| a >= s.min_deg && a <= s.max_deg;
        let b = &self.breath;
        if b.steps < 2 {
            return Err(ConfigError::ValidationFailed("breath.steps must be >= 2"));
        }
        if b.breath_duration_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "breath.breath_duration_ms must be > 0",
            ));
        }
        if !in_range(b.rest_angle) || !in_range(self.inhale_angle()) {
            return Err(ConfigError::ValidationFailed(
                "breath angles must lie within the servo range",
            ));
        }
        if !in_range(b.neutral_angle) || !in_range(self.calibration_angle) {
            return Err(ConfigError::ValidationFailed(
                "neutral and calibration angles must lie within the servo range",
            ));
        }

        let h = &self.heartbeat;
        if h.bpm == 0 || h.bpm > 60_000 {
            return Err(ConfigError::ValidationFailed(
                "heartbeat.bpm must be within 1..=60000",
            ));
        }
        if h.vibrate_duration_ms > h.lub_duration_ms {
            return Err(ConfigError::ValidationFailed(
                "heartbeat pulses must not overlap (vibrate <= lub)",
            ));
        }
        if h.lub_duration_ms.saturating_add(h.vibrate_duration_ms) > self.heartbeat_interval_ms() {
            return Err(ConfigError::ValidationFailed(
                "heartbeat pulses must fit inside one beat interval",
            ));
        }
        if h.loop_delay_ms == 0 || self.trigger.tick_ms == 0 {
            return Err(ConfigError::ValidationFailed("loop periods must be > 0"));
        }
        Ok(())
    }
}
