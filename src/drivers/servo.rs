//! Positional servo driver over a PWM channel.
//!
//! Maps an angle to a pulse width linearly between
//! `(min_deg, min_pulse_us)` and `(max_deg, max_pulse_us)`, then to a duty
//! value for the channel's resolution.  Angles outside the servo's range
//! are clamped, never rejected.
//!
//! ## Dual-target design
//!
//! Generic over [`embedded_hal::pwm::SetDutyCycle`].  On ESP-IDF the
//! channel is an LEDC driver; on host/test any recording mock will do.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::ServoPort;
use crate::config::ServoConfig;
use crate::error::ActuatorError;

pub struct ServoDriver<P: SetDutyCycle> {
    pwm: P,
    config: ServoConfig,
    current_deg: Option<f32>,
}

impl<P: SetDutyCycle> ServoDriver<P> {
    pub fn new(pwm: P, config: ServoConfig) -> Self {
        Self {
            pwm,
            config,
            current_deg: None,
        }
    }

    /// Clamp to the configured range.
    pub fn clamp(&self, degrees: f32) -> f32 {
        degrees.clamp(self.config.min_deg, self.config.max_deg)
    }

    /// Pulse width for an (unclamped) angle.
    pub fn pulse_width_us(&self, degrees: f32) -> f32 {
        let c = &self.config;
        let span = (self.clamp(degrees) - c.min_deg) / (c.max_deg - c.min_deg);
        c.min_pulse_us + span * (c.max_pulse_us - c.min_pulse_us)
    }

    /// Duty value for an (unclamped) angle at the channel's resolution.
    pub fn duty_for(&self, degrees: f32) -> u16 {
        let period_us = 1_000_000.0 / self.config.pwm_frequency_hz as f32;
        let max = self.pwm.max_duty_cycle() as f32;
        (self.pulse_width_us(degrees) / period_us * max) as u16
    }

    /// Last angle written, after clamping.
    pub fn current_deg(&self) -> Option<f32> {
        self.current_deg
    }
}

impl<P: SetDutyCycle> ServoPort for ServoDriver<P> {
    fn write_angle(&mut self, degrees: f32) -> Result<(), ActuatorError> {
        let clamped = self.clamp(degrees);
        if clamped != degrees {
            warn!(
                "servo: {:.1}° outside {:.0}..{:.0}°, clamped to {:.1}°",
                degrees, self.config.min_deg, self.config.max_deg, clamped
            );
        }
        let duty = self.duty_for(clamped);
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.current_deg = Some(clamped);
        Ok(())
    }
}
