//! Heartbeat vibration motor driver (two-input H-bridge).
//!
//! The motor sits between inputs A and B.  A is held HIGH for the whole
//! run; pulling B LOW spins the motor.  Electrical polarity is therefore
//! inverted: LOW = active, HIGH = inactive.  The wiring depends on it.
//!
//! ## Dual-target design
//!
//! Generic over [`embedded_hal::digital::OutputPin`].  On ESP-IDF both
//! inputs are `PinDriver`s; on host/test any recording mock will do.

use embedded_hal::digital::OutputPin;

use crate::app::ports::PulsePort;
use crate::error::ActuatorError;

pub struct HeartbeatMotor<A: OutputPin, B: OutputPin> {
    input_a: A,
    input_b: B,
}

impl<A: OutputPin, B: OutputPin> HeartbeatMotor<A, B> {
    /// Take both inputs and drive them HIGH (motor off).
    pub fn new(mut input_a: A, mut input_b: B) -> Result<Self, ActuatorError> {
        input_a
            .set_high()
            .map_err(|_| ActuatorError::GpioWriteFailed)?;
        input_b
            .set_high()
            .map_err(|_| ActuatorError::GpioWriteFailed)?;
        Ok(Self {
            input_a,
            input_b,
        })
    }
}

impl<A: OutputPin, B: OutputPin> PulsePort for HeartbeatMotor<A, B> {
    fn set_active(&mut self, active: bool) -> Result<(), ActuatorError> {
        let result = if active {
            self.input_b.set_low()
        } else {
            self.input_b.set_high()
        };
        result.map_err(|_| ActuatorError::GpioWriteFailed)
    }
}
