//! Servo calibration: command one fixed angle so the horn can be mounted
//! at a known position.

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, ServoPort};
use crate::error::ActuatorError;

/// Write `angle` once and report it.  The caller keeps the process alive
/// so the servo holds the position.
pub fn calibrate(
    servo: &mut impl ServoPort,
    angle: f32,
    sink: &mut impl EventSink,
) -> Result<(), ActuatorError> {
    servo.write_angle(angle)?;
    sink.emit(&AppEvent::Calibrated { angle });
    Ok(())
}
