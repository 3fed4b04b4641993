//! Calibration write through the real servo driver.

use core::convert::Infallible;

use breathbeat::app::calibration::calibrate;
use breathbeat::app::events::AppEvent;
use breathbeat::config::PropConfig;
use breathbeat::drivers::servo::ServoDriver;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use crate::mock_hw::EventLog;

/// 14-bit LEDC channel stand-in.
#[derive(Default)]
struct Ledc14 {
    duty: u16,
}

impl ErrorType for Ledc14 {
    type Error = Infallible;
}

impl SetDutyCycle for Ledc14 {
    fn max_duty_cycle(&self) -> u16 {
        16383
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.duty = duty;
        Ok(())
    }
}

#[test]
fn calibration_angle_reaches_the_pwm_channel() {
    let config = PropConfig::default();
    let mut servo = ServoDriver::new(Ledc14::default(), config.servo);
    let mut sink = EventLog::default();

    calibrate(&mut servo, config.calibration_angle, &mut sink).unwrap();

    assert_eq!(servo.current_deg(), Some(140.0));
    // 140° on a 0-270° / 500-2500 µs servo: ~1537 µs of a 20 ms frame.
    let expected = servo.duty_for(140.0);
    assert!((1255..=1260).contains(&expected), "duty {}", expected);
    assert_eq!(sink.events(), vec![AppEvent::Calibrated { angle: 140.0 }]);
}
