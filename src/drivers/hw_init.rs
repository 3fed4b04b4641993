//! One-shot hardware peripheral initialization.
//!
//! Takes the chip peripherals, configures the LEDC timer and channel for
//! the servo, the two H-bridge inputs for the heartbeat motor, and the
//! UART used as the trigger console.  Called once from `main()` before any
//! runner starts.

use crate::error::Error;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    PeripheralsTaken,
    LedcInitFailed(i32),
    GpioConfigFailed(i32),
    UartInitFailed(i32),
    /// Motor inputs could not be driven to their idle level.
    MotorIdleFailed,
    /// Configured servo pin differs from the wired one.
    ServoPinMismatch(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PeripheralsTaken     => write!(f, "peripherals already taken"),
            Self::LedcInitFailed(rc)   => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::UartInitFailed(rc)   => write!(f, "UART init failed (rc={})", rc),
            Self::MotorIdleFailed      => write!(f, "heartbeat motor idle write failed"),
            Self::ServoPinMismatch(p)  => write!(
                f,
                "servo configured on GPIO{} but wired to GPIO{}",
                p,
                crate::pins::BREATH_SERVO_GPIO
            ),
        }
    }
}

impl core::error::Error for HwInitError {}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(match e {
            HwInitError::PeripheralsTaken => "peripherals already taken",
            HwInitError::LedcInitFailed(_) => "LEDC",
            HwInitError::GpioConfigFailed(_) => "GPIO",
            HwInitError::UartInitFailed(_) => "UART",
            HwInitError::MotorIdleFailed => "heartbeat motor",
            HwInitError::ServoPinMismatch(_) => "servo pin",
        })
    }
}

// ── ESP-IDF bring-up ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use device::{PropPeripherals, init_peripherals};

#[cfg(target_os = "espidf")]
mod device {
    use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, Output, OutputPin as _, PinDriver};
    use esp_idf_hal::ledc::config::TimerConfig;
    use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
    use esp_idf_hal::units::Hertz;
    use log::info;

    use super::HwInitError;
    use crate::adapters::console::SerialConsole;
    use crate::config::PropConfig;
    use crate::drivers::heartbeat_motor::HeartbeatMotor;
    use crate::drivers::servo::ServoDriver;
    use crate::pins;

    type MotorPin = PinDriver<'static, AnyOutputPin, Output>;

    /// Every driver the runners need, ready to use.
    pub struct PropPeripherals {
        pub servo: ServoDriver<LedcDriver<'static>>,
        pub motor: HeartbeatMotor<MotorPin, MotorPin>,
        pub console: SerialConsole<UartDriver<'static>>,
    }

    pub fn init_peripherals(config: &PropConfig) -> Result<PropPeripherals, HwInitError> {
        if config.servo.pin != pins::BREATH_SERVO_GPIO {
            return Err(HwInitError::ServoPinMismatch(config.servo.pin));
        }
        let p = Peripherals::take().map_err(|_| HwInitError::PeripheralsTaken)?;

        // Servo: 50 Hz frame, 14-bit duty.
        let timer = LedcTimerDriver::new(
            p.ledc.timer0,
            &TimerConfig::default()
                .frequency(Hertz(config.servo.pwm_frequency_hz))
                .resolution(Resolution::Bits14),
        )
        .map_err(|e| HwInitError::LedcInitFailed(e.code()))?;
        let channel = LedcDriver::new(p.ledc.channel0, timer, p.pins.gpio6)
            .map_err(|e| HwInitError::LedcInitFailed(e.code()))?;
        let servo = ServoDriver::new(channel, config.servo);

        // Heartbeat motor: both inputs start HIGH (off).
        let input_a = PinDriver::output(p.pins.gpio7.downgrade_output())
            .map_err(|e| HwInitError::GpioConfigFailed(e.code()))?;
        let input_b = PinDriver::output(p.pins.gpio8.downgrade_output())
            .map_err(|e| HwInitError::GpioConfigFailed(e.code()))?;
        let motor =
            HeartbeatMotor::new(input_a, input_b).map_err(|_| HwInitError::MotorIdleFailed)?;

        let uart = UartDriver::new(
            p.uart1,
            p.pins.gpio17,
            p.pins.gpio18,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &UartConfig::default().baudrate(Hertz(pins::UART_BAUD)),
        )
        .map_err(|e| HwInitError::UartInitFailed(e.code()))?;

        info!(
            "hw_init: servo GPIO{} ({}-bit LEDC @ {} Hz), motor GPIO{}/GPIO{}, console UART1 GPIO{}/GPIO{}",
            pins::BREATH_SERVO_GPIO,
            pins::SERVO_PWM_RESOLUTION_BITS,
            config.servo.pwm_frequency_hz,
            pins::HEARTBEAT_MOTOR_A_GPIO,
            pins::HEARTBEAT_MOTOR_B_GPIO,
            pins::UART_TX_GPIO,
            pins::UART_RX_GPIO,
        );

        Ok(PropPeripherals {
            servo,
            motor,
            console: SerialConsole::new(uart),
        })
    }
}
