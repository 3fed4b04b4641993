//! GPIO / peripheral pin assignments for the prop controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  The firmware's `hw_init` takes the matching
//! typed pins from `Peripherals`; keep the two in step.

// ---------------------------------------------------------------------------
// Breathing servo (270° hobby servo, LEDC PWM)
// ---------------------------------------------------------------------------

/// LEDC PWM output driving the breathing servo signal line.
/// The calibration mode writes to the same servo.
pub const BREATH_SERVO_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Heartbeat vibration motor (H-bridge, two inputs)
// ---------------------------------------------------------------------------

/// Motor input A.  Held HIGH (inactive) for the whole run.
pub const HEARTBEAT_MOTOR_A_GPIO: i32 = 7;
/// Motor input B.  Active LOW: pulled low for each beat.
pub const HEARTBEAT_MOTOR_B_GPIO: i32 = 8;

// ---------------------------------------------------------------------------
// UART console (trigger lines, Ctrl-C interrupt)
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
pub const UART_BAUD: u32 = 115_200;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  14 bits gives ~1.2 µs steps at 50 Hz.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
