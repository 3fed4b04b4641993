//! Actuator drivers, hardware initialisation, and thread helpers.

pub mod heartbeat_motor;
pub mod hw_init;
pub mod servo;
pub mod task_pin;
