//! Application core: runners, ports, and events.
//!
//! The runners compose the controllers in [`crate::control`] into the two
//! operating programs of the prop (continuous and triggered breathing) plus
//! the one-shot calibration write.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod calibration;
pub mod continuous;
pub mod events;
pub mod ports;
pub mod triggered;
