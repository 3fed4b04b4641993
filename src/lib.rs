//! Breathbeat prop firmware library.
//!
//! Exposes the control logic, runners and adapters for integration testing
//! on the host.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod posture;
pub mod scheduler;
pub mod signals;
