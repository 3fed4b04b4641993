//! Control loops: easing curves, breathing, heartbeat, and the console trigger.

pub mod breath;
pub mod easing;
pub mod heartbeat;
pub mod trigger;
