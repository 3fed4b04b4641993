//! Hardware adapter: bundles the prop's peripherals for the runners.
//!
//! One value per concern (servo, heartbeat output, console, clock, delay).
//! The triggered loop needs several of them mutably at once, a servo
//! write and a sleep inside the same blocking breath cycle for example, so
//! the bundle hands out disjoint borrows through [`PropHardware::parts_mut`]
//! instead of implementing every port on itself.  On the device the parts
//! are the LEDC servo driver, the H-bridge motor pins and the UART console;
//! in tests they are mocks.

/// Concrete adapter that combines all prop hardware.
pub struct PropHardware<S, P, C, K, D> {
    servo: S,
    pulse: P,
    console: C,
    clock: K,
    delay: D,
}

/// Simultaneous borrows of every part of a [`PropHardware`].
pub struct Parts<'a, S, P, C, K, D> {
    pub servo: &'a mut S,
    pub pulse: &'a mut P,
    pub console: &'a mut C,
    pub clock: &'a K,
    pub delay: &'a mut D,
}

impl<S, P, C, K, D> PropHardware<S, P, C, K, D> {
    pub fn new(servo: S, pulse: P, console: C, clock: K, delay: D) -> Self {
        Self {
            servo,
            pulse,
            console,
            clock,
            delay,
        }
    }

    pub fn parts_mut(&mut self) -> Parts<'_, S, P, C, K, D> {
        Parts {
            servo: &mut self.servo,
            pulse: &mut self.pulse,
            console: &mut self.console,
            clock: &self.clock,
            delay: &mut self.delay,
        }
    }

    /// Split back into the individual drivers.
    pub fn into_parts(self) -> (S, P, C, K, D) {
        (self.servo, self.pulse, self.console, self.clock, self.delay)
    }
}
