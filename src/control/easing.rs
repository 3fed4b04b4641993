//! Easing curves for the breathing motion.
//!
//! Each curve maps an elapsed time within a sweep onto an angle between
//! `start` and `end`.  Time is normalised by the sweep duration and clamped
//! to `[0, 1]`, so callers may pass any `t`.

use core::f32::consts::PI;

/// Selects one of the sweep curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    /// Cubic ease-in-out.  Used for the inhale.
    Cubic,
    /// Raised-cosine ease-in-out.  Used for the exhale.
    Sine,
}

impl Easing {
    pub fn apply(self, t: f32, start: f32, end: f32, duration: f32) -> f32 {
        match self {
            Self::Cubic => ease_in_out_cubic(t, start, end, duration),
            Self::Sine => ease_in_out_sine(t, start, end, duration),
        }
    }
}

/// Normalised progress in `[0, 1]`.  A non-positive duration counts as done.
fn progress(t: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    (t / duration).clamp(0.0, 1.0)
}

/// Cubic ease-in-out: accelerate through the first half, mirror-image
/// deceleration through the second.
pub fn ease_in_out_cubic(t: f32, start: f32, end: f32, duration: f32) -> f32 {
    let c = end - start;
    let mut p = progress(t, duration) * 2.0;
    if p < 1.0 {
        c / 2.0 * p * p * p + start
    } else {
        p -= 2.0;
        c / 2.0 * (p * p * p + 2.0) + start
    }
}

/// Raised-cosine ease-in-out (half a cosine period).
pub fn ease_in_out_sine(t: f32, start: f32, end: f32, duration: f32) -> f32 {
    let c = end - start;
    let p = progress(t, duration);
    -c / 2.0 * ((PI * p).cos() - 1.0) + start
}
