//! Time source abstraction.
//!
//! The scheduler never calls `Instant::now()` or `thread::sleep`
//! directly; it goes through a `Clock` so tests can drive time by hand
//! and run ticks without real delays.

use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// The real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Convert a config-supplied seconds value to a `Duration`.
///
/// Definition records are hand-editable, so the value may be negative,
/// NaN, or too large for `Duration`. Clamp to zero below and saturate
/// to `Duration::MAX` above instead of panicking inside the conversion.
pub(crate) fn duration_from_secs(secs: f32) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_from_secs_clamps_garbage() {
        assert_eq!(duration_from_secs(-1.0), Duration::ZERO);
        assert_eq!(duration_from_secs(f32::NAN), Duration::ZERO);
        assert_eq!(duration_from_secs(f32::INFINITY), Duration::ZERO);
        assert_eq!(duration_from_secs(1e20), Duration::MAX);
        assert_eq!(duration_from_secs(1.5), Duration::from_millis(1500));
    }
}
