//! Frame timing.

use std::time::{Duration, Instant};

/// Default upper bound for a single frame delta, in seconds.
///
/// Window drags, breakpoints and suspended laptops can stall the loop for seconds; the
/// animation should resume where it was rather than jump.
pub const DEFAULT_MAX_DT: f32 = 0.25;

/// A frame timer that tracks:
/// - `elapsed`: time since creation
/// - `dt`: seconds since the last `tick()`
///
/// Typical usage:
/// - Create once in your state: `let mut clock = FrameClock::new();`
/// - Each frame: `let dt = clock.tick();`
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    /// Max dt returned from `tick()` (in seconds).
    max_dt: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            max_dt: DEFAULT_MAX_DT,
        }
    }

    /// Set the `max_dt` clamp for `tick()`.
    #[inline]
    pub fn with_max_dt(mut self, max_dt: f32) -> Self {
        self.max_dt = max_dt.max(0.0);
        self
    }

    #[inline]
    pub fn max_dt(&self) -> f32 {
        self.max_dt
    }

    /// Duration since this clock was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Advance the clock and return `dt` in seconds, clamped to `[0, max_dt]`.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;
        clamp_dt(raw, self.max_dt)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp a raw frame delta to `[0, max_dt]`; NaN becomes 0.
#[inline]
pub fn clamp_dt(raw: f32, max_dt: f32) -> f32 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, max_dt.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_dt_policy() {
        assert_eq!(clamp_dt(0.016, 0.25), 0.016);
        assert_eq!(clamp_dt(3.0, 0.25), 0.25);
        assert_eq!(clamp_dt(-0.5, 0.25), 0.0);
        assert_eq!(clamp_dt(f32::NAN, 0.25), 0.0);
        assert_eq!(clamp_dt(f32::INFINITY, 0.25), 0.25);
        assert_eq!(clamp_dt(1.0, -3.0), 0.0);
    }

    #[test]
    fn tick_is_bounded() {
        let mut clock = FrameClock::new().with_max_dt(0.05);
        for _ in 0..3 {
            let dt = clock.tick();
            assert!((0.0..=0.05).contains(&dt));
        }
        assert!(clock.elapsed() >= Duration::ZERO);
    }

    #[test]
    fn negative_max_dt_is_floored() {
        assert_eq!(FrameClock::new().with_max_dt(-1.0).max_dt(), 0.0);
    }
}
