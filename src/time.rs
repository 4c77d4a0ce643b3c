//! Session clock.
//!
//! The frame loop works in plain `f64` milliseconds so it can be driven by a
//! fake clock in tests. [`SessionClock`] provides the real timestamps from a
//! monotonic `Instant`.

use std::time::{Duration, Instant};

/// Monotonic milliseconds since the session started.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    start: Instant,
}

impl SessionClock {
    /// Start a clock at zero.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since [`SessionClock::new`].
    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_starts_near_zero() {
        let clock = SessionClock::new();
        assert!(clock.now_ms() < 1000.0);
    }

    #[test]
    fn test_clock_advances() {
        let clock = SessionClock::new();
        let a = clock.now_ms();
        thread::sleep(Duration::from_millis(10));
        let b = clock.now_ms();
        assert!(b - a >= 10.0);
    }
}
