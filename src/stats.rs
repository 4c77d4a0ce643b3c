//! Frame rate statistics: current fps, worst fps, and when the worst happened.

use std::fmt;

/// Largest delta considered "no sample yet" (ms).
pub const BASELINE_MAX_DELTA_MS: f64 = 1.0;
/// Min fps reported before any frame has been slower than the baseline.
pub const BASELINE_MIN_FPS: f64 = 0.01;
/// Delta shown when a frame reports zero elapsed time (ms).
pub const NOMINAL_DELTA_MS: f64 = 1000.0 / 60.0;
/// Minimum gap between display refreshes (ms).
pub const DISPLAY_INTERVAL_MS: f64 = 500.0;

/// Worst-frame tracking plus display throttling.
#[derive(Debug, Clone)]
pub struct StatsTracker {
    /// Session start, in the same time base as the tick timestamps.
    start_ms: f64,
    max_delta_ms: f64,
    walltime_of_max_ms: f64,
    min_fps: f64,
    last_display_ms: Option<f64>,
}

/// Formatted-ready snapshot of the stats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsReadout {
    pub fps: f64,
    pub min_fps: f64,
    /// Seconds since session start at which `min_fps` was observed.
    pub min_fps_time_s: f64,
}

impl StatsReadout {
    pub fn fps_text(&self) -> String {
        format!("fps {:.2}", self.fps)
    }

    pub fn min_fps_text(&self) -> String {
        format!(", minfps {:.2}", self.min_fps)
    }

    pub fn min_fps_time_text(&self) -> String {
        format!(", minfps_time {:.3}", self.min_fps_time_s)
    }
}

impl fmt::Display for StatsReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.fps_text(),
            self.min_fps_text(),
            self.min_fps_time_text()
        )
    }
}

impl StatsTracker {
    pub fn new(start_ms: f64) -> Self {
        Self {
            start_ms,
            max_delta_ms: BASELINE_MAX_DELTA_MS,
            walltime_of_max_ms: start_ms,
            min_fps: BASELINE_MIN_FPS,
            last_display_ms: None,
        }
    }

    /// Drop the accumulated worst frame and start over.
    pub fn reset(&mut self) {
        self.max_delta_ms = BASELINE_MAX_DELTA_MS;
        self.walltime_of_max_ms = self.start_ms;
        self.min_fps = BASELINE_MIN_FPS;
    }

    /// Record a frame that took `elapsed_ms` and ended at `now_ms`.
    pub fn record(&mut self, elapsed_ms: f64, now_ms: f64) {
        if elapsed_ms > self.max_delta_ms {
            self.max_delta_ms = elapsed_ms;
            self.walltime_of_max_ms = now_ms;
            self.min_fps = 1000.0 / elapsed_ms;
        }
    }

    #[inline]
    pub fn min_fps(&self) -> f64 {
        self.min_fps
    }

    #[inline]
    pub fn max_delta_ms(&self) -> f64 {
        self.max_delta_ms
    }

    /// Readout for a frame of `elapsed_ms`. Zero maps to a nominal 60 fps.
    pub fn readout(&self, elapsed_ms: f64) -> StatsReadout {
        let shown_delta = if elapsed_ms == 0.0 {
            NOMINAL_DELTA_MS
        } else {
            elapsed_ms
        };

        StatsReadout {
            fps: 1000.0 / shown_delta,
            min_fps: self.min_fps,
            min_fps_time_s: (self.walltime_of_max_ms - self.start_ms) / 1000.0,
        }
    }

    /// Whether the display may refresh at `now_ms`. Marks the refresh when it may.
    pub fn take_display_slot(&mut self, now_ms: f64) -> bool {
        let due = match self.last_display_ms {
            None => true,
            Some(last) => now_ms - last >= DISPLAY_INTERVAL_MS,
        };
        if due {
            self.last_display_ms = Some(now_ms);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baselines() {
        let stats = StatsTracker::new(0.0);
        assert_eq!(stats.min_fps(), BASELINE_MIN_FPS);
        assert_eq!(stats.max_delta_ms(), BASELINE_MAX_DELTA_MS);
    }

    #[test]
    fn test_worst_frame_sticks() {
        let mut stats = StatsTracker::new(1000.0);
        stats.record(20.0, 1100.0);
        assert!((stats.min_fps() - 50.0).abs() < 1e-9);

        // Faster frames do not improve the minimum
        stats.record(10.0, 1110.0);
        assert!((stats.min_fps() - 50.0).abs() < 1e-9);

        stats.record(40.0, 1150.0);
        assert!((stats.min_fps() - 25.0).abs() < 1e-9);

        let r = stats.readout(40.0);
        assert!((r.min_fps_time_s - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_min_fps_non_increasing_after_first_sample() {
        let mut stats = StatsTracker::new(0.0);
        let deltas = [16.0, 17.0, 8.0, 33.0, 16.0, 2.0, 50.0, 49.0];
        let mut now = 0.0;
        stats.record(deltas[0], deltas[0]);
        let mut last = stats.min_fps();
        for d in &deltas[1..] {
            now += d;
            stats.record(*d, now);
            assert!(stats.min_fps() <= last);
            last = stats.min_fps();
        }
    }

    #[test]
    fn test_reset_restores_baseline() {
        let mut stats = StatsTracker::new(500.0);
        stats.record(100.0, 900.0);
        stats.reset();
        assert_eq!(stats.min_fps(), BASELINE_MIN_FPS);
        assert_eq!(stats.max_delta_ms(), BASELINE_MAX_DELTA_MS);
        assert_eq!(stats.readout(16.0).min_fps_time_s, 0.0);
    }

    #[test]
    fn test_zero_elapsed_shows_sixty() {
        let stats = StatsTracker::new(0.0);
        let r = stats.readout(0.0);
        assert_eq!(r.fps_text(), "fps 60.00");
    }

    #[test]
    fn test_readout_formatting() {
        let r = StatsReadout {
            fps: 50.0,
            min_fps: 12.3456,
            min_fps_time_s: 1.23456,
        };
        assert_eq!(r.to_string(), "fps 50.00, minfps 12.35, minfps_time 1.235");
    }

    #[test]
    fn test_display_throttle() {
        let mut stats = StatsTracker::new(0.0);
        assert!(stats.take_display_slot(0.0));
        assert!(!stats.take_display_slot(100.0));
        assert!(!stats.take_display_slot(499.9));
        assert!(stats.take_display_slot(500.0));
        assert!(!stats.take_display_slot(999.0));
        assert!(stats.take_display_slot(1000.0));
    }
}
