//! Per-frame orchestration.
//!
//! [`FrameLoop::tick`] runs once per display refresh. It handles the debounced
//! resize, regenerates the cloud when the requested count changes, draws,
//! spins the model and keeps the frame rate stats. All device and window work
//! goes through [`FrameHost`] so the loop can run headless.

use crate::controls::ControlSnapshot;
use crate::error::GeometryError;
use crate::geometry::{PointBuffer, TornadoShape};
use crate::resize::{canvas_size, ResizeDebouncer};
use crate::stats::{StatsReadout, StatsTracker};
use crate::transform::{TransformState, DEFAULT_ROTATION_RATE};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::fmt;

/// Everything the frame loop needs from the window and the GPU.
pub trait FrameHost {
    /// Error surfaced by [`FrameHost::draw`].
    type DrawError: fmt::Display;

    /// Ask to be ticked again on the next display refresh.
    fn request_next_frame(&mut self);

    /// Current width of the host window in physical pixels.
    fn window_width(&self) -> u32;

    /// Resize the device viewport to the canvas size.
    fn resize_viewport(&mut self, width: u32, height: u32);

    /// Replace the device vertex buffer with `points`.
    ///
    /// On error the previous buffer must stay in place.
    fn upload_points(&mut self, points: &PointBuffer) -> Result<(), GeometryError>;

    /// Clear and draw `point_count` points with the given transforms.
    fn draw(
        &mut self,
        transforms: &TransformState,
        point_count: u32,
    ) -> Result<(), Self::DrawError>;

    /// Refresh the visible stats text.
    fn show_stats(&mut self, readout: &StatsReadout);
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub resized: bool,
    /// Number of points uploaded this tick, if the cloud was regenerated.
    pub regenerated: Option<u32>,
    /// Why a regeneration attempted this tick was refused.
    pub rejected: Option<GeometryError>,
    /// Real elapsed time fed to the clock (zero on the first tick).
    pub elapsed_ms: f64,
    pub drew: bool,
    /// Stats pushed to the display this tick.
    pub displayed: Option<StatsReadout>,
}

/// Long-lived state of the render loop.
pub struct FrameLoop {
    transforms: TransformState,
    shape: TornadoShape,
    rng: SmallRng,
    resize: ResizeDebouncer,
    /// Last point count requested through the controls.
    requested_points: i64,
    /// Points currently on the device.
    uploaded_points: u32,
    has_geometry: bool,
    warned_without_geometry: bool,
    prev_ms: Option<f64>,
    stats: StatsTracker,
}

impl FrameLoop {
    /// Create a loop for a `width` x `height` canvas.
    ///
    /// `start_ms` is the session start in the same time base as the `now_ms`
    /// passed to [`FrameLoop::tick`]. Geometry for `initial_points` is
    /// generated on the first tick.
    pub fn new(width: u32, height: u32, initial_points: i64, start_ms: f64) -> Self {
        Self::with_rng(width, height, initial_points, start_ms, SmallRng::from_entropy())
    }

    /// Like [`FrameLoop::new`] but with a caller-chosen RNG.
    pub fn with_rng(
        width: u32,
        height: u32,
        initial_points: i64,
        start_ms: f64,
        rng: SmallRng,
    ) -> Self {
        Self {
            transforms: TransformState::new(width, height),
            shape: TornadoShape::new(),
            rng,
            resize: ResizeDebouncer::new(),
            requested_points: initial_points,
            uploaded_points: 0,
            has_geometry: false,
            warned_without_geometry: false,
            prev_ms: None,
            stats: StatsTracker::new(start_ms),
        }
    }

    pub fn transforms(&self) -> &TransformState {
        &self.transforms
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    /// Points currently uploaded and drawn.
    pub fn point_count(&self) -> u32 {
        self.uploaded_points
    }

    /// Run one frame at `now_ms`.
    pub fn tick<H: FrameHost>(
        &mut self,
        now_ms: f64,
        controls: &ControlSnapshot,
        host: &mut H,
    ) -> TickReport {
        if controls.reset_requested {
            self.stats.reset();
        }

        host.request_next_frame();

        if controls.resize_signaled {
            self.resize.signal();
        }
        let resized = self.resize.poll();
        if resized {
            let (width, height) = canvas_size(host.window_width());
            log::info!("Resizing canvas to {}x{}", width, height);
            host.resize_viewport(width, height);
            self.transforms = TransformState::new(width, height);
        }

        let (regenerated, rejected) =
            match self.update_geometry(controls.desired_point_count, resized, host) {
                Ok(count) => (count, None),
                Err(e) => (None, Some(e)),
            };

        let drew = match host.draw(&self.transforms, self.uploaded_points) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Draw failed: {}", e);
                false
            }
        };

        let elapsed_ms = match self.prev_ms {
            Some(prev) => (now_ms - prev).max(0.0),
            None => 0.0,
        };
        self.prev_ms = Some(now_ms);
        let rate = controls.rotation_rate.unwrap_or(DEFAULT_ROTATION_RATE);
        self.transforms.advance(elapsed_ms, rate);

        self.stats.record(elapsed_ms, now_ms);

        let displayed = if self.stats.take_display_slot(now_ms) {
            let readout = self.stats.readout(elapsed_ms);
            log::debug!("{}", readout);
            host.show_stats(&readout);
            Some(readout)
        } else {
            None
        };

        TickReport {
            resized,
            regenerated,
            rejected,
            elapsed_ms,
            drew,
            displayed,
        }
    }

    fn update_geometry<H: FrameHost>(
        &mut self,
        desired: Option<i64>,
        resized: bool,
        host: &mut H,
    ) -> Result<Option<u32>, GeometryError> {
        let desired = desired.unwrap_or(self.requested_points);
        let changed = desired != self.requested_points;
        self.requested_points = desired;

        if !(changed || resized || !self.has_geometry) {
            return Ok(None);
        }

        let uploaded = self
            .shape
            .generate(desired, &mut self.rng)
            .and_then(|points| host.upload_points(&points).map(|()| points.len()));

        match uploaded {
            Ok(len) => {
                // Counts beyond u32 cannot be drawn in one call anyway
                let count = u32::try_from(len).unwrap_or(u32::MAX);
                log::debug!("Regenerated tornado with {} points", count);
                self.uploaded_points = count;
                self.has_geometry = true;
                Ok(Some(count))
            }
            Err(e) => {
                // Report a rejected startup count once, later ones only on change
                let first_failure = !self.has_geometry && !self.warned_without_geometry;
                if changed || first_failure {
                    log::warn!("Keeping previous geometry: {}", e);
                }
                if !self.has_geometry {
                    self.warned_without_geometry = true;
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct NullHost {
        frames_requested: u32,
        uploads: Vec<usize>,
        draws: Vec<u32>,
    }

    impl FrameHost for NullHost {
        type DrawError = String;

        fn request_next_frame(&mut self) {
            self.frames_requested += 1;
        }

        fn window_width(&self) -> u32 {
            800
        }

        fn resize_viewport(&mut self, _width: u32, _height: u32) {}

        fn upload_points(&mut self, points: &PointBuffer) -> Result<(), GeometryError> {
            self.uploads.push(points.len());
            Ok(())
        }

        fn draw(&mut self, _t: &TransformState, point_count: u32) -> Result<(), String> {
            self.draws.push(point_count);
            Ok(())
        }

        fn show_stats(&mut self, _readout: &StatsReadout) {}
    }

    fn looped(points: i64) -> FrameLoop {
        FrameLoop::with_rng(640, 480, points, 0.0, SmallRng::seed_from_u64(11))
    }

    #[test]
    fn test_first_tick_uploads_initial_cloud() {
        let mut fl = looped(1000);
        let mut host = NullHost::default();
        let report = fl.tick(0.0, &ControlSnapshot::default(), &mut host);

        assert_eq!(report.regenerated, Some(1000));
        assert_eq!(host.uploads, vec![1000]);
        assert_eq!(host.draws, vec![1000]);
        assert_eq!(host.frames_requested, 1);
    }

    #[test]
    fn test_unchanged_count_does_not_regenerate() {
        let mut fl = looped(100);
        let mut host = NullHost::default();
        let controls = ControlSnapshot {
            desired_point_count: Some(100),
            ..Default::default()
        };
        fl.tick(0.0, &controls, &mut host);
        let report = fl.tick(16.0, &controls, &mut host);

        assert_eq!(report.regenerated, None);
        assert_eq!(host.uploads.len(), 1);
    }

    #[test]
    fn test_missing_rate_uses_default() {
        let mut fl = looped(10);
        let mut host = NullHost::default();
        fl.tick(0.0, &ControlSnapshot::default(), &mut host);
        fl.tick(1000.0, &ControlSnapshot::default(), &mut host);

        let mut expected = TransformState::new(640, 480);
        expected.advance(1000.0, DEFAULT_ROTATION_RATE);
        assert!(fl
            .transforms()
            .model_view
            .abs_diff_eq(expected.model_view, 1e-5));
    }

    #[test]
    fn test_clock_going_backwards_counts_as_zero() {
        let mut fl = looped(10);
        let mut host = NullHost::default();
        fl.tick(100.0, &ControlSnapshot::default(), &mut host);
        let report = fl.tick(90.0, &ControlSnapshot::default(), &mut host);
        assert_eq!(report.elapsed_ms, 0.0);
    }

    #[test]
    fn test_negative_initial_count_is_rejected_without_geometry() {
        let mut fl = looped(-3);
        let mut host = NullHost::default();

        let report = fl.tick(0.0, &ControlSnapshot::default(), &mut host);
        assert_eq!(report.rejected, Some(GeometryError::NegativeCount(-3)));
        assert!(fl.warned_without_geometry);
        assert!(host.uploads.is_empty());
        assert_eq!(host.draws, vec![0]);

        // Still retried each tick until a valid count arrives
        let report = fl.tick(16.0, &ControlSnapshot::default(), &mut host);
        assert_eq!(report.rejected, Some(GeometryError::NegativeCount(-3)));

        let controls = ControlSnapshot {
            desired_point_count: Some(20),
            ..Default::default()
        };
        let report = fl.tick(32.0, &controls, &mut host);
        assert_eq!(report.regenerated, Some(20));
        assert_eq!(report.rejected, None);
    }
}
