//! User controls: the typed per-tick snapshot and the egui panel that feeds it.

use crate::stats::StatsReadout;

/// Control values polled once at the top of each tick.
///
/// `None` means the control is unavailable; the frame loop substitutes its
/// documented default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlSnapshot {
    /// Spin rate in revolutions per second.
    pub rotation_rate: Option<f32>,
    /// Requested number of points.
    pub desired_point_count: Option<i64>,
    /// One-shot request to clear the worst-frame stats.
    pub reset_requested: bool,
    /// At least one resize arrived since the previous tick.
    pub resize_signaled: bool,
}

/// Slider state and stats labels shown in the overlay.
pub struct ControlPanel {
    pub rotation_rate: f32,
    pub point_count: i64,
    max_point_count: i64,
    reset_requested: bool,
    stats: Option<StatsReadout>,
}

impl ControlPanel {
    pub fn new(rotation_rate: f32, point_count: i64, max_point_count: i64) -> Self {
        Self {
            rotation_rate,
            point_count,
            max_point_count,
            reset_requested: false,
            stats: None,
        }
    }

    /// Queue a stats reset for the next tick.
    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    /// Replace the stats labels.
    pub fn set_stats(&mut self, readout: StatsReadout) {
        self.stats = Some(readout);
    }

    /// Read the controls, consuming the reset trigger.
    pub fn snapshot(&mut self, resize_signaled: bool) -> ControlSnapshot {
        ControlSnapshot {
            rotation_rate: Some(self.rotation_rate),
            desired_point_count: Some(self.point_count),
            reset_requested: std::mem::take(&mut self.reset_requested),
            resize_signaled,
        }
    }

    /// Dark, flat look so the panel doesn't distract from the cloud.
    pub fn style() -> egui::Style {
        let mut style = egui::Style::default();
        style.visuals = egui::Visuals::dark();
        style.visuals.window_shadow = egui::Shadow::NONE;
        style.visuals.window_fill = style.visuals.window_fill.gamma_multiply(0.85);
        style.spacing.slider_width = 160.0;
        style
    }

    /// Draw the panel.
    pub fn show(&mut self, ctx: &egui::Context) {
        egui::Window::new("Tornado")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.add(
                    egui::Slider::new(&mut self.rotation_rate, 0.0..=2.0)
                        .step_by(0.001)
                        .suffix(" revs/sec")
                        .text("Spin rate"),
                );
                ui.add(
                    egui::Slider::new(&mut self.point_count, 0..=self.max_point_count)
                        .logarithmic(true)
                        .suffix(" points")
                        .text("Points"),
                );

                ui.separator();

                ui.horizontal(|ui| match &self.stats {
                    Some(r) => {
                        ui.monospace(r.fps_text());
                        ui.monospace(r.min_fps_text());
                        ui.monospace(r.min_fps_time_text());
                    }
                    None => {
                        ui.monospace("fps --");
                    }
                });

                if ui.button("Reset stats").clicked() {
                    self.request_reset();
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_sliders() {
        let mut panel = ControlPanel::new(0.2, 10_000, 100_000);
        panel.point_count = 500;
        panel.rotation_rate = 1.5;

        let snap = panel.snapshot(false);
        assert_eq!(snap.desired_point_count, Some(500));
        assert_eq!(snap.rotation_rate, Some(1.5));
        assert!(!snap.resize_signaled);
    }

    #[test]
    fn test_reset_is_one_shot() {
        let mut panel = ControlPanel::new(0.2, 10_000, 100_000);
        panel.request_reset();
        assert!(panel.snapshot(false).reset_requested);
        assert!(!panel.snapshot(false).reset_requested);
    }

    #[test]
    fn test_default_snapshot_has_no_controls() {
        let snap = ControlSnapshot::default();
        assert_eq!(snap.rotation_rate, None);
        assert_eq!(snap.desired_point_count, None);
    }

    #[test]
    fn test_panel_style_is_dark_and_flat() {
        let style = ControlPanel::style();
        assert!(style.visuals.dark_mode);
        assert_eq!(style.visuals.window_shadow, egui::Shadow::NONE);
    }
}
