//! Projection and model-view matrices for the point cloud.

use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_4, TAU};

/// Vertical field of view in radians.
pub const FIELD_OF_VIEW: f32 = FRAC_PI_4;
pub const Z_NEAR: f32 = 1.0;
pub const Z_FAR: f32 = 10_000.0;
/// Where the cloud sits in front of the camera.
pub const OBJECT_OFFSET: Vec3 = Vec3::new(0.0, 0.0, -8.0);
/// Spin rate used when no control value is available, in revs/sec.
pub const DEFAULT_ROTATION_RATE: f32 = 0.2;

/// Projection, model-view and the fixed spin axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    pub projection: Mat4,
    pub model_view: Mat4,
    /// Unit axis the cloud spins around.
    pub axis: Vec3,
}

impl TransformState {
    /// Fresh transforms for a `width` x `height` viewport. Rotation starts at zero.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            projection: projection_for(width, height),
            model_view: Mat4::from_translation(OBJECT_OFFSET),
            axis: Vec3::Y,
        }
    }

    /// Spin by `elapsed_ms` worth of rotation at `revs_per_sec`.
    ///
    /// The rotation is composed onto the existing model-view, so it accumulates
    /// across frames and only resets through [`TransformState::new`].
    pub fn advance(&mut self, elapsed_ms: f64, revs_per_sec: f32) {
        let angle = rotation_angle(elapsed_ms, revs_per_sec);
        self.rotate(angle);
    }

    /// Compose a rotation of `angle` radians about the spin axis.
    pub fn rotate(&mut self, angle: f32) {
        if angle == 0.0 {
            return;
        }
        self.model_view *= Mat4::from_axis_angle(self.axis, angle);
    }

    /// Aspect ratio baked into the current projection.
    pub fn aspect(&self) -> f32 {
        // perspective_rh stores 1/(aspect * tan(fov/2)) in x and 1/tan(fov/2) in y
        self.projection.y_axis.y / self.projection.x_axis.x
    }
}

/// Radians turned in `elapsed_ms` at `revs_per_sec`.
pub fn rotation_angle(elapsed_ms: f64, revs_per_sec: f32) -> f32 {
    TAU * revs_per_sec * (elapsed_ms / 1000.0) as f32
}

fn projection_for(width: u32, height: u32) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    Mat4::perspective_rh(FIELD_OF_VIEW, aspect, Z_NEAR, Z_FAR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_mat_close(a: Mat4, b: Mat4) {
        assert!(a.abs_diff_eq(b, 1e-5), "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_initial_model_view_is_translation() {
        let t = TransformState::new(640, 480);
        let origin = t.model_view.transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(OBJECT_OFFSET, 1e-6));
        assert_eq!(t.axis, Vec3::Y);
    }

    #[test]
    fn test_projection_matches_aspect() {
        let t = TransformState::new(640, 480);
        assert!((t.aspect() - 640.0 / 480.0).abs() < 1e-5);

        let t = TransformState::new(1000, 750);
        assert!((t.aspect() - 4.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_height_does_not_produce_nan() {
        let t = TransformState::new(0, 0);
        assert!(t.projection.is_finite());
    }

    #[test]
    fn test_rotation_composes_additively() {
        let mut split = TransformState::new(640, 480);
        split.rotate(0.3);
        split.rotate(1.1);

        let mut once = TransformState::new(640, 480);
        once.rotate(1.4);

        assert_mat_close(split.model_view, once.model_view);
    }

    #[test]
    fn test_advance_uses_rate_and_elapsed() {
        // 0.25 revs/sec for one second is a quarter turn
        let mut t = TransformState::new(640, 480);
        t.advance(1000.0, 0.25);

        let mut expected = TransformState::new(640, 480);
        expected.rotate(std::f32::consts::FRAC_PI_2);
        assert_mat_close(t.model_view, expected.model_view);
    }

    #[test]
    fn test_zero_elapsed_leaves_rotation_unchanged() {
        let mut t = TransformState::new(640, 480);
        let before = t.model_view;
        t.advance(0.0, DEFAULT_ROTATION_RATE);
        assert_eq!(t.model_view, before);
    }

    #[test]
    fn test_rotation_keeps_object_in_place() {
        let mut t = TransformState::new(640, 480);
        t.advance(1234.0, 0.7);
        let origin = t.model_view.transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(OBJECT_OFFSET, 1e-5));
    }

    #[test]
    fn test_rotation_angle() {
        assert!((rotation_angle(1000.0, 1.0) - TAU).abs() < 1e-6);
        assert!((rotation_angle(500.0, 0.2) - 0.2 * std::f32::consts::PI).abs() < 1e-6);
    }
}
