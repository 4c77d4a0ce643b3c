//! Tornado point cloud generation.
//!
//! Points are sampled from a hollow cylinder that widens toward the top.
//! Every regeneration produces a fresh [`PointBuffer`]; buffers are never
//! edited in place.

use crate::error::GeometryError;
use rand::Rng;
use std::f32::consts::TAU;

/// Floats per point in a [`PointBuffer`].
pub const POINT_STRIDE: usize = 3;

/// How the device should assemble the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Points,
}

/// Flat list of xyz positions ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct PointBuffer {
    positions: Vec<[f32; 3]>,
}

impl PointBuffer {
    /// Number of points in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Floats per point (always 3).
    #[inline]
    pub fn stride(&self) -> usize {
        POINT_STRIDE
    }

    #[inline]
    pub fn primitive(&self) -> PrimitiveKind {
        PrimitiveKind::Points
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Raw bytes for a vertex buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Size of the upload in bytes.
    #[inline]
    pub fn byte_len(&self) -> u64 {
        std::mem::size_of_val(self.positions.as_slice()) as u64
    }

    /// Reject buffers larger than `max_buffer_size`.
    pub fn check_fits(&self, max_buffer_size: u64) -> Result<(), GeometryError> {
        let bytes = self.byte_len();
        if bytes > max_buffer_size {
            return Err(GeometryError::TooLarge {
                bytes,
                limit: max_buffer_size,
            });
        }
        Ok(())
    }
}

/// Shape parameters for the tapered cylinder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TornadoShape {
    /// Total height, centered on y = 0.
    pub height: f32,
    /// Radial spread added on top of the hollow core.
    pub radius: f32,
    /// Minimum radius before tapering. Keeps the center empty.
    pub core: f32,
    /// How much wider the top is than the bottom (0.5 = 50%).
    pub taper: f32,
}

impl TornadoShape {
    pub fn new() -> Self {
        Self {
            height: 6.0,
            radius: 1.0,
            core: 0.2,
            taper: 0.5,
        }
    }

    /// Taper multiplier for a height fraction in `[0, 1)`.
    #[inline]
    fn taper_for_fraction(&self, h: f32) -> f32 {
        1.0 + self.taper * h
    }

    /// Taper multiplier at vertical position `y`.
    pub fn taper_at(&self, y: f32) -> f32 {
        self.taper_for_fraction(y / self.height + 0.5)
    }

    /// Sample one point.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> [f32; 3] {
        let h: f32 = rng.gen();
        let y = self.height * (h - 0.5);
        let theta = rng.gen_range(0.0..TAU);
        let r: f32 = rng.gen();
        let radial = self.taper_for_fraction(h) * (self.core + r * self.radius);

        [radial * theta.sin(), y, radial * theta.cos()]
    }

    /// Generate exactly `count` points.
    ///
    /// Negative counts are rejected; the caller keeps whatever it had before.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        count: i64,
        rng: &mut R,
    ) -> Result<PointBuffer, GeometryError> {
        if count < 0 {
            return Err(GeometryError::NegativeCount(count));
        }

        let positions = (0..count).map(|_| self.sample(rng)).collect();
        Ok(PointBuffer { positions })
    }
}

impl Default for TornadoShape {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn radial_distance(p: &[f32; 3]) -> f32 {
        (p[0] * p[0] + p[2] * p[2]).sqrt()
    }

    #[test]
    fn test_exact_counts() {
        let shape = TornadoShape::new();
        let mut rng = SmallRng::seed_from_u64(7);

        for n in [0, 1, 2, 500, 10_000] {
            let buf = shape.generate(n, &mut rng).unwrap();
            assert_eq!(buf.len(), n as usize);
            assert_eq!(buf.as_bytes().len(), n as usize * POINT_STRIDE * 4);
        }
    }

    #[test]
    fn test_points_within_tapered_shell() {
        let shape = TornadoShape::new();
        let mut rng = SmallRng::seed_from_u64(42);
        let buf = shape.generate(20_000, &mut rng).unwrap();

        // Small slack for f32 round-off when recovering h from y
        let eps = 1e-4;
        for p in buf.positions() {
            assert!(p[1].abs() <= shape.height / 2.0 + eps);

            let taper = shape.taper_at(p[1]);
            let r = radial_distance(p);
            assert!(r >= 0.2 * taper - eps, "r={} taper={}", r, taper);
            assert!(r <= 1.2 * taper + eps, "r={} taper={}", r, taper);
        }
    }

    #[test]
    fn test_top_is_wider_than_bottom() {
        let shape = TornadoShape::new();
        assert!((shape.taper_at(-3.0) - 1.0).abs() < 1e-6);
        assert!((shape.taper_at(3.0) - 1.5).abs() < 1e-6);
        assert!(shape.taper_at(1.0) > shape.taper_at(-1.0));
    }

    #[test]
    fn test_negative_count_rejected() {
        let shape = TornadoShape::new();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            shape.generate(-5, &mut rng),
            Err(GeometryError::NegativeCount(-5))
        );
    }

    #[test]
    fn test_metadata() {
        let shape = TornadoShape::new();
        let mut rng = SmallRng::seed_from_u64(3);
        let buf = shape.generate(0, &mut rng).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.stride(), 3);
        assert_eq!(buf.primitive(), PrimitiveKind::Points);
    }

    #[test]
    fn test_same_seed_same_cloud() {
        let shape = TornadoShape::new();
        let a = shape.generate(100, &mut SmallRng::seed_from_u64(9)).unwrap();
        let b = shape.generate(100, &mut SmallRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_oversized_buffer_rejected() {
        let shape = TornadoShape::new();
        let buf = shape.generate(100, &mut SmallRng::seed_from_u64(5)).unwrap();
        assert_eq!(buf.byte_len(), 1200);

        assert!(buf.check_fits(1200).is_ok());
        assert_eq!(
            buf.check_fits(1199),
            Err(GeometryError::TooLarge {
                bytes: 1200,
                limit: 1199
            })
        );
    }
}
