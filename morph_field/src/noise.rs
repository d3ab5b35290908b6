//! Seeded Perlin gradient noise in 3 and 4 dimensions, on the `noise` crate.
//!
//! Two generators built from the same seed produce identical fields.  The
//! 4th coordinate is driven by time, so turbulence moves without popping.

use glam::Vec3;
use noise::{NoiseFn, Perlin};

/// Decorrelating offsets for the three turbulence channels.
const CHANNEL_OFFSETS: [Vec3; 3] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(31.416, 47.853, 12.679),
    Vec3::new(73.156, 19.721, 5.337),
];

#[derive(Clone, Debug)]
pub struct GradientNoise {
    perlin: Perlin,
}

impl GradientNoise {
    /// Only the low 32 bits of `seed` select the permutation.
    pub fn new(seed: u64) -> Self {
        GradientNoise { perlin: Perlin::new(seed as u32) }
    }

    /// 3D gradient noise, roughly in [-1, 1].
    pub fn noise3(&self, p: Vec3) -> f32 {
        NoiseFn::<f64, 3>::get(&self.perlin, [p.x as f64, p.y as f64, p.z as f64]) as f32
    }

    /// 4D gradient noise, roughly in [-1, 1].
    pub fn noise4(&self, p: Vec3, w: f32) -> f32 {
        NoiseFn::<f64, 4>::get(&self.perlin, [p.x as f64, p.y as f64, p.z as f64, w as f64]) as f32
    }

    /// Three decorrelated 4D samples as a displacement vector.
    pub fn turbulence(&self, p: Vec3, w: f32) -> Vec3 {
        Vec3::new(
            self.noise4(p + CHANNEL_OFFSETS[0], w),
            self.noise4(p + CHANNEL_OFFSETS[1], w),
            self.noise4(p + CHANNEL_OFFSETS[2], w),
        )
    }
}

impl Default for GradientNoise {
    fn default() -> Self { GradientNoise::new(0x5EED) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
