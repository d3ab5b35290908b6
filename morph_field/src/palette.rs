//! Weighted color/size buckets.
//!
//! Each particle draws one bucket once at generation time and keeps the
//! result for its lifetime.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// HSV (hue in degrees, s/v in 0..1) → linear RGB in 0..1.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let h  = h.rem_euclid(360.0);
    let hi = (h / 60.0) as u32;
    let f  = h / 60.0 - hi as f32;
    let p  = v * (1.0 - s);
    let q  = v * (1.0 - s * f);
    let t  = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match hi {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Vec3::new(r, g, b)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub weight: f32,
    pub color: Vec3,
    /// Each draw darkens the base color by up to this fraction.
    #[serde(default)]
    pub shade_jitter: f32,
    pub size_min: f32,
    pub size_max: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub buckets: Vec<Bucket>,
}

impl Default for Palette {
    /// Rare bright accent, common body, mid-tier highlight.
    fn default() -> Self {
        Palette {
            buckets: vec![
                Bucket {
                    weight: 0.06,
                    color: hsv_to_rgb(48.0, 0.55, 1.0),
                    shade_jitter: 0.05,
                    size_min: 0.9,
                    size_max: 1.4,
                },
                Bucket {
                    weight: 0.74,
                    color: hsv_to_rgb(140.0, 0.80, 0.75),
                    shade_jitter: 0.35,
                    size_min: 0.35,
                    size_max: 0.7,
                },
                Bucket {
                    weight: 0.20,
                    color: hsv_to_rgb(352.0, 0.80, 0.95),
                    shade_jitter: 0.15,
                    size_min: 0.5,
                    size_max: 0.9,
                },
            ],
        }
    }
}

/// One draw from a [`Palette`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Swatch {
    pub bucket: usize,
    pub color: Vec3,
    pub size: f32,
}

impl Palette {
    fn total_weight(&self) -> f32 {
        self.buckets.iter().map(|b| b.weight.max(0.0)).sum()
    }

    /// Draw a bucket by weight.  An empty or all-zero palette yields white,
    /// unit size.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Swatch {
        let total = self.total_weight();
        if total <= 0.0 {
            return Swatch { bucket: 0, color: Vec3::ONE, size: 1.0 };
        }
        let mut pick = rng.gen::<f32>() * total;
        let mut index = self.buckets.len() - 1;
        for (i, b) in self.buckets.iter().enumerate() {
            let w = b.weight.max(0.0);
            if pick < w {
                index = i;
                break;
            }
            pick -= w;
        }

        let b = &self.buckets[index];
        let shade = 1.0 - b.shade_jitter.clamp(0.0, 1.0) * rng.gen::<f32>();
        let (lo, hi) = (b.size_min.min(b.size_max), b.size_min.max(b.size_max));
        Swatch {
            bucket: index,
            color: b.color * shade,
            size: lo + (hi - lo) * rng.gen::<f32>(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
