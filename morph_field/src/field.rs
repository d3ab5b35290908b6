//! The particle pool.
//!
//! Attributes live in parallel arrays indexed by particle id.  Everything
//! here is fixed at generation time; per-frame state belongs to the
//! [`MorphAnimator`](crate::MorphAnimator).
//!
//! ```text
//!  index:  0 ............................ body ........ | photo slots |
//!  rest:   cone (volume fill)                            | cone skin   |
//!  scatter: shell                                        | shell       |
//! ```

use std::ops::Range;

use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::formation::{ConeFormation, ShellFormation};
use crate::palette::Palette;

pub const MIN_PARTICLES: usize = 1_500;
pub const MAX_PARTICLES: usize = 45_000;

/// Base color and size of photo-frame particles.
const PHOTO_COLOR: Vec3 = Vec3::new(1.0, 0.97, 0.9);
const PHOTO_SIZE: f32 = 1.6;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Total particles, photo slots included.
    pub count: usize,
    pub seed: u64,
    pub cone: ConeFormation,
    pub shell: ShellFormation,
    pub palette: Palette,
    /// Size of the trailing photo-frame block.
    pub photo_slots: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            count:       6_000,
            seed:        2024,
            cone:        ConeFormation::default(),
            shell:       ShellFormation::default(),
            palette:     Palette::default(),
            photo_slots: 0,
        }
    }
}

impl FieldConfig {
    /// `count` pulled into the supported interactive range.
    pub fn clamped(mut self) -> Self {
        self.count = self.count.clamp(MIN_PARTICLES, MAX_PARTICLES);
        self.photo_slots = self.photo_slots.min(self.count);
        self
    }
}

#[derive(Clone, Debug)]
pub struct ParticleField {
    rest:    Vec<Vec3>,
    scatter: Vec<Vec3>,
    color:   Vec<Vec3>,
    size:    Vec<f32>,
    seed:    Vec<f32>,
    photos:  Range<usize>,
}

impl ParticleField {
    /// Build the pool.  Deterministic for a given config.
    pub fn generate(cfg: &FieldConfig) -> Self {
        let total = cfg.count;
        let photo_count = cfg.photo_slots.min(total);
        let body = total - photo_count;
        let mut rng = StdRng::seed_from_u64(cfg.seed);

        let mut field = ParticleField {
            rest:    Vec::with_capacity(total),
            scatter: Vec::with_capacity(total),
            color:   Vec::with_capacity(total),
            size:    Vec::with_capacity(total),
            seed:    Vec::with_capacity(total),
            photos:  body..total,
        };

        for i in 0..body {
            let rest = cfg.cone.point(i, body, &mut rng);
            let swatch = cfg.palette.draw(&mut rng);
            field.push(rest, cfg.shell.point(rest, &mut rng), swatch.color, swatch.size, &mut rng);
        }

        // Photo frames hang on the skin of the lower three quarters.
        let skin = cfg.cone.surface();
        let rows = photo_count.max(1);
        for k in 0..photo_count {
            let rest = skin.point(3 * k, 4 * rows, &mut rng);
            field.push(rest, cfg.shell.point(rest, &mut rng), PHOTO_COLOR, PHOTO_SIZE, &mut rng);
        }

        log::debug!(
            "generated field: {} particles ({} photo slots), seed {}",
            total, photo_count, cfg.seed
        );
        field
    }

    fn push(&mut self, rest: Vec3, scatter: Vec3, color: Vec3, size: f32, rng: &mut StdRng) {
        self.rest.push(rest);
        self.scatter.push(scatter);
        self.color.push(color);
        self.size.push(size);
        self.seed.push(rng.gen::<f32>());
    }

    pub fn len(&self) -> usize { self.rest.len() }
    pub fn is_empty(&self) -> bool { self.rest.is_empty() }

    pub fn rest(&self, i: usize) -> Vec3 { self.rest[i] }
    pub fn scatter(&self, i: usize) -> Vec3 { self.scatter[i] }
    pub fn color(&self, i: usize) -> Vec3 { self.color[i] }
    pub fn size(&self, i: usize) -> f32 { self.size[i] }
    /// Per-particle phase in [0, 1).
    pub fn seed(&self, i: usize) -> f32 { self.seed[i] }

    pub fn rests(&self) -> &[Vec3] { &self.rest }
    pub fn scatters(&self) -> &[Vec3] { &self.scatter }
    pub fn colors(&self) -> &[Vec3] { &self.color }
    pub fn sizes(&self) -> &[f32] { &self.size }
    pub fn seeds(&self) -> &[f32] { &self.seed }

    /// Index range of the photo-frame particles.
    pub fn photos(&self) -> Range<usize> { self.photos.clone() }

    pub fn is_photo(&self, i: usize) -> bool { self.photos.contains(&i) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn small(count: usize, photo_slots: usize) -> FieldConfig {
        FieldConfig { count, photo_slots, ..Default::default() }
    }

    #[test]
    fn arrays_are_parallel() {
        let f = ParticleField::generate(&small(500, 12));
        assert_eq!(f.len(), 500);
        assert_eq!(f.scatters().len(), 500);
        assert_eq!(f.colors().len(), 500);
        assert_eq!(f.sizes().len(), 500);
        assert_eq!(f.seeds().len(), 500);
        assert_eq!(f.photos(), 488..500);
    }

    #[test]
    fn deterministic_per_seed() {
        let a = ParticleField::generate(&small(300, 4));
        let b = ParticleField::generate(&small(300, 4));
        assert_eq!(a.rests(), b.rests());
        assert_eq!(a.scatters(), b.scatters());
        let c = ParticleField::generate(&FieldConfig { seed: 99, ..small(300, 4) });
        assert_ne!(a.rests(), c.rests());
    }

    #[test]
    fn photo_frames_sit_on_cone_skin() {
        let cfg = small(400, 10);
        let f = ParticleField::generate(&cfg);
        for i in f.photos() {
            let p = f.rest(i);
            let h = (p.y + cfg.cone.height * 0.5) / cfg.cone.height;
            let r = Vec3::new(p.x, 0.0, p.z).length();
            assert!((r - cfg.cone.radius_at(h)).abs() < 1e-3, "photo {} off skin", i);
            assert_eq!(f.color(i), PHOTO_COLOR);
        }
    }

    #[test]
    fn scatter_lies_in_shell() {
        let f = ParticleField::generate(&small(1000, 0));
        for p in f.scatters() {
            let r = p.length();
            assert!((10.0 - 1e-3..=25.0 + 1e-3).contains(&r));
        }
        assert!(f.seeds().iter().all(|s| (0.0..1.0).contains(s)));
    }

    #[test]
    fn clamp_limits_count() {
        assert_eq!(small(10, 0).clamped().count, MIN_PARTICLES);
        assert_eq!(small(100_000, 0).clamped().count, MAX_PARTICLES);
        assert_eq!(small(2_000, 5).clamped().count, 2_000);
    }

    #[test]
    fn default_scatter_has_no_directional_bias() {
        // Sampling noise on the mean direction is about 0.007 at this count.
        let f = ParticleField::generate(&small(20_000, 0));
        let mean = f.scatters()
            .iter()
            .map(|p| p.normalize())
            .fold(Vec3::ZERO, |a, b| a + b) / f.len() as f32;
        assert!(mean.length() < 0.02, "mean scatter direction {:?}", mean);
    }
}
