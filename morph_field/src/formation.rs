//! Formation generators: where each particle wants to be in the tree and in
//! the scattered state.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// ConeFormation — the "tree"
// ════════════════════════════════════════════════════════════════════════════

/// How the cone is filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fill {
    /// Radius scaled by `sqrt(u)`: points fill the interior evenly.
    Volume,
    /// Radius at the full `r(h)`: points sit on the outer skin.
    Surface,
}

/// Spiral cone centred on the origin, apex up.
///
/// Particle `i` of `total` sits at height fraction `h = i / total`, radius
/// `(1 - h) * base_radius` and angle `h * 2π * turns + jitter`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConeFormation {
    pub base_radius: f32,
    pub height: f32,
    pub turns: f32,
    /// Max angular jitter in radians (uniform ±jitter).
    pub jitter: f32,
    pub fill: Fill,
}

impl Default for ConeFormation {
    fn default() -> Self {
        ConeFormation {
            base_radius: 5.0,
            height:      12.0,
            turns:       7.0,
            jitter:      0.35,
            fill:        Fill::Volume,
        }
    }
}

impl ConeFormation {
    /// Same cone, but surface-only (used for decorations such as photo frames).
    pub fn surface(self) -> Self {
        ConeFormation { fill: Fill::Surface, ..self }
    }

    pub fn radius_at(&self, h: f32) -> f32 {
        (1.0 - h).max(0.0) * self.base_radius
    }

    pub fn point<R: Rng + ?Sized>(&self, index: usize, total: usize, rng: &mut R) -> Vec3 {
        let h = index as f32 / total.max(1) as f32;
        let mut r = self.radius_at(h);
        if self.fill == Fill::Volume {
            r *= rng.gen::<f32>().sqrt();
        }
        let jitter = if self.jitter > 0.0 {
            rng.gen_range(-self.jitter..=self.jitter)
        } else {
            0.0
        };
        let theta = h * TAU * self.turns + jitter;
        let y = h * self.height - self.height * 0.5;
        Vec3::new(r * theta.cos(), y, r * theta.sin())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ShellFormation — the "scatter" / "galaxy"
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShellShape {
    /// Uniform over a thick spherical shell.
    Sphere,
    /// Flattened galaxy disk in the XZ plane, `thickness` is the half-height.
    Disk { thickness: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellFormation {
    pub min_radius: f32,
    pub max_radius: f32,
    pub shape: ShellShape,
    /// Mirror each sample into the hemisphere facing away from the particle's
    /// rest point, so the explosion moves outward instead of through the tree.
    /// Off by default: the cone is not centred on the origin, so mirroring
    /// leans the shell toward +Y.
    pub outward: bool,
}

impl Default for ShellFormation {
    fn default() -> Self {
        ShellFormation {
            min_radius: 10.0,
            max_radius: 25.0,
            shape:      ShellShape::Sphere,
            outward:    false,
        }
    }
}

impl ShellFormation {
    pub fn point<R: Rng + ?Sized>(&self, rest: Vec3, rng: &mut R) -> Vec3 {
        let (lo, hi) = if self.min_radius <= self.max_radius {
            (self.min_radius, self.max_radius)
        } else {
            (self.max_radius, self.min_radius)
        };
        let radius = lo + (hi - lo) * rng.gen::<f32>();

        let mut p = match self.shape {
            ShellShape::Sphere => unit_sphere(rng) * radius,
            ShellShape::Disk { thickness } => {
                let angle = rng.gen::<f32>() * TAU;
                let y = rng.gen_range(-1.0f32..=1.0) * thickness;
                Vec3::new(radius * angle.cos(), y, radius * angle.sin())
            }
        };

        if self.outward {
            let away = match self.shape {
                ShellShape::Sphere      => rest,
                ShellShape::Disk { .. } => Vec3::new(rest.x, 0.0, rest.z),
            };
            if p.dot(away) < 0.0 {
                p = match self.shape {
                    ShellShape::Sphere      => -p,
                    ShellShape::Disk { .. } => Vec3::new(-p.x, p.y, -p.z),
                };
            }
        }
        p
    }
}

/// Uniform direction: inclination `acos(2u - 1)`, azimuth uniform.
pub fn unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    let s = phi.sin();
    Vec3::new(s * theta.cos(), phi.cos(), s * theta.sin())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn cone_radius_shrinks_with_height() {
        let cone = ConeFormation { jitter: 0.0, fill: Fill::Surface, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(1);
        let total = 100;
        let mut prev = f32::MAX;
        for i in 0..total {
            let p = cone.point(i, total, &mut rng);
            let r = Vec3::new(p.x, 0.0, p.z).length();
            assert!(r <= prev + 1e-4);
            prev = r;
        }
    }

    #[test]
    fn cone_surface_sits_on_skin() {
        let cone = ConeFormation::default().surface();
        let mut rng = StdRng::seed_from_u64(2);
        for i in 0..50 {
            let p = cone.point(i, 50, &mut rng);
            let h = i as f32 / 50.0;
            let r = Vec3::new(p.x, 0.0, p.z).length();
            assert_relative_eq!(r, cone.radius_at(h), epsilon = 1e-4);
        }
    }

    #[test]
    fn cone_volume_stays_inside() {
        let cone = ConeFormation::default();
        let mut rng = StdRng::seed_from_u64(3);
        for i in 0..500 {
            let p = cone.point(i, 500, &mut rng);
            let h = i as f32 / 500.0;
            assert!(Vec3::new(p.x, 0.0, p.z).length() <= cone.radius_at(h) + 1e-4);
            assert!(p.y >= -cone.height * 0.5 - 1e-4 && p.y <= cone.height * 0.5);
        }
    }

    #[test]
    fn shell_covers_radius_range() {
        let shell = ShellFormation::default();
        let mut rng = StdRng::seed_from_u64(4);
        let (mut lo, mut hi) = (f32::MAX, 0.0f32);
        for _ in 0..4000 {
            let r = shell.point(Vec3::ZERO, &mut rng).length();
            assert!(r >= 10.0 - 1e-3 && r <= 25.0 + 1e-3);
            lo = lo.min(r);
            hi = hi.max(r);
        }
        assert!(lo < 10.5 && hi > 24.5);
    }

    #[test]
    fn shell_has_no_directional_bias() {
        let shell = ShellFormation::default();
        let mut rng = StdRng::seed_from_u64(5);
        let n = 20_000;
        let mean = (0..n)
            .map(|_| shell.point(Vec3::ZERO, &mut rng).normalize())
            .fold(Vec3::ZERO, |a, b| a + b) / n as f32;
        assert!(mean.length() < 0.03, "mean direction {:?}", mean);
    }

    #[test]
    fn outward_shell_faces_away_from_rest() {
        let shell = ShellFormation { outward: true, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(6);
        let rest = Vec3::new(3.0, -2.0, 1.0);
        for _ in 0..500 {
            assert!(shell.point(rest, &mut rng).dot(rest) >= 0.0);
        }
    }

    #[test]
    fn disk_is_flat() {
        let shell = ShellFormation {
            shape: ShellShape::Disk { thickness: 0.5 },
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let p = shell.point(Vec3::new(1.0, 0.0, 0.0), &mut rng);
            assert!(p.y.abs() <= 0.5 + 1e-6);
            let planar = Vec3::new(p.x, 0.0, p.z).length();
            assert!((10.0 - 1e-3..=25.0 + 1e-3).contains(&planar));
        }
    }
}
