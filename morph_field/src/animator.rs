//! Per-frame morph between the tree and scatter formations.
//!
//! Each [`MorphAnimator::update`] does, for every particle:
//!
//! | Step | Effect |
//! |------|--------|
//! | lerp | `rest.lerp(scatter, blend)` |
//! | turbulence | `+ turbulence(p * scale, t * rate + seed * offset) * blend * gain`, only when `blend > 0` |
//! | spin | rigid rotation about +Y by the accumulated spin angle |
//! | focus | the focused particle eases to the presentation slot instead |
//!
//! The blend itself is only ever eased toward its target, never assigned.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::field::ParticleField;
use crate::noise::GradientNoise;
use crate::render::{FocusState, MorphUniforms, RenderFrame};

/// How far the blend moves toward its target each update.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Smoothing {
    /// Fixed fraction per frame.
    Constant(f32),
    /// Fraction `rate * dt`, so the speed does not depend on frame rate.
    RateIndependent(f32),
}

impl Smoothing {
    pub fn factor(self, dt: f32) -> f32 {
        match self {
            Smoothing::Constant(k)         => k,
            Smoothing::RateIndependent(r)  => r * dt.max(0.0),
        }
        .clamp(0.0, 1.0)
    }
}

impl Default for Smoothing {
    fn default() -> Self { Smoothing::Constant(0.05) }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphParams {
    pub smoothing: Smoothing,
    pub turbulence_gain: f32,
    pub noise_scale: f32,
    /// Noise time coordinate advances this many units per second.
    pub noise_rate: f32,
    /// Per-particle offset into the noise time axis (multiplies the seed).
    pub seed_offset: f32,
    pub noise_seed: u64,
    /// Radians per second.
    pub spin_rate: f32,
    /// Spin accumulates only while blend is below this.
    pub spin_threshold: f32,
    pub camera: Vec3,
    pub focus_slot: Vec3,
    pub focus_scale: f32,
    /// Fraction per frame the focused particle moves toward its goal.
    pub focus_ease: f32,
    pub twinkle_rate: f32,
    pub twinkle_gain: f32,
}

impl Default for MorphParams {
    fn default() -> Self {
        MorphParams {
            smoothing:       Smoothing::default(),
            turbulence_gain: 1.2,
            noise_scale:     0.12,
            noise_rate:      0.35,
            seed_offset:     10.0,
            noise_seed:      0x5EED,
            spin_rate:       0.3,
            spin_threshold:  0.5,
            camera:          Vec3::new(0.0, 0.0, 40.0),
            focus_slot:      Vec3::new(0.0, 0.0, 28.0),
            focus_scale:     6.0,
            focus_ease:      0.08,
            twinkle_rate:    3.0,
            twinkle_gain:    0.8,
        }
    }
}

/// Scalar animation state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlendState {
    pub blend: f32,
    pub target: f32,
    /// Seconds of animation so far.
    pub elapsed: f32,
}

impl BlendState {
    fn step(&mut self, k: f32, dt: f32) {
        self.elapsed += dt;
        self.blend += (self.target - self.blend) * k;
        self.blend = self.blend.clamp(0.0, 1.0);
    }
}

pub struct MorphAnimator {
    params:      MorphParams,
    noise:       GradientNoise,
    state:       BlendState,
    spin:        f32,
    pixel_ratio: f32,
    positions:   Vec<Vec3>,
    scales:      Vec<f32>,
    glow:        Vec<f32>,
    focus:       Option<FocusState>,
}

impl MorphAnimator {
    /// Starts in the tree formation with every particle at rest.
    pub fn new(field: &ParticleField, params: MorphParams) -> Self {
        MorphAnimator {
            noise:       GradientNoise::new(params.noise_seed),
            params,
            state:       BlendState::default(),
            spin:        0.0,
            pixel_ratio: 1.0,
            positions:   field.rests().to_vec(),
            scales:      vec![1.0; field.len()],
            glow:        vec![1.0; field.len()],
            focus:       None,
        }
    }

    pub fn params(&self) -> &MorphParams { &self.params }
    pub fn state(&self) -> BlendState { self.state }
    pub fn blend(&self) -> f32 { self.state.blend }
    pub fn spin(&self) -> f32 { self.spin }
    pub fn positions(&self) -> &[Vec3] { &self.positions }
    pub fn scales(&self) -> &[f32] { &self.scales }
    pub fn glow(&self) -> &[f32] { &self.glow }
    pub fn focus(&self) -> Option<FocusState> { self.focus }

    pub fn set_target(&mut self, target: f32) {
        self.state.target = target.clamp(0.0, 1.0);
    }

    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio.max(0.0);
    }

    /// Start presenting `particle`.  Returns `false` for an unknown index.
    pub fn set_focus(&mut self, particle: usize) -> bool {
        if particle >= self.positions.len() {
            return false;
        }
        self.focus = match self.focus {
            Some(f) if f.particle == particle => Some(FocusState { engaged: true, ..f }),
            _ => Some(FocusState {
                particle,
                position: self.positions[particle],
                scale:    1.0,
                facing:   Quat::IDENTITY,
                engaged:  true,
            }),
        };
        true
    }

    /// Let the focused particle ease back into the field.
    pub fn clear_focus(&mut self) {
        if let Some(f) = self.focus.as_mut() {
            f.engaged = false;
        }
    }

    pub fn update(&mut self, field: &ParticleField, dt: f32) {
        debug_assert_eq!(field.len(), self.positions.len());
        let k = self.params.smoothing.factor(dt);
        self.state.step(k, dt);
        if self.state.blend < self.params.spin_threshold {
            self.spin = (self.spin + dt * self.params.spin_rate).rem_euclid(TAU);
        }

        let blend = self.state.blend;
        let time = self.state.elapsed;
        let spin = (self.spin != 0.0).then(|| Quat::from_rotation_y(self.spin));
        let gain = blend * self.params.turbulence_gain;
        let w = time * self.params.noise_rate;
        let twinkle = blend * self.params.twinkle_gain;

        for i in 0..self.positions.len() {
            let mut p = field.rest(i).lerp(field.scatter(i), blend);
            if blend > 0.0 && gain != 0.0 {
                let w = w + field.seed(i) * self.params.seed_offset;
                p += self.noise.turbulence(p * self.params.noise_scale, w) * gain;
            }
            if let Some(q) = spin {
                p = q * p;
            }
            self.positions[i] = p;
            self.scales[i] = 1.0;
            self.glow[i] = if twinkle > 0.0 {
                let phase = time * self.params.twinkle_rate + field.seed(i) * TAU;
                1.0 + twinkle * (0.5 + 0.5 * phase.sin())
            } else {
                1.0
            };
        }

        self.update_focus();
    }

    fn update_focus(&mut self) {
        let Some(mut f) = self.focus else { return };
        let ease = self.params.focus_ease.clamp(0.0, 1.0);
        let computed = self.positions[f.particle];

        if f.engaged {
            f.position = f.position.lerp(self.params.focus_slot, ease);
            f.scale += (self.params.focus_scale - f.scale) * ease;
        } else {
            f.position = f.position.lerp(computed, ease);
            f.scale += (1.0 - f.scale) * ease;
            if f.position.distance(computed) < 1e-2 && (f.scale - 1.0).abs() < 1e-2 {
                self.focus = None;
                return;
            }
        }

        let toward = (self.params.camera - f.position).normalize_or_zero();
        f.facing = if toward == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_arc(Vec3::Z, toward)
        };

        self.positions[f.particle] = f.position;
        self.scales[f.particle] = f.scale;
        self.focus = Some(f);
    }

    pub fn uniforms(&self) -> MorphUniforms {
        MorphUniforms {
            time:        self.state.elapsed,
            blend:       self.state.blend,
            pixel_ratio: self.pixel_ratio,
        }
    }

    pub fn frame<'a>(&'a self, field: &'a ParticleField) -> RenderFrame<'a> {
        RenderFrame {
            positions: &self.positions,
            colors:    field.colors(),
            sizes:     field.sizes(),
            scales:    &self.scales,
            glow:      &self.glow,
            focus:     self.focus,
            uniforms:  self.uniforms(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldConfig;
    use crate::formation::{ConeFormation, ShellFormation};
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn field(count: usize) -> ParticleField {
        ParticleField::generate(&FieldConfig { count, ..Default::default() })
    }

    fn mean_radius(points: &[Vec3]) -> f32 {
        points.iter().map(|p| p.length()).sum::<f32>() / points.len() as f32
    }

    #[test]
    fn blend_rises_monotonically_and_converges() {
        let f = field(50);
        let mut a = MorphAnimator::new(&f, MorphParams::default());
        a.set_target(1.0);
        let mut prev = a.blend();
        let mut frames_to_converge = None;
        for frame in 1..=200 {
            a.update(&f, DT);
            assert!(a.blend() >= prev);
            prev = a.blend();
            if frames_to_converge.is_none() && a.blend() >= 0.99 {
                frames_to_converge = Some(frame);
            }
        }
        let n = frames_to_converge.expect("blend never reached 0.99");
        assert!(n <= 100, "took {} frames", n);
    }

    #[test]
    fn rate_independent_matches_elapsed_time() {
        let s = Smoothing::RateIndependent(2.0);
        assert_relative_eq!(s.factor(0.5), 1.0);
        assert_relative_eq!(s.factor(DT), 2.0 / 60.0);
        assert_eq!(s.factor(5.0), 1.0);
    }

    #[test]
    fn blend_zero_without_spin_is_exact_rest() {
        let f = field(200);
        let params = MorphParams { spin_rate: 0.0, ..Default::default() };
        let mut a = MorphAnimator::new(&f, params);
        assert_eq!(a.positions(), f.rests());
        for _ in 0..30 {
            a.update(&f, DT);
        }
        assert_eq!(a.blend(), 0.0);
        assert_eq!(a.positions(), f.rests());
        assert!(a.glow().iter().all(|&g| g == 1.0));
    }

    #[test]
    fn spin_freezes_once_scattered() {
        let f = field(20);
        let mut a = MorphAnimator::new(&f, MorphParams::default());
        a.update(&f, DT);
        assert!(a.spin() > 0.0);
        a.set_target(1.0);
        while a.blend() < 0.5 {
            a.update(&f, DT);
        }
        let frozen = a.spin();
        for _ in 0..20 {
            a.update(&f, DT);
        }
        assert_eq!(a.spin(), frozen);
    }

    #[test]
    fn explosion_moves_outward_into_shell() {
        let cfg = FieldConfig {
            count: 100,
            cone:  ConeFormation { base_radius: 5.0, ..Default::default() },
            shell: ShellFormation { min_radius: 10.0, max_radius: 25.0, outward: true, ..Default::default() },
            ..Default::default()
        };
        let f = ParticleField::generate(&cfg);
        let params = MorphParams {
            smoothing: Smoothing::Constant(0.1),
            turbulence_gain: 0.0,
            ..Default::default()
        };
        let mut a = MorphAnimator::new(&f, params);
        a.set_target(1.0);

        let mut prev = mean_radius(a.positions());
        for _ in 0..50 {
            a.update(&f, DT);
            let r = mean_radius(a.positions());
            assert!(r > prev, "mean radius fell: {} → {}", prev, r);
            prev = r;
        }
        assert!((10.0..=25.0).contains(&prev), "final mean radius {}", prev);
        assert_relative_eq!(prev, mean_radius(f.scatters()), epsilon = 0.2);
    }

    #[test]
    fn same_params_same_motion() {
        let f = field(100);
        let mut a = MorphAnimator::new(&f, MorphParams::default());
        let mut b = MorphAnimator::new(&f, MorphParams::default());
        a.set_target(1.0);
        b.set_target(1.0);
        for _ in 0..10 {
            a.update(&f, DT);
            b.update(&f, DT);
        }
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn turbulence_moves_smoothly() {
        let f = field(100);
        let params = MorphParams { spin_rate: 0.0, ..Default::default() };
        let mut a = MorphAnimator::new(&f, params);
        a.set_target(1.0);
        for _ in 0..120 {
            a.update(&f, DT);
        }
        let before = a.positions().to_vec();
        a.update(&f, DT);
        for (p, q) in before.iter().zip(a.positions()) {
            assert!(p.distance(*q) < 0.5);
        }
    }

    #[test]
    fn focus_eases_to_slot_and_back() {
        let f = field(100);
        let params = MorphParams { spin_rate: 0.0, ..Default::default() };
        let mut a = MorphAnimator::new(&f, params);
        assert!(!a.set_focus(1000));
        assert!(a.set_focus(7));

        a.update(&f, DT);
        let first = a.focus().expect("focus");
        assert!(first.position.distance(params.focus_slot) < f.rest(7).distance(params.focus_slot));

        for _ in 0..200 {
            a.update(&f, DT);
        }
        let held = a.focus().expect("focus");
        assert!(held.position.distance(params.focus_slot) < 0.01);
        assert_relative_eq!(held.scale, params.focus_scale, epsilon = 0.01);
        assert_eq!(a.positions()[7], held.position);
        // Slot is straight in front of the camera, so the sprite faces +Z.
        assert!((held.facing * Vec3::Z).distance(Vec3::Z) < 1e-4);

        a.clear_focus();
        a.update(&f, DT);
        assert!(a.focus().is_some_and(|s| !s.engaged));
        for _ in 0..200 {
            a.update(&f, DT);
        }
        assert!(a.focus().is_none());
        assert_eq!(a.positions()[7], f.rest(7));
        assert_eq!(a.scales()[7], 1.0);
    }

    #[test]
    fn frame_exposes_uniforms() {
        let f = field(10);
        let mut a = MorphAnimator::new(&f, MorphParams::default());
        a.set_pixel_ratio(2.0);
        a.set_target(1.0);
        a.update(&f, 0.5);
        let frame = a.frame(&f);
        assert_eq!(frame.len(), 10);
        assert_relative_eq!(frame.uniforms.time, 0.5);
        assert_relative_eq!(frame.uniforms.blend, 0.05);
        assert_eq!(frame.uniforms.pixel_ratio, 2.0);
    }
}
