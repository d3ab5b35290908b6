//! Software-rendered particle view using `minifb`.
//!
//! Each frame:
//!
//! ```text
//!  positions ──rotate──► project ──► additive soft sprites (HDR accum)
//!                                        │
//!                                 bright-pass ─► ¼-res box blur ─► add
//!                                        │
//!                                 tone map ─► ARGB ─► photo squares ─► text
//! ```
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                                              │
//! │                 particle view                │
//! │                                              │
//! │  status bar                                  │
//! │  key legend                                  │
//! └──────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;

use glam::{Quat, Vec2, Vec3};
use hand_gesture::synth::Pose;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use morph_field::{projected_point_size, MorphParams, RenderFrame};

use crate::config::ViewConfig;
use crate::mode::PointerInput;
use crate::photo::PhotoWall;
use crate::source::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

const BG:              Vec3  = Vec3::new(0.010, 0.014, 0.030);
const LUMA:            Vec3  = Vec3::new(0.2126, 0.7152, 0.0722);
const SPRITE_GAIN:     f32   = 0.45;
const MAX_RADIUS:      f32   = 24.0;
/// Photo squares are this many times the sprite diameter.
const PHOTO_SCALE:     f32   = 2.2;
const BLOOM_DOWNSAMPLE: usize = 4;
const STATUS_H:        usize = 40;
const TEXT_BG:         u32   = 0xFF0B1024;
const PALM_STEP:       f32   = 0.01;

// ════════════════════════════════════════════════════════════════════════════
// Projector
// ════════════════════════════════════════════════════════════════════════════

/// A projected particle centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

/// Pinhole camera on +Z looking at the origin, with the field rotated by
/// (pitch, yaw) in front of it.
#[derive(Clone, Copy, Debug)]
pub struct Projector {
    camera: Vec3,
    focal:  f32,
    centre: Vec2,
    turn:   Quat,
}

impl Projector {
    pub fn new(camera: Vec3, fov_y_deg: f32, width: usize, height: usize, rotation: Vec2) -> Self {
        let half = (fov_y_deg.clamp(1.0, 179.0).to_radians() * 0.5).tan();
        Projector {
            camera,
            focal:  height as f32 * 0.5 / half,
            centre: Vec2::new(width as f32 * 0.5, height as f32 * 0.5),
            turn:   Quat::from_rotation_x(rotation.x) * Quat::from_rotation_y(rotation.y),
        }
    }

    pub fn rotate(&self, p: Vec3) -> Vec3 { self.turn * p }

    /// Project an already-rotated point.  `None` behind the eye.
    pub fn project(&self, p: Vec3) -> Option<Projected> {
        let rel = p - self.camera;
        let depth = -rel.z;
        if depth <= 1e-3 {
            return None;
        }
        Some(Projected {
            x: self.centre.x + rel.x * self.focal / depth,
            y: self.centre.y - rel.y * self.focal / depth,
            depth,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — HDR accumulation + 8-bit output
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    width:  usize,
    height: usize,
    accum:  Vec<Vec3>,
    small:  Vec<Vec3>,
    tmp:    Vec<Vec3>,
    pub buf: Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        let (sw, sh) = Self::small_dims(width, height);
        Canvas {
            width,
            height,
            accum: vec![Vec3::ZERO; width * height],
            small: vec![Vec3::ZERO; sw * sh],
            tmp:   vec![Vec3::ZERO; sw * sh],
            buf:   vec![0xFF00_0000; width * height],
        }
    }

    fn small_dims(width: usize, height: usize) -> (usize, usize) {
        ((width / BLOOM_DOWNSAMPLE).max(1), (height / BLOOM_DOWNSAMPLE).max(1))
    }

    pub fn clear(&mut self) {
        self.accum.fill(Vec3::ZERO);
    }

    pub fn accum_at(&self, x: usize, y: usize) -> Vec3 { self.accum[y * self.width + x] }

    /// Additive soft disc: weight `(1 - d²/r²)²`.  Sub-pixel sprites land on
    /// one pixel scaled by their area.
    pub fn splat(&mut self, x: f32, y: f32, radius: f32, color: Vec3) {
        let radius = radius.min(MAX_RADIUS);
        if radius < 0.75 {
            let (px, py) = (x.round(), y.round());
            if px >= 0.0 && py >= 0.0 && (px as usize) < self.width && (py as usize) < self.height {
                let area = (radius * 2.0).powi(2).min(1.0);
                self.accum[py as usize * self.width + px as usize] += color * area;
            }
            return;
        }
        let x0 = (x - radius).floor().max(0.0) as usize;
        let y0 = (y - radius).floor().max(0.0) as usize;
        let x1 = ((x + radius).ceil() as usize).min(self.width.saturating_sub(1));
        let y1 = ((y + radius).ceil() as usize).min(self.height.saturating_sub(1));
        if x + radius < 0.0 || y + radius < 0.0 || x0 > x1 || y0 > y1 {
            return;
        }
        let inv_r2 = 1.0 / (radius * radius);
        for py in y0..=y1 {
            let dy = py as f32 - y;
            for px in x0..=x1 {
                let dx = px as f32 - x;
                let d2 = (dx * dx + dy * dy) * inv_r2;
                if d2 < 1.0 {
                    let w = (1.0 - d2) * (1.0 - d2);
                    self.accum[py * self.width + px] += color * w;
                }
            }
        }
    }

    /// Bright-pass, quarter-res box blur (two passes each way), add back.
    pub fn bloom(&mut self, threshold: f32, strength: f32, radius: usize) {
        if strength <= 0.0 {
            return;
        }
        let (sw, sh) = Self::small_dims(self.width, self.height);
        let block = BLOOM_DOWNSAMPLE;
        let norm = 1.0 / (block * block) as f32;

        for sy in 0..sh {
            for sx in 0..sw {
                let mut sum = Vec3::ZERO;
                for y in sy * block..((sy + 1) * block).min(self.height) {
                    for x in sx * block..((sx + 1) * block).min(self.width) {
                        let c = self.accum[y * self.width + x];
                        let lum = c.dot(LUMA);
                        if lum > threshold {
                            sum += c * ((lum - threshold) / lum);
                        }
                    }
                }
                self.small[sy * sw + sx] = sum * norm;
            }
        }

        for _ in 0..2 {
            box_blur(&self.small, &mut self.tmp, sw, sh, radius, true);
            box_blur(&self.tmp, &mut self.small, sw, sh, radius, false);
        }

        for y in 0..self.height {
            let sy = (y / block).min(sh - 1);
            for x in 0..self.width {
                let sx = (x / block).min(sw - 1);
                self.accum[y * self.width + x] += self.small[sy * sw + sx] * strength;
            }
        }
    }

    /// Exponential tone map into `buf`.
    pub fn resolve(&mut self, exposure: f32) {
        for (out, c) in self.buf.iter_mut().zip(&self.accum) {
            let lit = Vec3::new(
                1.0 - (-c.x * exposure).exp(),
                1.0 - (-c.y * exposure).exp(),
                1.0 - (-c.z * exposure).exp(),
            );
            let mapped = BG + lit;
            *out = pack(mapped);
        }
    }

    pub fn blit_photo(&mut self, x: f32, y: f32, side: f32, photo: &crate::photo::Photo) {
        if side < 2.0 {
            return;
        }
        let half = side * 0.5;
        let x0 = (x - half).floor().max(0.0) as usize;
        let y0 = (y - half).floor().max(0.0) as usize;
        let x1 = ((x + half).ceil().max(0.0) as usize).min(self.width);
        let y1 = ((y + half).ceil().max(0.0) as usize).min(self.height);
        for py in y0..y1 {
            let v = (py as f32 - (y - half)) / side;
            for px in x0..x1 {
                let u = (px as f32 - (x - half)) / side;
                self.buf[py * self.width + px] = photo.texel(u, v);
            }
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.buf[y * self.width + x] = color;
        }
    }

    /// 3×5 bitmap font, each glyph cell `scale` pixels wide.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        for sy in 0..scale {
                            for sx in 0..scale {
                                self.set_pixel(cx + col * scale + sx, y + row * scale + sy, color);
                            }
                        }
                    }
                }
            }
            cx += 4 * scale;
            if cx + 4 * scale > self.width {
                break;
            }
        }
    }
}

/// Separable box blur along one axis.
fn box_blur(src: &[Vec3], dst: &mut [Vec3], w: usize, h: usize, radius: usize, horizontal: bool) {
    let (len, lines) = if horizontal { (w, h) } else { (h, w) };
    let at = |line: usize, i: usize| if horizontal { line * w + i } else { i * w + line };
    for line in 0..lines {
        for i in 0..len {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(len - 1);
            let mut sum = Vec3::ZERO;
            for k in lo..=hi {
                sum += src[at(line, k)];
            }
            dst[at(line, i)] = sum / (hi - lo + 1) as f32;
        }
    }
}

fn pack(c: Vec3) -> u32 {
    let c = (c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    0xFF00_0000 | (c.x as u32) << 16 | (c.y as u32) << 8 | c.z as u32
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer — the window
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
    view:   ViewConfig,
    camera: Vec3,
    focus_scale: f32,
    sim_tx: Option<Sender<SimInput>>,
}

impl Visualizer {
    /// `sim_tx` is `Some` when keyboard-simulated hands are in use; otherwise
    /// the mouse drives the pointer fallback.
    pub fn new(view: &ViewConfig, morph: &MorphParams, sim_tx: Option<Sender<SimInput>>) -> anyhow::Result<Self> {
        let mut window = Window::new(
            "Gesture Tree",
            view.width, view.height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| anyhow::anyhow!("cannot open window: {}", e))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: Canvas::new(view.width, view.height),
            view: *view,
            camera: morph.camera,
            focus_scale: morph.focus_scale,
            sim_tx,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard input and forward simulation keys.  Returns false on quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        if one_shot(Key::Q) || one_shot(Key::Escape) {
            return false;
        }

        let Some(tx) = &self.sim_tx else { return true };
        for (key, pose) in [
            (Key::O, Pose::Open),
            (Key::F, Pose::Fist),
            (Key::P, Pose::Pinch),
            (Key::N, Pose::TwoFingers),
        ] {
            if one_shot(key) {
                let _ = tx.send(SimInput::Pose(pose));
            }
        }
        if one_shot(Key::H) {
            let _ = tx.send(SimInput::ToggleHand);
        }

        let held = |k: Key| self.window.is_key_down(k);
        let mut d = Vec2::ZERO;
        if held(Key::Left)  { d.x -= PALM_STEP; }
        if held(Key::Right) { d.x += PALM_STEP; }
        if held(Key::Up)    { d.y -= PALM_STEP; }
        if held(Key::Down)  { d.y += PALM_STEP; }
        if d != Vec2::ZERO {
            let _ = tx.send(SimInput::MovePalm(d));
        }
        true
    }

    /// Mouse as a stand-in hand.
    pub fn pointer(&self) -> PointerInput {
        match self.window.get_mouse_pos(MouseMode::Discard) {
            Some((x, y)) => PointerInput {
                ndc: Vec2::new(
                    x / self.view.width as f32 * 2.0 - 1.0,
                    1.0 - y / self.view.height as f32 * 2.0,
                ),
                pressing: self.window.get_mouse_down(MouseButton::Left),
                inside: true,
            },
            None => PointerInput::default(),
        }
    }

    /// Render one frame.
    pub fn render(&mut self, frame: &RenderFrame<'_>, rotation: Vec2, photos: &PhotoWall, status: &str) {
        let (w, h) = (self.view.width, self.view.height);
        let projector = Projector::new(self.camera, self.view.fov_y, w, h, rotation);
        let ratio = frame.uniforms.pixel_ratio;
        let focus = frame.focus;

        // ── Sprites ───────────────────────────────────────────────────────
        self.canvas.clear();
        let mut photo_sprites: Vec<(usize, Projected, f32)> = Vec::new();
        for i in 0..frame.len() {
            let p = frame.positions[i];
            let world = match focus {
                Some(f) if f.particle == i => {
                    // Presented in camera space; blends back as the scale relaxes.
                    let weight = ((f.scale - 1.0) / (self.focus_scale - 1.0).max(1e-3)).clamp(0.0, 1.0);
                    projector.rotate(p).lerp(p, weight)
                }
                _ => projector.rotate(p),
            };
            let Some(proj) = projector.project(world) else { continue };
            let diameter = projected_point_size(
                frame.sizes[i] * frame.scales[i], proj.depth, ratio, self.view.attenuation,
            );
            if photos.photo_for_particle(i).is_some() {
                photo_sprites.push((i, proj, diameter));
                continue;
            }
            let color = frame.colors[i] * frame.glow[i] * SPRITE_GAIN;
            self.canvas.splat(proj.x, proj.y, diameter * 0.5, color);
        }

        self.canvas.bloom(self.view.bloom_threshold, self.view.bloom_strength, self.view.bloom_radius);
        self.canvas.resolve(self.view.exposure);

        // ── Photos, far to near ───────────────────────────────────────────
        photo_sprites.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));
        for (i, proj, diameter) in photo_sprites {
            if let Some(photo) = photos.photo_for_particle(i) {
                self.canvas.blit_photo(proj.x, proj.y, diameter * PHOTO_SCALE, photo);
            }
        }

        // ── Status bar and key legend ─────────────────────────────────────
        let bar_y = h.saturating_sub(STATUS_H);
        self.canvas.fill_rect(0, bar_y, w, STATUS_H, TEXT_BG);
        self.canvas.draw_label(status, 10, bar_y + 6, 0xFFEEEEEE, 2);
        let legend = if self.sim_tx.is_some() {
            "O=open  F=fist  P=pinch  N=none  H=hand  arrows=move  Q=quit"
        } else {
            "mouse=palm  left button=press  Q=quit"
        };
        self.canvas.draw_label(legend, 10, bar_y + 24, 0xFF8890A0, 2);

        self.window.update_with_buffer(&self.canvas.buf, w, h).ok();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn projector(rotation: Vec2) -> Projector {
        Projector::new(Vec3::new(0.0, 0.0, 40.0), 90.0, 200, 100, rotation)
    }

    #[test]
    fn origin_projects_to_centre() {
        let p = projector(Vec2::ZERO).project(Vec3::ZERO).unwrap();
        assert_relative_eq!(p.x, 100.0);
        assert_relative_eq!(p.y, 50.0);
        assert_relative_eq!(p.depth, 40.0);
    }

    #[test]
    fn up_is_up_on_screen_and_far_is_smaller() {
        let pr = projector(Vec2::ZERO);
        let up = pr.project(Vec3::new(0.0, 10.0, 0.0)).unwrap();
        assert!(up.y < 50.0);
        let near = pr.project(Vec3::new(10.0, 0.0, 20.0)).unwrap();
        let far = pr.project(Vec3::new(10.0, 0.0, -20.0)).unwrap();
        assert!(near.x - 100.0 > far.x - 100.0);
    }

    #[test]
    fn behind_camera_is_culled() {
        assert!(projector(Vec2::ZERO).project(Vec3::new(0.0, 0.0, 41.0)).is_none());
    }

    #[test]
    fn yaw_turns_the_field() {
        let pr = projector(Vec2::new(0.0, std::f32::consts::FRAC_PI_2));
        let r = pr.rotate(Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(r.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn splat_peaks_at_centre() {
        let mut c = Canvas::new(32, 32);
        c.splat(16.0, 16.0, 4.0, Vec3::ONE);
        let centre = c.accum_at(16, 16);
        let edge = c.accum_at(19, 16);
        assert_relative_eq!(centre.x, 1.0);
        assert!(edge.x > 0.0 && edge.x < centre.x);
        assert_eq!(c.accum_at(21, 16), Vec3::ZERO);
    }

    #[test]
    fn tiny_and_offscreen_splats_are_safe() {
        let mut c = Canvas::new(8, 8);
        c.splat(3.2, 4.4, 0.25, Vec3::ONE);
        assert_relative_eq!(c.accum_at(3, 4).x, 0.25);
        c.splat(-50.0, -50.0, 3.0, Vec3::ONE);
        c.splat(500.0, 2.0, 3.0, Vec3::ONE);
        c.splat(-1.0, 3.0, 0.1, Vec3::ONE);
    }

    #[test]
    fn bloom_spreads_bright_pixels_only() {
        let mut c = Canvas::new(64, 64);
        c.splat(32.0, 32.0, 2.0, Vec3::splat(4.0));
        c.splat(8.0, 8.0, 2.0, Vec3::splat(0.1));
        let dim_before = c.accum_at(12, 8);
        c.bloom(0.5, 1.0, 2);
        assert!(c.accum_at(38, 32).x > 0.0, "glow should reach neighbours");
        assert_eq!(c.accum_at(12, 8), dim_before, "dim sprite must not bloom");
    }

    #[test]
    fn resolve_maps_black_to_background() {
        let mut c = Canvas::new(2, 1);
        c.splat(1.0, 0.0, 0.5, Vec3::splat(50.0));
        c.resolve(1.0);
        assert_eq!(c.buf[0], pack(BG));
        assert_eq!(c.buf[1], 0xFFFF_FFFF);
    }

    #[test]
    fn label_draws_pixels() {
        let mut c = Canvas::new(64, 16);
        c.buf.fill(0);
        c.draw_label("Q1", 0, 0, 0xFFFFFFFF, 2);
        assert!(c.buf.iter().any(|&p| p == 0xFFFFFFFF));
        assert_eq!(c.buf[63], 0);
    }

    #[test]
    fn photo_blit_fills_square() {
        let photo = crate::photo::Photo {
            name: "x".into(),
            pixels: vec![0xFF12_3456; (crate::photo::THUMB_SIZE * crate::photo::THUMB_SIZE) as usize],
        };
        let mut c = Canvas::new(20, 20);
        c.blit_photo(10.0, 10.0, 6.0, &photo);
        assert_eq!(c.buf[10 * 20 + 10], 0xFF12_3456);
        assert_ne!(c.buf[0], 0xFF12_3456);
    }
}
