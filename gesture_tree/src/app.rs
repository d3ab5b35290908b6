//! Top-level application.
//!
//! `AppState` owns the particle field, its animator, the photo wall and a
//! handle to the shared mode machine.  The detection thread writes into the
//! machine; the display loop reads a snapshot each frame and drives the
//! animator from it.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Context;
use morph_field::{MorphAnimator, ParticleField, RenderFrame};

use crate::config::AppConfig;
use crate::detection::{DetectionLoop, Detector};
use crate::mode::{Mode, ModeHandle, ModeSnapshot, PointerInput};
use crate::photo::PhotoWall;
use crate::source::{open_source, InputMode, SimInput};
use crate::visualizer::Visualizer;

/// Longest frame step fed to the animator; longer stalls are clipped.
const MAX_DT: f32 = 0.1;
/// Detection thread back-off when no new frame is ready.
const DETECT_IDLE: Duration = Duration::from_millis(4);

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    field:       ParticleField,
    animator:    MorphAnimator,
    handle:      ModeHandle,
    photos:      PhotoWall,
    seen_serial: u64,
    last:        ModeSnapshot,
}

impl AppState {
    pub fn new(cfg: &AppConfig, mut photos: PhotoWall) -> Self {
        let mut field_cfg = cfg.field.clone();
        field_cfg.photo_slots = photos.len();
        let field = ParticleField::generate(&field_cfg.clamped());
        photos.assign(field.photos());

        let mut animator = MorphAnimator::new(&field, cfg.morph);
        animator.set_pixel_ratio(cfg.view.pixel_ratio);

        let handle = ModeHandle::new(cfg.mode, cfg.classifier);
        handle.set_focus_enabled(!photos.is_empty());

        log::info!(
            "field ready: {} particles, {} photos",
            field.len(), photos.len()
        );
        AppState {
            field,
            animator,
            handle,
            photos,
            seen_serial: 0,
            last:        ModeSnapshot::default(),
        }
    }

    /// Shared with the detection thread.
    pub fn handle(&self) -> ModeHandle { self.handle.clone() }

    pub fn pointer(&self, input: PointerInput) { self.handle.pointer(input) }

    /// One display frame.
    pub fn tick(&mut self, dt: f32) {
        self.handle.tick(dt);
        let snap = self.handle.snapshot();
        self.animator.set_target(snap.scatter);

        if snap.mode == Mode::Focus {
            if snap.focus_serial != self.seen_serial {
                self.seen_serial = snap.focus_serial;
                if let Some(particle) = self.photos.select_next() {
                    self.animator.set_focus(particle);
                }
            }
        } else {
            self.animator.clear_focus();
        }

        self.animator.update(&self.field, dt);
        self.last = snap;
    }

    pub fn frame(&self) -> RenderFrame<'_> { self.animator.frame(&self.field) }
    pub fn snapshot(&self) -> ModeSnapshot { self.last }
    pub fn photos(&self) -> &PhotoWall { &self.photos }
    pub fn field(&self) -> &ParticleField { &self.field }
    pub fn animator(&self) -> &MorphAnimator { &self.animator }

    pub fn status_line(&self) -> String {
        let s = &self.last;
        format!(
            "{}  hand: {}  gesture: {:?}  blend: {:.2}  particles: {}",
            s.mode.name(),
            if s.hand_present { "yes" } else { "no" },
            s.gesture,
            self.animator.blend(),
            self.field.len(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run — main loop
// ════════════════════════════════════════════════════════════════════════════

pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    // ── Photos ────────────────────────────────────────────────────────────
    let photos = match &cfg.photos_dir {
        Some(dir) => PhotoWall::load_dir(dir)
            .with_context(|| format!("loading photos from {}", dir.display()))?,
        None => PhotoWall::default(),
    };

    let mut app = AppState::new(&cfg, photos);

    // ── Landmark source (falls back to the pointer) ──────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let source = match open_source(&cfg.input, cfg.camera_fps, sim_rx) {
        Ok(source) => source,
        Err(e) => {
            log::error!("{}; falling back to pointer input", e);
            None
        }
    };
    let task = source.map(|s| DetectionLoop::start(Detector::new(s, app.handle()), DETECT_IDLE));
    let pointer_mode = task.is_none();
    if pointer_mode && cfg.input != InputMode::Pointer {
        log::warn!("no hand tracking; move the mouse over the window instead");
    }

    // ── Visualizer ────────────────────────────────────────────────────────
    let keys = (cfg.input == InputMode::Simulated && !pointer_mode).then_some(sim_tx);
    let mut vis = Visualizer::new(&cfg.view, &cfg.morph, keys)?;

    // ── Main loop ─────────────────────────────────────────────────────────
    let mut last = Instant::now();
    while vis.is_open() {
        if !vis.poll_input() { break; }
        if pointer_mode {
            app.pointer(vis.pointer());
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32().min(MAX_DT);
        last = now;
        app.tick(dt);

        let status = app.status_line();
        let rotation = app.snapshot().rotation;
        vis.render(&app.frame(), rotation, app.photos(), &status);
    }

    if let Some(task) = task {
        task.stop();
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::Photo;
    use glam::Vec2;

    fn photo(name: &str) -> Photo {
        Photo { name: name.into(), pixels: vec![0xFF00_00FF; 24 * 24] }
    }

    fn config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.field.count = 1500;
        cfg
    }

    fn press(app: &AppState) {
        app.pointer(PointerInput { ndc: Vec2::ZERO, pressing: true, inside: true });
    }

    #[test]
    fn tree_at_rest_on_launch() {
        let mut app = AppState::new(&config(), PhotoWall::default());
        app.tick(1.0 / 60.0);
        assert_eq!(app.snapshot().mode, Mode::Tree);
        assert_eq!(app.animator().blend(), 0.0);
        assert!(app.field().photos().is_empty());
    }

    #[test]
    fn pressing_without_photos_scatters() {
        let mut app = AppState::new(&config(), PhotoWall::default());
        press(&app);
        for _ in 0..30 {
            app.tick(1.0 / 60.0);
        }
        assert_eq!(app.snapshot().mode, Mode::Scatter);
        assert!(app.animator().blend() > 0.5);
        assert!(app.status_line().contains("blend"));
    }

    #[test]
    fn pressing_with_photos_focuses_one_frame() {
        let mut app = AppState::new(&config(), PhotoWall::new(vec![photo("a"), photo("b")]));
        let slots = app.field().photos();
        assert_eq!(slots.len(), 2);

        press(&app);
        app.tick(1.0 / 60.0);
        assert_eq!(app.snapshot().mode, Mode::Focus);
        let focus = app.animator().focus().expect("photo presented");
        assert_eq!(focus.particle, slots.start);
        assert!(focus.engaged);

        // Holding the press keeps the same photo.
        press(&app);
        app.tick(1.0 / 60.0);
        assert_eq!(app.animator().focus().map(|f| f.particle), Some(slots.start));

        // Release, then press again: the next photo.
        app.pointer(PointerInput { ndc: Vec2::ZERO, pressing: false, inside: true });
        app.tick(1.0 / 60.0);
        assert!(!app.animator().focus().map_or(true, |f| f.engaged));
        press(&app);
        app.tick(1.0 / 60.0);
        assert_eq!(app.animator().focus().map(|f| f.particle), Some(slots.start + 1));
    }

    #[test]
    fn frame_matches_field() {
        let mut app = AppState::new(&config(), PhotoWall::default());
        app.tick(0.016);
        let frame = app.frame();
        assert_eq!(frame.len(), app.field().len());
        assert_eq!(frame.uniforms.pixel_ratio, 1.0);
    }
}
