//! Interaction mode state machine.
//!
//! Gestures arrive at the camera's cadence through [`ModeHandle::observe`];
//! the display loop calls [`ModeHandle::tick`] once per frame and reads a
//! [`ModeSnapshot`].  Both sides share one `Arc<Mutex<ModeMachine>>`.
//!
//! | Input | Next mode |
//! |---|---|
//! | PINCH | FOCUS (only with a photo wall; otherwise unchanged) |
//! | OPEN | SCATTER |
//! | CLOSED | TREE |
//! | NONE | TREE |
//! | no hand | TREE |

use std::f32::consts::{PI, TAU};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::Vec2;
use hand_gesture::{ClassifierConfig, Gesture, GestureClassifier};
use serde::{Deserialize, Serialize};

use crate::source::LandmarkFrame;

// ════════════════════════════════════════════════════════════════════════════
// Mode / config
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Tree,
    Scatter,
    Focus,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Tree    => "tree",
            Mode::Scatter => "scatter",
            Mode::Focus   => "focus",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    /// Radians of pitch for a palm at the top/bottom edge (×0.5).
    pub pitch_scale: f32,
    pub yaw_scale: f32,
    /// Fraction of the remaining rotation covered per video update.
    pub rotation_smoothing: f32,
    /// Radians per second of yaw drift with no hand.
    pub idle_yaw_rate: f32,
    pub idle_pitch_amplitude: f32,
    /// Bob cycles per second.
    pub idle_pitch_frequency: f32,
    pub idle_ease: f32,
    /// Scatter amount lost per display frame with no hand.
    pub scatter_decay: f32,
    /// Set when a photo wall is loaded.
    pub focus_enabled: bool,
}

impl Default for ModeConfig {
    fn default() -> Self {
        ModeConfig {
            pitch_scale:          1.2,
            yaw_scale:            2.4,
            rotation_smoothing:   0.1,
            idle_yaw_rate:        0.15,
            idle_pitch_amplitude: 0.08,
            idle_pitch_frequency: 0.1,
            idle_ease:            0.05,
            scatter_decay:        0.02,
            focus_enabled:        false,
        }
    }
}

/// Pointer stand-in for a hand: NDC position (`[-1, 1]`, y up) and the
/// primary button.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerInput {
    pub ndc: Vec2,
    pub pressing: bool,
    /// `false` when the pointer has left the window.
    pub inside: bool,
}

impl PointerInput {
    /// NDC → normalized image coordinates (x right, y down).
    pub fn palm(&self) -> Vec2 {
        Vec2::new((self.ndc.x + 1.0) * 0.5, (1.0 - self.ndc.y) * 0.5)
            .clamp(Vec2::ZERO, Vec2::ONE)
    }
}

/// Everything the display loop needs, copied out under the lock.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModeSnapshot {
    pub mode: Mode,
    /// (pitch, yaw) in radians.
    pub rotation: Vec2,
    /// Target blend for the animator, in [0, 1].
    pub scatter: f32,
    pub hand_present: bool,
    pub gesture: Gesture,
    /// Incremented each time FOCUS is entered.
    pub focus_serial: u64,
}

// ════════════════════════════════════════════════════════════════════════════
// ModeMachine
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ModeMachine {
    config:         ModeConfig,
    classifier:     GestureClassifier,
    mode:           Mode,
    rotation:       Vec2,
    last_timestamp: Option<f64>,
    scatter:        f32,
    hand_present:   bool,
    last_gesture:   Gesture,
    focus_serial:   u64,
    elapsed:        f32,
}

impl ModeMachine {
    pub fn new(config: ModeConfig, classifier: ClassifierConfig) -> Self {
        ModeMachine {
            config,
            classifier:     GestureClassifier::new(classifier),
            mode:           Mode::Tree,
            rotation:       Vec2::ZERO,
            last_timestamp: None,
            scatter:        0.0,
            hand_present:   false,
            last_gesture:   Gesture::None,
            focus_serial:   0,
            elapsed:        0.0,
        }
    }

    pub fn mode(&self) -> Mode { self.mode }
    pub fn config(&self) -> &ModeConfig { &self.config }

    pub fn set_focus_enabled(&mut self, enabled: bool) {
        self.config.focus_enabled = enabled;
        if !enabled && self.mode == Mode::Focus {
            self.transition(Mode::Tree);
        }
    }

    /// Process one detection result.  Returns `false` when the frame's
    /// timestamp has not advanced past the last processed one.
    pub fn observe(&mut self, frame: &LandmarkFrame) -> bool {
        if let Some(last) = self.last_timestamp {
            if frame.timestamp_ms <= last {
                log::debug!("skipping video frame at {:.1} ms (last {:.1} ms)",
                            frame.timestamp_ms, last);
                return false;
            }
        }
        self.last_timestamp = Some(frame.timestamp_ms);

        let hand = frame.detection.first_hand();
        let metrics = hand.and_then(|h| self.classifier.measure(h));
        if hand.is_some() && metrics.is_none() {
            log::warn!("degenerate hand at {:.1} ms treated as absent", frame.timestamp_ms);
        }
        let gesture = metrics
            .map(|m| self.classifier.classify_metrics(&m))
            .unwrap_or(Gesture::None);
        let palm = match (hand, metrics) {
            (Some(h), Some(_)) => Some(h.palm().to_vec2()),
            _ => None,
        };
        self.apply(gesture, palm);
        true
    }

    /// Pointer fallback.  Has no timestamps; every call is a new sample.
    pub fn pointer(&mut self, input: PointerInput) {
        if !input.inside {
            self.apply(Gesture::None, None);
            return;
        }
        let gesture = match (input.pressing, self.config.focus_enabled) {
            (true, true)  => Gesture::Pinch,
            (true, false) => Gesture::Open,
            (false, _)    => Gesture::None,
        };
        self.apply(gesture, Some(input.palm()));
    }

    fn apply(&mut self, gesture: Gesture, palm: Option<Vec2>) {
        self.last_gesture = gesture;
        self.hand_present = palm.is_some();

        let Some(palm) = palm else {
            self.transition(Mode::Tree);
            return;
        };

        let next = match gesture {
            Gesture::Pinch if self.config.focus_enabled => Mode::Focus,
            Gesture::Pinch  => self.mode,
            Gesture::Open   => Mode::Scatter,
            Gesture::Closed => Mode::Tree,
            Gesture::None   => Mode::Tree,
        };
        self.transition(next);

        let target = Vec2::new(
            (palm.y - 0.5) * self.config.pitch_scale,
            (palm.x - 0.5) * self.config.yaw_scale,
        );
        let delta = Vec2::new(target.x - self.rotation.x, wrap_angle(target.y - self.rotation.y));
        self.rotation += delta * self.config.rotation_smoothing;
        self.rotation.y = wrap_angle(self.rotation.y);
    }

    fn transition(&mut self, next: Mode) {
        if next == self.mode {
            return;
        }
        if next == Mode::Focus {
            self.focus_serial += 1;
            log::debug!("focus selection #{}", self.focus_serial);
        }
        log::info!("mode {} → {}", self.mode.name(), next.name());
        self.mode = next;
    }

    /// Advance display-rate state: idle motion and the scatter amount.
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;

        if !self.hand_present {
            let c = &self.config;
            self.rotation.y = wrap_angle(self.rotation.y + c.idle_yaw_rate * dt);
            let bob = (self.elapsed * c.idle_pitch_frequency * TAU).sin() * c.idle_pitch_amplitude;
            self.rotation.x += (bob - self.rotation.x) * c.idle_ease;
        }

        self.scatter = match self.mode {
            Mode::Scatter | Mode::Focus => 1.0,
            Mode::Tree if self.hand_present => 0.0,
            Mode::Tree => (self.scatter - self.config.scatter_decay).max(0.0),
        };
    }

    pub fn snapshot(&self) -> ModeSnapshot {
        ModeSnapshot {
            mode:         self.mode,
            rotation:     self.rotation,
            scatter:      self.scatter,
            hand_present: self.hand_present,
            gesture:      self.last_gesture,
            focus_serial: self.focus_serial,
        }
    }
}

/// Angle folded into [-π, π).
fn wrap_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}

// ════════════════════════════════════════════════════════════════════════════
// ModeHandle — shared between the detection thread and the display loop
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ModeHandle {
    inner: Arc<Mutex<ModeMachine>>,
}

impl ModeHandle {
    pub fn new(config: ModeConfig, classifier: ClassifierConfig) -> Self {
        ModeHandle { inner: Arc::new(Mutex::new(ModeMachine::new(config, classifier))) }
    }

    /// A panicked writer leaves the machine in a valid state, so poisoning
    /// is ignored.
    fn lock(&self) -> MutexGuard<'_, ModeMachine> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn observe(&self, frame: &LandmarkFrame) -> bool { self.lock().observe(frame) }
    pub fn pointer(&self, input: PointerInput) { self.lock().pointer(input) }
    pub fn tick(&self, dt: f32) { self.lock().tick(dt) }
    pub fn snapshot(&self) -> ModeSnapshot { self.lock().snapshot() }
    pub fn set_focus_enabled(&self, enabled: bool) { self.lock().set_focus_enabled(enabled) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
