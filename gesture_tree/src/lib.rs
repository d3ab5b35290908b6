//! # gesture_tree
//!
//! A glowing particle tree steered by one hand.  An open palm blows it
//! apart into a slowly churning shell; a fist (or no hand at all) pulls it
//! back into the cone.  With a photo directory, a pinch lifts one of the
//! photo-frame particles out of the tree and holds it in front of the
//! camera.
//!
//! ## Gesture → Mode mapping
//!
//! | Gesture | Mode | Field |
//! |---|---|---|
//! | Open hand | `Scatter` | blend → 1 |
//! | Fist / unrecognised | `Tree` | blend → 0 |
//! | Pinch (photos loaded) | `Focus` | blend → 1, next photo presented |
//! | Pinch (no photos) | unchanged | |
//! | No hand | `Tree` | idle spin, blend decays |
//!
//! Palm position tilts and turns the view while a hand is present.
//!
//! ## Threads
//!
//! Landmark detection runs on its own thread ([`detection::DetectionLoop`])
//! and writes into a shared [`mode::ModeHandle`]; the window thread reads a
//! snapshot every frame.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: keyboard keys pose a synthetic hand.
//! * `leap` — **Hardware mode**: hands from a LeapMotion controller via LeapC.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Effect |
//! |---|---|
//! | `H` | Show / hide the hand |
//! | `O` | Open hand |
//! | `F` | Fist |
//! | `P` | Pinch |
//! | `N` | Two fingers (no gesture) |
//! | Arrows / hold | Move the palm |
//! | `Q` / `Escape` | Quit |

pub mod app;
pub mod config;
pub mod detection;
pub mod mode;
pub mod photo;
pub mod source;
pub mod visualizer;

pub use app::{run, AppState};
pub use config::{AppConfig, ConfigError, ViewConfig};
pub use detection::{DetectionLoop, DetectionTask, Detector, DetectorStats, Pump};
pub use mode::{Mode, ModeConfig, ModeHandle, ModeMachine, ModeSnapshot, PointerInput};
pub use photo::{Photo, PhotoWall};
pub use source::{open_source, InputMode, LandmarkFrame, LandmarkSource, ScriptedSource, SimInput, SimLandmarkSource, SourceError};
