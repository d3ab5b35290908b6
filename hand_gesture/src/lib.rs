//! # hand_gesture
//!
//! 21-point hand landmarks (the layout produced by common palm/hand landmark
//! models) and a stateless classifier that reduces one hand to a [`Gesture`].
//!
//! ## Landmark layout
//!
//! ```text
//!              8   12  16  20        tips
//!              |   |   |   |
//!       4      7   11  15  19
//!       |      |   |   |   |
//!       3      6   10  14  18
//!        \     |   |   |   |
//!         2    5---9---13--17        knuckles (MCP)
//!          \    \  |   |  /
//!           1    \ |   | /
//!            \____\|___|/
//!                  0                 wrist
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use hand_gesture::{classify, synth::{pose_hand, Pose}, Gesture};
//! use glam::Vec2;
//!
//! let hand = pose_hand(Pose::Open, Vec2::new(0.5, 0.5));
//! assert_eq!(classify(Some(&hand)), Gesture::Open);
//! assert_eq!(classify(None), Gesture::None);
//! ```

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

pub mod classifier;
pub mod synth;

pub use classifier::{classify, ClassifierConfig, Gesture, GestureClassifier, HandMetrics};

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// (tip, knuckle) pairs for the four non-thumb fingers, index first.
pub const FINGERS: [(usize, usize); 4] = [
    (INDEX_TIP,  INDEX_MCP),
    (MIDDLE_TIP, MIDDLE_MCP),
    (RING_TIP,   RING_MCP),
    (PINKY_TIP,  PINKY_MCP),
];

/// Landmark used as the palm centre for rotation control.
pub const PALM: usize = MIDDLE_MCP;

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One keypoint. `x`/`y` are normalized to the camera frame (0..1, y down);
/// `z` is depth relative to the wrist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    pub fn to_vec3(self) -> Vec3 { Vec3::new(self.x, self.y, self.z) }
    pub fn to_vec2(self) -> Vec2 { Vec2::new(self.x, self.y) }

    /// Euclidean distance in all three axes.
    pub fn distance(self, other: Landmark) -> f32 {
        self.to_vec3().distance(other.to_vec3())
    }

    /// Euclidean distance in the image plane only (z ignored).
    pub fn planar_distance(self, other: Landmark) -> f32 {
        self.to_vec2().distance(other.to_vec2())
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Vec3> for Landmark {
    fn from(v: Vec3) -> Self { Landmark::new(v.x, v.y, v.z) }
}

// ════════════════════════════════════════════════════════════════════════════
// HandError
// ════════════════════════════════════════════════════════════════════════════

/// Why a landmark sequence could not become a [`Hand`].
#[derive(Clone, Debug, PartialEq)]
pub enum HandError {
    /// The detector returned the wrong number of keypoints.
    WrongCount(usize),
    /// A coordinate was NaN or infinite.
    NonFinite { index: usize },
    /// The input could not be parsed at all.
    Parse(String),
}

impl fmt::Display for HandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandError::WrongCount(n) =>
                write!(f, "expected {} landmarks, got {}", LANDMARK_COUNT, n),
            HandError::NonFinite { index } =>
                write!(f, "landmark {} has a non-finite coordinate", index),
            HandError::Parse(msg) => write!(f, "could not parse hand data: {}", msg),
        }
    }
}

impl std::error::Error for HandError {}

// ════════════════════════════════════════════════════════════════════════════
// Hand
// ════════════════════════════════════════════════════════════════════════════

/// Exactly 21 landmarks in anatomical order.
///
/// A `Hand` has no identity across frames; each detection call produces
/// fresh values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hand {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl Hand {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Hand { landmarks }
    }

    /// Build a hand from a detector's output, validating count and finiteness.
    pub fn from_slice(points: &[Landmark]) -> Result<Self, HandError> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| HandError::WrongCount(points.len()))?;
        if let Some(index) = landmarks.iter().position(|l| !l.is_finite()) {
            return Err(HandError::NonFinite { index });
        }
        Ok(Hand { landmarks })
    }

    /// Parse a JSON array of `{x, y, z}` objects.
    pub fn from_json(text: &str) -> Result<Self, HandError> {
        let points: Vec<Landmark> =
            serde_json::from_str(text).map_err(|e| HandError::Parse(e.to_string()))?;
        Hand::from_slice(&points)
    }

    pub fn landmark(&self, index: usize) -> Landmark { self.landmarks[index] }
    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] { &self.landmarks }

    pub fn wrist(&self) -> Landmark { self.landmarks[WRIST] }
    pub fn palm(&self) -> Landmark { self.landmarks[PALM] }

    pub fn is_finite(&self) -> bool {
        self.landmarks.iter().all(|l| l.is_finite())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Detection — one call's worth of hands
// ════════════════════════════════════════════════════════════════════════════

/// Result of running the landmark model on one video frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub hands: Vec<Hand>,
}

impl Detection {
    pub fn empty() -> Self { Detection::default() }

    pub fn single(hand: Hand) -> Self { Detection { hands: vec![hand] } }

    /// Only the first hand drives the display.
    pub fn first_hand(&self) -> Option<&Hand> { self.hands.first() }

    pub fn is_empty(&self) -> bool { self.hands.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn planar_distance_ignores_depth() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(0.3, 0.4, 5.0);
        assert_relative_eq!(a.planar_distance(b), 0.5, epsilon = 1e-6);
        assert!(a.distance(b) > 5.0);
    }

    #[test]
    fn from_slice_rejects_wrong_count() {
        let pts = vec![Landmark::default(); 20];
        assert_eq!(Hand::from_slice(&pts), Err(HandError::WrongCount(20)));
    }

    #[test]
    fn from_slice_rejects_nan() {
        let mut pts = vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        pts[7].y = f32::NAN;
        assert_eq!(Hand::from_slice(&pts), Err(HandError::NonFinite { index: 7 }));
    }

    #[test]
    fn from_json_round_trip_shape() {
        let pts: Vec<String> = (0..LANDMARK_COUNT)
            .map(|i| format!("{{\"x\":{},\"y\":0.5,\"z\":0.0}}", i as f32 / 100.0))
            .collect();
        let json = format!("[{}]", pts.join(","));
        let hand = Hand::from_json(&json).unwrap();
        assert_relative_eq!(hand.landmark(20).x, 0.2, epsilon = 1e-6);
        assert_eq!(hand.palm(), hand.landmark(MIDDLE_MCP));
    }

    #[test]
    fn from_json_reports_parse_errors() {
        assert!(matches!(Hand::from_json("not json"), Err(HandError::Parse(_))));
    }

    #[test]
    fn detection_first_hand() {
        assert!(Detection::empty().first_hand().is_none());
        let hand = Hand::new([Landmark::new(0.1, 0.2, 0.0); LANDMARK_COUNT]);
        let det = Detection::single(hand.clone());
        assert_eq!(det.first_hand(), Some(&hand));
    }
}
