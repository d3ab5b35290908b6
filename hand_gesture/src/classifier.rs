//! Stateless gesture classification.
//!
//! A finger counts as *extended* when its tip is clearly farther from the
//! wrist than its knuckle is.  The pinch test uses the image-plane distance
//! between thumb tip and index tip, so depth noise from the landmark model
//! cannot break a pinch.
//!
//! Priority, first match wins:
//!
//! | Condition | Gesture |
//! |---|---|
//! | pinch distance < `pinch_threshold` | `Pinch` |
//! | extended ≥ `open_min_extended` | `Open` |
//! | extended ≤ `closed_max_extended` | `Closed` |
//! | otherwise | `None` (ambiguous) |

use serde::{Deserialize, Serialize};

use crate::{Hand, FINGERS, INDEX_TIP, PALM, THUMB_TIP, WRIST};

/// Below this wrist→palm span the hand is treated as collapsed.
const MIN_PALM_SPAN: f32 = 1e-4;

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gesture {
    /// No hand, a degenerate hand, or an ambiguous pose.
    #[default]
    None,
    /// Three or more fingers extended.
    Open,
    /// At most one finger extended.
    Closed,
    /// Thumb tip touching index tip.
    Pinch,
}

impl Gesture {
    pub fn name(self) -> &'static str {
        match self {
            Gesture::None   => "none",
            Gesture::Open   => "open",
            Gesture::Closed => "fist",
            Gesture::Pinch  => "pinch",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ClassifierConfig
// ════════════════════════════════════════════════════════════════════════════

/// Thresholds for [`GestureClassifier`].  The defaults are the canonical tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Tip must be this many times farther from the wrist than the knuckle.
    pub extension_ratio: f32,
    /// Normalized image-plane distance for a pinch.
    pub pinch_threshold: f32,
    pub open_min_extended: usize,
    pub closed_max_extended: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            extension_ratio:     1.5,
            pinch_threshold:     0.05,
            open_min_extended:   3,
            closed_max_extended: 1,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandMetrics
// ════════════════════════════════════════════════════════════════════════════

/// Raw measurements behind a classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandMetrics {
    /// Index, middle, ring, pinky.
    pub extended: [bool; 4],
    pub extended_count: usize,
    pub pinch_distance: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default)]
pub struct GestureClassifier {
    pub config: ClassifierConfig,
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        GestureClassifier { config }
    }

    /// Measure a hand.  Returns `None` for degenerate input (non-finite
    /// coordinates or a collapsed palm).
    pub fn measure(&self, hand: &Hand) -> Option<HandMetrics> {
        if !hand.is_finite() {
            return None;
        }
        let wrist = hand.landmark(WRIST);
        if wrist.distance(hand.landmark(PALM)) < MIN_PALM_SPAN {
            return None;
        }

        let mut extended = [false; 4];
        for (slot, &(tip, mcp)) in extended.iter_mut().zip(FINGERS.iter()) {
            let d_tip = hand.landmark(tip).distance(wrist);
            let d_mcp = hand.landmark(mcp).distance(wrist);
            *slot = d_tip > d_mcp * self.config.extension_ratio;
        }
        let extended_count = extended.iter().filter(|&&e| e).count();
        let pinch_distance = hand.landmark(THUMB_TIP).planar_distance(hand.landmark(INDEX_TIP));

        Some(HandMetrics { extended, extended_count, pinch_distance })
    }

    /// Classify one hand, or the absence of one.
    pub fn classify(&self, hand: Option<&Hand>) -> Gesture {
        match hand.and_then(|h| self.measure(h)) {
            Some(m) => self.classify_metrics(&m),
            None    => Gesture::None,
        }
    }

    pub fn classify_metrics(&self, m: &HandMetrics) -> Gesture {
        let cfg = &self.config;
        if m.pinch_distance < cfg.pinch_threshold {
            Gesture::Pinch
        } else if m.extended_count >= cfg.open_min_extended {
            Gesture::Open
        } else if m.extended_count <= cfg.closed_max_extended {
            Gesture::Closed
        } else {
            Gesture::None
        }
    }
}

/// Classify with the default thresholds.
pub fn classify(hand: Option<&Hand>) -> Gesture {
    GestureClassifier::default().classify(hand)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
