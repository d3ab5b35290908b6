//! Synthetic hands.
//!
//! Builds plausible 21-point hands for a handful of poses so the simulated
//! camera, the probes and the tests can exercise the classifier without a
//! landmark model.  Proportions roughly match an adult hand filling a fifth
//! of a 640×480 frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Wrist → knuckle span in normalized image units.
const PALM_SPAN: f32 = 0.1;

/// Knuckle offsets from the palm centre (middle MCP), image y points down.
const KNUCKLES: [(usize, Vec2); 4] = [
    (INDEX_MCP,  Vec2::new(-0.030, 0.005)),
    (MIDDLE_MCP, Vec2::new( 0.000, 0.000)),
    (RING_MCP,   Vec2::new( 0.028, 0.006)),
    (PINKY_MCP,  Vec2::new( 0.052, 0.016)),
];

/// Distances of PIP, DIP and TIP beyond the knuckle for a straight finger.
const STRAIGHT: [f32; 3] = [0.040, 0.068, 0.090];

/// Offsets of the thumb chain from the wrist (CMC, MCP, IP, TIP).
const THUMB: [Vec2; 4] = [
    Vec2::new(-0.030, -0.020),
    Vec2::new(-0.058, -0.042),
    Vec2::new(-0.082, -0.062),
    Vec2::new(-0.100, -0.080),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pose {
    /// All four fingers straight.
    Open,
    /// All four fingers curled.
    Fist,
    /// Thumb tip on index tip, other fingers straight.
    Pinch,
    /// Index and middle straight, ring and pinky curled.
    TwoFingers,
}

impl Pose {
    pub fn all() -> [Pose; 4] { [Pose::Open, Pose::Fist, Pose::Pinch, Pose::TwoFingers] }

    pub fn name(self) -> &'static str {
        match self {
            Pose::Open       => "open",
            Pose::Fist       => "fist",
            Pose::Pinch      => "pinch",
            Pose::TwoFingers => "two fingers",
        }
    }

    fn straight(self) -> [bool; 4] {
        match self {
            Pose::Open | Pose::Pinch => [true; 4],
            Pose::Fist               => [false; 4],
            Pose::TwoFingers         => [true, true, false, false],
        }
    }
}

/// Build a hand in `pose` whose palm centre sits at `palm` (normalized).
pub fn pose_hand(pose: Pose, palm: Vec2) -> Hand {
    let mut pts = [Landmark::default(); LANDMARK_COUNT];
    let wrist = palm + Vec2::new(0.0, PALM_SPAN);
    pts[WRIST] = planar(wrist, 0.0);

    for ((mcp, offset), straight) in KNUCKLES.iter().zip(pose.straight()) {
        let knuckle = palm + *offset;
        let dir = (knuckle - wrist).normalize_or_zero();
        pts[*mcp] = planar(knuckle, 0.0);

        let chain: [Vec2; 3] = if straight {
            STRAIGHT.map(|d| knuckle + dir * d)
        } else {
            // Folded back over the palm: PIP forward, DIP above, tip tucked in.
            [
                knuckle + dir * 0.030,
                knuckle + dir * 0.012,
                knuckle - dir * 0.020,
            ]
        };
        let depth = if straight { -0.010 } else { 0.015 };
        for (k, p) in chain.iter().enumerate() {
            pts[mcp + 1 + k] = planar(*p, depth * (k + 1) as f32 / 3.0);
        }
    }

    for (k, offset) in THUMB.iter().enumerate() {
        pts[THUMB_CMC + k] = planar(wrist + *offset, -0.005 * k as f32);
    }
    if pose == Pose::Pinch {
        let index_tip = pts[INDEX_TIP].to_vec2();
        let ip = pts[THUMB_MCP].to_vec2().lerp(index_tip, 0.6);
        pts[THUMB_IP]  = planar(ip, -0.012);
        pts[THUMB_TIP] = planar(index_tip + Vec2::new(0.012, 0.006), -0.010);
    }

    Hand::new(pts)
}

fn planar(p: Vec2, z: f32) -> Landmark { Landmark::new(p.x, p.y, z) }

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn palm_lands_where_asked() {
        let hand = pose_hand(Pose::Open, Vec2::new(0.3, 0.7));
        assert_relative_eq!(hand.palm().x, 0.3);
        assert_relative_eq!(hand.palm().y, 0.7);
    }

    #[test]
    fn poses_stay_inside_frame_near_centre() {
        for pose in Pose::all() {
            let hand = pose_hand(pose, Vec2::new(0.5, 0.5));
            for l in hand.landmarks() {
                assert!((0.0..=1.0).contains(&l.x) && (0.0..=1.0).contains(&l.y),
                        "{} landmark out of frame: {:?}", pose.name(), l);
            }
        }
    }

    #[test]
    fn fist_thumb_is_not_a_pinch() {
        let hand = pose_hand(Pose::Fist, Vec2::new(0.5, 0.5));
        let d = hand.landmark(THUMB_TIP).planar_distance(hand.landmark(INDEX_TIP));
        assert!(d > 0.06, "thumb too close to curled index: {}", d);
    }
}
