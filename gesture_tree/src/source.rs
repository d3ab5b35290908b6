//! Landmark sources — the camera side of the pipeline.
//!
//! A [`LandmarkSource`] is polled without blocking and hands back the most
//! recent detection together with its video timestamp.  Consumers don't
//! need to know whether hands came from a LeapMotion controller, the
//! keyboard simulator or a fixed script.

use std::collections::VecDeque;
use std::fmt;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use glam::Vec2;
use hand_gesture::synth::{pose_hand, Pose};
use hand_gesture::Detection;
use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// LandmarkFrame / LandmarkSource
// ════════════════════════════════════════════════════════════════════════════

/// One detection result.  `detection.hands` is empty when no hand was seen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkFrame {
    /// Presentation time of the video frame, in milliseconds.
    pub timestamp_ms: f64,
    pub detection: Detection,
}

/// Anything that can deliver [`LandmarkFrame`]s.
pub trait LandmarkSource: Send + 'static {
    /// The latest frame, or `None` if nothing is available right now.
    /// May return the same timestamp more than once.
    fn poll(&mut self) -> Option<LandmarkFrame>;

    fn name(&self) -> &str;
}

// ════════════════════════════════════════════════════════════════════════════
// Input mode / errors / factory
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Keyboard-driven synthetic hands.
    #[default]
    Simulated,
    /// Mouse position and button instead of hands.
    Pointer,
    /// LeapMotion controller (needs the `leap` feature).
    Leap,
}

#[derive(Debug)]
pub enum SourceError {
    /// The binary was built without support for this source.
    Unavailable(&'static str),
    /// The device or runtime refused to open.
    Open(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unavailable(what) => write!(f, "landmark source unavailable: {}", what),
            SourceError::Open(msg)         => write!(f, "landmark source failed to open: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

/// Open the source for `mode`.  `Ok(None)` means pointer input.
///
/// `sim` is the receiving end of the window's simulation channel; it is only
/// consumed by [`InputMode::Simulated`].
pub fn open_source(
    mode: &InputMode,
    camera_fps: f32,
    sim: Receiver<SimInput>,
) -> Result<Option<Box<dyn LandmarkSource>>, SourceError> {
    match mode {
        InputMode::Pointer   => Ok(None),
        InputMode::Simulated => Ok(Some(Box::new(SimLandmarkSource::new(sim, camera_fps)))),
        InputMode::Leap      => open_leap(),
    }
}

#[cfg(feature = "leap")]
fn open_leap() -> Result<Option<Box<dyn LandmarkSource>>, SourceError> {
    Ok(Some(Box::new(LeapLandmarkSource::open()?)))
}

#[cfg(not(feature = "leap"))]
fn open_leap() -> Result<Option<Box<dyn LandmarkSource>>, SourceError> {
    Err(SourceError::Unavailable("built without the `leap` feature"))
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource — keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    Pose(Pose),
    ToggleHand,
    /// Move the palm by a delta in normalized image units.
    MovePalm(Vec2),
}

/// Produces synthetic hands at a fixed camera rate.
///
/// Timestamps are quantized to the camera's frame period, so polling faster
/// than the camera yields repeated timestamps, exactly like reading the
/// current time of a live video element.
pub struct SimLandmarkSource {
    rx:      Receiver<SimInput>,
    pose:    Pose,
    palm:    Vec2,
    visible: bool,
    period:  f64,
    clock:   Box<dyn FnMut() -> f64 + Send>,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimInput>, fps: f32) -> Self {
        let start = Instant::now();
        Self::with_clock(rx, fps, move || start.elapsed().as_secs_f64() * 1000.0)
    }

    /// Use `clock` (milliseconds) instead of wall time.
    pub fn with_clock(
        rx: Receiver<SimInput>,
        fps: f32,
        clock: impl FnMut() -> f64 + Send + 'static,
    ) -> Self {
        SimLandmarkSource {
            rx,
            pose:    Pose::Fist,
            palm:    Vec2::new(0.5, 0.5),
            visible: false,
            period:  1000.0 / fps.max(1.0) as f64,
            clock:   Box::new(clock),
        }
    }

    fn drain(&mut self) {
        while let Ok(input) = self.rx.try_recv() {
            match input {
                SimInput::Pose(p) => {
                    self.pose = p;
                    self.visible = true;
                }
                SimInput::ToggleHand  => self.visible = !self.visible,
                SimInput::MovePalm(d) => {
                    self.palm = (self.palm + d).clamp(Vec2::splat(0.15), Vec2::splat(0.85));
                }
            }
        }
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn poll(&mut self) -> Option<LandmarkFrame> {
        self.drain();
        let now = (self.clock)();
        let timestamp_ms = (now / self.period).floor() * self.period;
        let detection = if self.visible {
            Detection::single(pose_hand(self.pose, self.palm))
        } else {
            Detection::empty()
        };
        Some(LandmarkFrame { timestamp_ms, detection })
    }

    fn name(&self) -> &str { "simulated camera" }
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedSource — fixed frame list
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<LandmarkFrame>,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = LandmarkFrame>) -> Self {
        ScriptedSource { frames: frames.into_iter().collect() }
    }

    /// `(timestamp, pose)` pairs; `None` is an empty detection.  Palms sit
    /// at the image centre.
    pub fn from_poses(script: &[(f64, Option<Pose>)]) -> Self {
        Self::new(script.iter().map(|&(timestamp_ms, pose)| LandmarkFrame {
            timestamp_ms,
            detection: pose
                .map(|p| Detection::single(pose_hand(p, Vec2::new(0.5, 0.5))))
                .unwrap_or_default(),
        }))
    }

    pub fn remaining(&self) -> usize { self.frames.len() }
}

impl LandmarkSource for ScriptedSource {
    fn poll(&mut self) -> Option<LandmarkFrame> { self.frames.pop_front() }

    fn name(&self) -> &str { "script" }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapLandmarkSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Hands from a LeapMotion controller, remapped to the 21-point layout.
///
/// The LeapC connection lives on its own thread; `poll` drains the channel
/// and keeps only the newest frame.  Leap reports millimetres above the
/// device, which are normalized over a box of `LEAP_SPAN_MM` centred on the
/// device, with y flipped so "up" is toward 0.
#[cfg(feature = "leap")]
pub struct LeapLandmarkSource {
    rx: Receiver<LandmarkFrame>,
}

#[cfg(feature = "leap")]
const LEAP_SPAN_MM: f32 = 400.0;
#[cfg(feature = "leap")]
const LEAP_FLOOR_MM: f32 = 50.0;

#[cfg(feature = "leap")]
impl LeapLandmarkSource {
    /// Blocks until the device has opened (or failed to).
    pub fn open() -> Result<Self, SourceError> {
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || leap_thread(ready_tx, tx));
        ready_rx
            .recv()
            .map_err(|_| SourceError::Open("LeapC thread exited".to_string()))??;
        log::info!("LeapMotion connection open");
        Ok(LeapLandmarkSource { rx })
    }
}

#[cfg(feature = "leap")]
fn leap_thread(
    ready: std::sync::mpsc::Sender<Result<(), SourceError>>,
    tx: std::sync::mpsc::Sender<LandmarkFrame>,
) {
    use leaprs::{Connection, ConnectionConfig, Event};

    let mut connection = match Connection::create(ConnectionConfig::default()) {
        Ok(c)  => c,
        Err(e) => {
            let _ = ready.send(Err(SourceError::Open(format!("LeapC connection: {:?}", e))));
            return;
        }
    };
    if let Err(e) = connection.open() {
        let _ = ready.send(Err(SourceError::Open(format!("LeapMotion device: {:?}", e))));
        return;
    }
    let _ = ready.send(Ok(()));

    let start = Instant::now();
    loop {
        let msg = match connection.poll(100) {
            Ok(m)  => m,
            Err(_) => continue,
        };
        if let Event::Tracking(frame) = msg.event() {
            let hands = frame.hands().filter_map(|h| leap_hand(&h)).collect();
            let frame = LandmarkFrame {
                timestamp_ms: start.elapsed().as_secs_f64() * 1000.0,
                detection: Detection { hands },
            };
            if tx.send(frame).is_err() {
                return;
            }
        }
    }
}

#[cfg(feature = "leap")]
fn leap_hand(hand: &leaprs::Hand) -> Option<hand_gesture::Hand> {
    use hand_gesture::{Hand, Landmark, LANDMARK_COUNT, WRIST};

    let digits: Vec<_> = hand.digits().collect();
    if digits.len() < 5 {
        return None;
    }
    let mut pts = [Landmark::default(); LANDMARK_COUNT];
    let mut wrist = glam::Vec3::ZERO;
    // Thumb CMC..TIP, then each finger MCP..TIP: four joints per digit.
    for (d, digit) in digits.iter().take(5).enumerate() {
        let joints = digit_joints(digit);
        wrist += joints[0].to_vec3();
        pts[1 + d * 4..5 + d * 4].copy_from_slice(&joints[1..]);
    }
    // Wrist: mean of the metacarpal bases.
    pts[WRIST] = (wrist / 5.0).into();
    Some(Hand::new(pts))
}

#[cfg(feature = "leap")]
fn leap_landmark(x: f32, y: f32, z: f32) -> hand_gesture::Landmark {
    hand_gesture::Landmark::new(
        (x + LEAP_SPAN_MM * 0.5) / LEAP_SPAN_MM,
        1.0 - (y - LEAP_FLOOR_MM) / LEAP_SPAN_MM,
        z / LEAP_SPAN_MM,
    )
}

/// Metacarpal base, then the far joint of each of the four bones.
#[cfg(feature = "leap")]
fn digit_joints(digit: &leaprs::Digit) -> [hand_gesture::Landmark; 5] {
    let base = digit.metacarpal().prev_joint();
    let mcp  = digit.metacarpal().next_joint();
    let pip  = digit.proximal().next_joint();
    let dip  = digit.intermediate().next_joint();
    let tip  = digit.distal().next_joint();
    [
        leap_landmark(base.x, base.y, base.z),
        leap_landmark(mcp.x, mcp.y, mcp.z),
        leap_landmark(pip.x, pip.y, pip.z),
        leap_landmark(dip.x, dip.y, dip.z),
        leap_landmark(tip.x, tip.y, tip.z),
    ]
}

#[cfg(feature = "leap")]
impl LandmarkSource for LeapLandmarkSource {
    fn poll(&mut self) -> Option<LandmarkFrame> {
        let mut latest = None;
        while let Ok(frame) = self.rx.try_recv() {
            latest = Some(frame);
        }
        latest
    }

    fn name(&self) -> &str { "LeapMotion" }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::mpsc;
    use std::sync::Arc;

    fn manual_clock() -> (Arc<AtomicU64>, impl FnMut() -> f64 + Send + 'static) {
        let ms = Arc::new(AtomicU64::new(0));
        let reader = ms.clone();
        (ms, move || reader.load(Ordering::SeqCst) as f64)
    }

    #[test]
    fn sim_starts_without_a_hand() {
        let (_tx, rx) = mpsc::channel();
        let mut src = SimLandmarkSource::new(rx, 30.0);
        let frame = src.poll().expect("sim always yields");
        assert!(frame.detection.is_empty());
    }

    #[test]
    fn sim_pose_key_shows_the_hand() {
        let (tx, rx) = mpsc::channel();
        let mut src = SimLandmarkSource::new(rx, 30.0);
        tx.send(SimInput::Pose(Pose::Open)).unwrap();
        let frame = src.poll().unwrap();
        let hand = frame.detection.first_hand().expect("hand");
        assert_eq!(hand_gesture::classify(Some(hand)), hand_gesture::Gesture::Open);

        tx.send(SimInput::ToggleHand).unwrap();
        assert!(src.poll().unwrap().detection.is_empty());
    }

    #[test]
    fn sim_timestamps_repeat_between_camera_frames() {
        let (_tx, rx) = mpsc::channel();
        let (ms, clock) = manual_clock();
        let mut src = SimLandmarkSource::with_clock(rx, 25.0, clock);

        ms.store(10, Ordering::SeqCst);
        let a = src.poll().unwrap().timestamp_ms;
        ms.store(30, Ordering::SeqCst);
        let b = src.poll().unwrap().timestamp_ms;
        ms.store(41, Ordering::SeqCst);
        let c = src.poll().unwrap().timestamp_ms;
        assert_eq!(a, 0.0);
        assert_eq!(b, 0.0);
        assert_eq!(c, 40.0);
    }

    #[test]
    fn sim_palm_stays_in_frame() {
        let (tx, rx) = mpsc::channel();
        let mut src = SimLandmarkSource::new(rx, 30.0);
        tx.send(SimInput::Pose(Pose::Fist)).unwrap();
        for _ in 0..50 {
            tx.send(SimInput::MovePalm(Vec2::new(0.1, -0.1))).unwrap();
        }
        let frame = src.poll().unwrap();
        let palm = frame.detection.first_hand().unwrap().palm();
        assert_eq!((palm.x, palm.y), (0.85, 0.15));
    }

    #[test]
    fn script_replays_in_order() {
        let mut src = ScriptedSource::from_poses(&[(0.0, Some(Pose::Open)), (33.0, None)]);
        assert_eq!(src.remaining(), 2);
        assert_eq!(src.poll().unwrap().detection.hands.len(), 1);
        let second = src.poll().unwrap();
        assert_eq!(second.timestamp_ms, 33.0);
        assert!(second.detection.is_empty());
        assert!(src.poll().is_none());
    }

    #[test]
    fn pointer_mode_has_no_landmark_source() {
        let (_tx, rx) = mpsc::channel();
        assert!(open_source(&InputMode::Pointer, 30.0, rx).unwrap().is_none());
    }

    #[cfg(not(feature = "leap"))]
    #[test]
    fn leap_without_feature_reports_unavailable() {
        let (_tx, rx) = mpsc::channel();
        let err = open_source(&InputMode::Leap, 30.0, rx).err().expect("should fail");
        assert!(matches!(err, SourceError::Unavailable(_)));
        assert!(err.to_string().contains("leap"));
    }

    #[test]
    fn input_mode_parses_lowercase() {
        let m: InputMode = serde_json::from_str("\"pointer\"").unwrap();
        assert_eq!(m, InputMode::Pointer);
    }
}
