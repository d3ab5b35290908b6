//! Detection scheduling.
//!
//! [`Detector::pump`] is one step: poll the source, feed the frame to the
//! shared [`ModeHandle`].  Tests call it directly; the app runs it on a
//! background thread through [`DetectionLoop::start`], which returns a
//! [`DetectionTask`] that stops and joins on request (or on drop).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::mode::ModeHandle;
use crate::source::LandmarkSource;

/// Outcome of one [`Detector::pump`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pump {
    /// The source had nothing to offer.
    Idle,
    /// The frame's timestamp had not advanced; it was dropped.
    Skipped,
    Processed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetectorStats {
    pub processed: u64,
    pub skipped: u64,
}

pub struct Detector {
    source: Box<dyn LandmarkSource>,
    handle: ModeHandle,
    stats:  DetectorStats,
}

impl Detector {
    pub fn new(source: Box<dyn LandmarkSource>, handle: ModeHandle) -> Self {
        Detector { source, handle, stats: DetectorStats::default() }
    }

    pub fn pump(&mut self) -> Pump {
        let Some(frame) = self.source.poll() else { return Pump::Idle };
        if self.handle.observe(&frame) {
            self.stats.processed += 1;
            Pump::Processed
        } else {
            self.stats.skipped += 1;
            Pump::Skipped
        }
    }

    pub fn stats(&self) -> DetectorStats { self.stats }
    pub fn source_name(&self) -> &str { self.source.name() }
}

// ════════════════════════════════════════════════════════════════════════════
// DetectionLoop / DetectionTask
// ════════════════════════════════════════════════════════════════════════════

/// Background loop: pump until stopped, sleeping `idle` whenever a pump
/// produced nothing new.
pub struct DetectionLoop {
    detector: Detector,
    stop:     Arc<AtomicBool>,
    idle:     Duration,
}

impl DetectionLoop {
    pub fn start(detector: Detector, idle: Duration) -> DetectionTask {
        let stop = Arc::new(AtomicBool::new(false));
        log::info!("detection started on {}", detector.source_name());
        let worker = DetectionLoop { detector, stop: stop.clone(), idle };
        let thread = thread::spawn(move || worker.run());
        DetectionTask { stop, thread: Some(thread) }
    }

    fn run(mut self) -> Detector {
        while !self.stop.load(Ordering::Relaxed) {
            if self.detector.pump() != Pump::Processed {
                thread::sleep(self.idle);
            }
        }
        self.detector
    }
}

/// Handle to a running [`DetectionLoop`].
pub struct DetectionTask {
    stop:   Arc<AtomicBool>,
    thread: Option<JoinHandle<Detector>>,
}

impl DetectionTask {
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal the loop and wait for it.  Returns the detector, or `None` if
    /// the thread panicked.
    pub fn stop(mut self) -> Option<Detector> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<Detector> {
        self.stop.store(true, Ordering::Relaxed);
        let detector = self.thread.take()?.join().ok();
        match &detector {
            Some(d) => log::info!(
                "detection stopped: {} frames processed, {} skipped",
                d.stats.processed, d.stats.skipped
            ),
            None => log::error!("detection thread panicked"),
        }
        detector
    }
}

impl Drop for DetectionTask {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{Mode, ModeConfig};
    use crate::source::ScriptedSource;
    use hand_gesture::synth::Pose;
    use hand_gesture::ClassifierConfig;

    fn handle() -> ModeHandle {
        ModeHandle::new(ModeConfig::default(), ClassifierConfig::default())
    }

    #[test]
    fn pump_reports_each_outcome() {
        let h = handle();
        let script = ScriptedSource::from_poses(&[
            (0.0, Some(Pose::Open)),
            (0.0, Some(Pose::Fist)),
            (33.0, Some(Pose::Fist)),
        ]);
        let mut d = Detector::new(Box::new(script), h.clone());
        assert_eq!(d.pump(), Pump::Processed);
        assert_eq!(h.snapshot().mode, Mode::Scatter);
        assert_eq!(d.pump(), Pump::Skipped);
        assert_eq!(h.snapshot().mode, Mode::Scatter);
        assert_eq!(d.pump(), Pump::Processed);
        assert_eq!(h.snapshot().mode, Mode::Tree);
        assert_eq!(d.pump(), Pump::Idle);
        assert_eq!(d.stats(), DetectorStats { processed: 2, skipped: 1 });
    }

    #[test]
    fn task_stops_and_returns_detector() {
        let h = handle();
        let script = ScriptedSource::from_poses(&[(5.0, Some(Pose::Open))]);
        let task = DetectionLoop::start(Detector::new(Box::new(script), h.clone()), Duration::from_millis(1));
        for _ in 0..500 {
            if h.snapshot().mode == Mode::Scatter {
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }
        assert!(task.is_running());
        let d = task.stop().expect("detector back");
        assert_eq!(d.stats().processed, 1);
        assert_eq!(h.snapshot().mode, Mode::Scatter);
    }
}
