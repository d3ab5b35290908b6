//! gesture_probe — classify hands from a JSON landmark dump.
//!
//! ```text
//! gesture_probe hands.json      # [[{x,y,z} ×21], …]  or  {"hands": [...]}
//! gesture_probe --demo          # classify the built-in synthetic poses
//! ```

use std::io::{self, Read};

use glam::Vec2;
use hand_gesture::synth::{pose_hand, Pose};
use hand_gesture::{Detection, GestureClassifier, Hand};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║                  Hand Gesture Probe                      ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let classifier = GestureClassifier::default();

    let hands: Vec<Hand> = if args.iter().any(|a| a == "--demo") {
        Pose::all().iter().map(|&p| pose_hand(p, Vec2::new(0.5, 0.5))).collect()
    } else {
        let text = match read_input(args.first().map(String::as_str)) {
            Ok(t)  => t,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };
        match parse_hands(&text) {
            Ok(h)  => h,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    };

    if hands.is_empty() {
        println!("  No hands in input → {}", classifier.classify(None).name());
        return;
    }

    for (i, hand) in hands.iter().enumerate() {
        match classifier.measure(hand) {
            Some(m) => {
                let fingers: String = m.extended.iter()
                    .map(|&e| if e { '|' } else { '.' })
                    .collect();
                println!(
                    "  [{:>2}]  {:<6}  fingers {}  ({} extended)  pinch={:.3}  palm=({:.2}, {:.2})",
                    i,
                    classifier.classify_metrics(&m).name(),
                    fingers,
                    m.extended_count,
                    m.pinch_distance,
                    hand.palm().x,
                    hand.palm().y,
                );
            }
            None => {
                log::warn!("hand {} is degenerate, treated as absent", i);
                println!("  [{:>2}]  {:<6}  (degenerate)", i, classifier.classify(None).name());
            }
        }
    }
    println!();
}

fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Accepts either a bare array of hands or a `Detection` object.
fn parse_hands(text: &str) -> Result<Vec<Hand>, serde_json::Error> {
    match serde_json::from_str::<Vec<Hand>>(text) {
        Ok(hands) => Ok(hands),
        Err(_)    => serde_json::from_str::<Detection>(text).map(|d| d.hands),
    }
}
