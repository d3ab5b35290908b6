//! gesture_tree — interactive entry point.

use gesture_tree::{run, AppConfig, InputMode};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Gesture Tree — Hand-Driven Particle Christmas Tree    ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cfg = match AppConfig::from_args(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("usage: gesture_tree [--quick] [--config FILE] [--pointer | --leap] \
                       [--photos DIR] [--particles N] [--seed N]");
            std::process::exit(2);
        }
    };

    match cfg.input {
        InputMode::Simulated => println!("  Input: keyboard simulation  (H shows the hand)"),
        InputMode::Pointer   => println!("  Input: mouse pointer  (hold the left button to open)"),
        InputMode::Leap      => println!("  Input: LeapMotion hardware"),
    }
    if cfg!(not(feature = "leap")) && cfg.input == InputMode::Leap {
        println!("  (built without the `leap` feature; the pointer will be used)");
    }
    println!("  Particles: {}  Seed: {}", cfg.field.count, cfg.field.seed);
    if let Some(dir) = &cfg.photos_dir {
        println!("  Photos: {}", dir.display());
    }
    println!();
    println!("  Opening visualizer window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
