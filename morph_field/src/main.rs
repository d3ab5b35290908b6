//! field_probe — print formation statistics and a morph trace.
//!
//! ```text
//! field_probe [count] [seed]
//! ```

use morph_field::{FieldConfig, MorphAnimator, MorphParams, ParticleField};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║                    Morph Field Probe                     ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cfg = FieldConfig::default();
    if let Some(n) = args.first() {
        match n.parse() {
            Ok(n)  => cfg.count = n,
            Err(_) => log::warn!("ignoring non-numeric count {:?}", n),
        }
    }
    if let Some(s) = args.get(1) {
        match s.parse() {
            Ok(s)  => cfg.seed = s,
            Err(_) => log::warn!("ignoring non-numeric seed {:?}", s),
        }
    }

    let field = ParticleField::generate(&cfg);
    println!("  Particles : {}", field.len());
    println!("  Seed      : {}", cfg.seed);
    println!("  Cone      : base r={:.1}  height={:.1}  turns={:.1}",
             cfg.cone.base_radius, cfg.cone.height, cfg.cone.turns);
    println!("  Shell     : r∈[{:.1}, {:.1}]", cfg.shell.min_radius, cfg.shell.max_radius);

    let (lo, hi) = field.sizes().iter()
        .fold((f32::MAX, 0.0f32), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    println!("  Sizes     : [{:.2}, {:.2}]", lo, hi);
    println!("  Photos    : {:?}", field.photos());
    println!("  Rest  r̄   : {:.3}", mean_radius(field.rests()));
    println!("  Shell r̄   : {:.3}", mean_radius(field.scatters()));
    println!();

    let mut anim = MorphAnimator::new(&field, MorphParams::default());
    anim.set_target(1.0);
    println!("  frame   blend   mean radius");
    for frame in 0..=120 {
        if frame % 10 == 0 {
            println!("  {:>5}   {:.3}   {:>8.3}", frame, anim.blend(), mean_radius(anim.positions()));
        }
        anim.update(&field, 1.0 / 60.0);
    }
    println!();
}

fn mean_radius(points: &[glam::Vec3]) -> f32 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.length()).sum::<f32>() / points.len() as f32
}
