//! # morph_field
//!
//! A fixed pool of particles with two target formations, a spiral cone
//! ("tree") and a thick shell ("scatter"), plus the animator that eases
//! between them each frame.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`noise`] | seeded 3D/4D gradient noise and a turbulence vector field |
//! | [`formation`] | cone and shell generators |
//! | [`palette`] | weighted color/size buckets |
//! | [`field`] | [`ParticleField`]: parallel attribute arrays |
//! | [`animator`] | [`MorphAnimator`]: blend, turbulence, spin, focus |
//! | [`render`] | [`RenderFrame`] handed to a renderer, point-size projection |
//!
//! ## Quick start
//!
//! ```rust
//! use morph_field::{FieldConfig, MorphAnimator, MorphParams, ParticleField};
//!
//! let field = ParticleField::generate(&FieldConfig { count: 200, ..Default::default() });
//! let mut anim = MorphAnimator::new(&field, MorphParams::default());
//! anim.set_target(1.0);
//! for _ in 0..60 {
//!     anim.update(&field, 1.0 / 60.0);
//! }
//! assert!(anim.blend() > 0.9);
//! let frame = anim.frame(&field);
//! assert_eq!(frame.positions.len(), 200);
//! ```

pub mod animator;
pub mod field;
pub mod formation;
pub mod noise;
pub mod palette;
pub mod render;

pub use animator::{BlendState, MorphAnimator, MorphParams, Smoothing};
pub use field::{FieldConfig, ParticleField, MAX_PARTICLES, MIN_PARTICLES};
pub use formation::{ConeFormation, Fill, ShellFormation, ShellShape};
pub use noise::GradientNoise;
pub use palette::{Bucket, Palette, Swatch};
pub use render::{projected_point_size, FocusState, MorphUniforms, RenderFrame, DEFAULT_ATTENUATION};
