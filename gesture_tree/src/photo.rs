//! Photo wall: small thumbnails hung on the tree's photo-frame particles.
//!
//! Images are keyed by load order (sorted file names).  Only a square
//! thumbnail is kept; the renderer treats it as an opaque texture.

use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat};

/// Thumbnail edge in pixels.
pub const THUMB_SIZE: u32 = 24;

#[derive(Clone, Debug, PartialEq)]
pub struct Photo {
    pub name: String,
    /// `THUMB_SIZE²` pixels, row-major, `0xFFRRGGBB`.
    pub pixels: Vec<u32>,
}

impl Photo {
    /// Centre-crop to a square and shrink to a thumbnail.
    pub fn from_image(name: impl Into<String>, img: &DynamicImage) -> Self {
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        let side = w.min(h).max(1);
        let crop = imageops::crop_imm(&rgb, (w - side.min(w)) / 2, (h - side.min(h)) / 2, side, side)
            .to_image();
        let thumb = imageops::resize(&crop, THUMB_SIZE, THUMB_SIZE, FilterType::Triangle);
        let pixels = thumb
            .pixels()
            .map(|p| 0xFF00_0000 | (p[0] as u32) << 16 | (p[1] as u32) << 8 | p[2] as u32)
            .collect();
        Photo { name: name.into(), pixels }
    }

    pub fn texel(&self, u: f32, v: f32) -> u32 {
        let n = THUMB_SIZE as usize;
        let x = ((u.clamp(0.0, 1.0) * n as f32) as usize).min(n - 1);
        let y = ((v.clamp(0.0, 1.0) * n as f32) as usize).min(n - 1);
        self.pixels.get(y * n + x).copied().unwrap_or(0xFF00_0000)
    }
}

#[derive(Clone, Debug, Default)]
pub struct PhotoWall {
    photos: Vec<Photo>,
    /// Particles carrying photos `0..slots.len()`, once assigned.
    slots:  Range<usize>,
    cursor: usize,
}

impl PhotoWall {
    pub fn new(photos: Vec<Photo>) -> Self {
        PhotoWall { photos, slots: 0..0, cursor: 0 }
    }

    /// Load every decodable image in `dir`, in file-name order.  Unreadable
    /// files are skipped with a warning.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .with_context(|| format!("reading photo directory {}", dir.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && ImageFormat::from_path(p).is_ok())
            .collect();
        paths.sort();

        let mut photos = Vec::with_capacity(paths.len());
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match image::open(&path) {
                Ok(img) => photos.push(Photo::from_image(name, &img)),
                Err(e)  => log::warn!("skipping {}: {}", path.display(), e),
            }
        }
        log::info!("loaded {} photos from {}", photos.len(), dir.display());
        Ok(PhotoWall::new(photos))
    }

    pub fn len(&self) -> usize { self.photos.len() }
    pub fn is_empty(&self) -> bool { self.photos.is_empty() }
    pub fn photos(&self) -> &[Photo] { &self.photos }

    /// Hang photo `k` on particle `slots.start + k`.  Photos beyond the
    /// range stay unassigned.
    pub fn assign(&mut self, slots: Range<usize>) {
        let end = slots.end.min(slots.start.saturating_add(self.photos.len()));
        self.slots = slots.start..end.max(slots.start);
        self.cursor = 0;
        if self.slots.len() < self.photos.len() {
            log::warn!("{} photos have no frame particle", self.photos.len() - self.slots.len());
        }
    }

    pub fn particle(&self, k: usize) -> Option<usize> {
        (k < self.slots.len()).then(|| self.slots.start + k)
    }

    /// Constant time; called for every particle each frame.
    pub fn photo_for_particle(&self, particle: usize) -> Option<&Photo> {
        if !self.slots.contains(&particle) {
            return None;
        }
        self.photos.get(particle - self.slots.start)
    }

    /// The next photo's particle, round-robin over assigned photos.
    pub fn select_next(&mut self) -> Option<usize> {
        if self.slots.is_empty() {
            return None;
        }
        let particle = self.slots.start + self.cursor % self.slots.len();
        self.cursor = (self.cursor + 1) % self.slots.len();
        Some(particle)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
