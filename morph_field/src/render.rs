//! What a renderer receives each frame.

use glam::{Quat, Vec3};

/// Default distance at which a size-1 sprite covers `attenuation` pixels.
pub const DEFAULT_ATTENUATION: f32 = 300.0;

/// Scalars a shader-driven renderer needs alongside the buffers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MorphUniforms {
    /// Seconds since the animator started.
    pub time: f32,
    pub blend: f32,
    pub pixel_ratio: f32,
}

/// The focused particle's presentation transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusState {
    pub particle: usize,
    pub position: Vec3,
    pub scale: f32,
    /// Rotation taking +Z onto the direction toward the camera.
    pub facing: Quat,
    /// `false` while easing back into the field after release.
    pub engaged: bool,
}

/// Borrowed view of one animated frame.  All slices have the field's length.
#[derive(Clone, Copy, Debug)]
pub struct RenderFrame<'a> {
    pub positions: &'a [Vec3],
    pub colors: &'a [Vec3],
    pub sizes: &'a [f32],
    /// Extra size factor (1 for everything but the focused particle).
    pub scales: &'a [f32],
    /// Brightness multiplier, ≥ 1 while scattered.
    pub glow: &'a [f32],
    pub focus: Option<FocusState>,
    pub uniforms: MorphUniforms,
}

impl RenderFrame<'_> {
    pub fn len(&self) -> usize { self.positions.len() }
    pub fn is_empty(&self) -> bool { self.positions.is_empty() }
}

/// Sprite diameter in device pixels for a particle `depth` units in front
/// of the camera.  Zero at or behind the eye.
pub fn projected_point_size(size: f32, depth: f32, pixel_ratio: f32, attenuation: f32) -> f32 {
    if depth <= 1e-3 {
        return 0.0;
    }
    size * pixel_ratio * attenuation / depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn size_falls_off_with_depth() {
        let near = projected_point_size(1.0, 10.0, 1.0, DEFAULT_ATTENUATION);
        let far = projected_point_size(1.0, 20.0, 1.0, DEFAULT_ATTENUATION);
        assert_relative_eq!(near, 30.0);
        assert_relative_eq!(far, near / 2.0);
    }

    #[test]
    fn size_scales_with_pixel_ratio() {
        let a = projected_point_size(0.5, 15.0, 1.0, DEFAULT_ATTENUATION);
        let b = projected_point_size(0.5, 15.0, 2.0, DEFAULT_ATTENUATION);
        assert_relative_eq!(b, 2.0 * a);
    }

    #[test]
    fn behind_camera_is_invisible() {
        assert_eq!(projected_point_size(1.0, 0.0, 1.0, DEFAULT_ATTENUATION), 0.0);
        assert_eq!(projected_point_size(1.0, -5.0, 1.0, DEFAULT_ATTENUATION), 0.0);
    }
}
