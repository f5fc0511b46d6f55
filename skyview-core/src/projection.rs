/// Perspective projection and screen mapping
use nalgebra::{Matrix4, Vector4};

use crate::config::ViewConfig;

/// Perspective projection parameters for the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_config(&ViewConfig::default(), width, height)
    }

    pub fn from_config(config: &ViewConfig, width: u32, height: u32) -> Self {
        let mut projection = Self {
            fov: config.fov_degrees.to_radians(),
            aspect: 1.0,
            near: config.near,
            far: config.far,
        };
        projection.set_viewport(width, height);
        projection
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Map a clip-space position to screen space `(x, y, depth)`.
///
/// Returns `None` for points on or behind the eye plane; callers are expected
/// to have clipped against the near plane first.
pub fn clip_to_screen(clip: &Vector4<f32>, width: u32, height: u32) -> Option<(f32, f32, f32)> {
    // Prevent division by near-zero w values
    if clip.w < 1e-6 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let depth = clip.z / clip.w;

    // Convert to screen space
    let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

    Some((screen_x, screen_y, depth))
}
