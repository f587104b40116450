use serde::{Deserialize, Serialize};

use crate::value_objects::Vec3;

/// Canvas size in CSS pixels plus the clamped device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub const MAX_PIXEL_RATIO: f32 = 2.0;

    pub fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        let pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(Self::MAX_PIXEL_RATIO)
        } else {
            1.0
        };
        Self {
            width: width.max(1),
            height: height.max(1),
            pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Drawing-buffer size in device pixels.
    pub fn drawing_buffer(&self) -> (u32, u32) {
        (
            (self.width as f32 * self.pixel_ratio).round() as u32,
            (self.height as f32 * self.pixel_ratio).round() as u32,
        )
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub viewport: Viewport,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 2000.0,
            position: Vec3::new(0.0, 0.0, 200.0),
            viewport: Viewport::default(),
        }
    }
}

impl Camera {
    pub fn aspect(&self) -> f32 {
        self.viewport.aspect()
    }

    /// Applies a canvas resize. Aspect and buffer size are updated before
    /// this returns so the next frame renders at the new size.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) -> Viewport {
        self.viewport = Viewport::new(width, height, device_pixel_ratio);
        tracing::trace!(width, height, pixel_ratio = self.viewport.pixel_ratio, "Viewport resized");
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_updates_aspect_and_clamps_pixel_ratio() {
        let mut camera = Camera::default();
        let viewport = camera.resize(1920, 1080, 3.0);
        assert_eq!(viewport.pixel_ratio, 2.0);
        assert!((camera.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!(viewport.drawing_buffer(), (3840, 2160));
    }

    #[test]
    fn degenerate_sizes_do_not_divide_by_zero() {
        let viewport = Viewport::new(800, 0, f32::NAN);
        assert_eq!(viewport.height, 1);
        assert_eq!(viewport.pixel_ratio, 1.0);
        assert!(viewport.aspect().is_finite());
    }
}
