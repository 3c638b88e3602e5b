//! Platform abstraction layer
//!
//! Maps browser client coordinates onto the game's world space. The canvas
//! may be scaled by CSS, so mapping goes through the canvas's client rect
//! rather than the fixed world size.

use glam::Vec2;

use crate::consts::{HALF_H, HALF_W};

/// Client-space rectangle of the game canvas (CSS pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Whether a client point lies over the canvas (edges included)
    pub fn contains(&self, client_x: f32, client_y: f32) -> bool {
        client_x >= self.left
            && client_x <= self.left + self.width
            && client_y >= self.top
            && client_y <= self.top + self.height
    }

    /// Client point to world point, clamped to the canvas
    pub fn client_to_world(&self, client_x: f32, client_y: f32) -> Vec2 {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Vec2::ZERO;
        }
        let x = (client_x - self.left).clamp(0.0, self.width);
        let y = (client_y - self.top).clamp(0.0, self.height);

        let ndc = Vec2::new(x / self.width * 2.0 - 1.0, -(y / self.height) * 2.0 + 1.0);
        Vec2::new(ndc.x * HALF_W, ndc.y * HALF_H)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_origin() {
        let vp = Viewport::new(100.0, 50.0, 1280.0, 640.0);
        let p = vp.client_to_world(740.0, 370.0);
        assert!(p.length() < 1e-3);
    }

    #[test]
    fn test_corners_and_y_flip() {
        let vp = Viewport::new(0.0, 0.0, 1280.0, 640.0);
        assert_eq!(vp.client_to_world(0.0, 0.0), Vec2::new(-HALF_W, HALF_H));
        assert_eq!(vp.client_to_world(1280.0, 640.0), Vec2::new(HALF_W, -HALF_H));
    }

    #[test]
    fn test_scaled_canvas_maps_to_full_world() {
        // CSS shrinks the canvas to half size
        let vp = Viewport::new(0.0, 0.0, 640.0, 320.0);
        assert_eq!(vp.client_to_world(640.0, 0.0), Vec2::new(HALF_W, HALF_H));
    }

    #[test]
    fn test_outside_points_clamp() {
        let vp = Viewport::new(10.0, 10.0, 1280.0, 640.0);
        assert!(!vp.contains(5.0, 300.0));
        assert!(vp.contains(10.0, 10.0));
        assert_eq!(vp.client_to_world(-500.0, 5000.0), Vec2::new(-HALF_W, -HALF_H));
    }

    #[test]
    fn test_empty_viewport() {
        let vp = Viewport::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(vp.client_to_world(10.0, 10.0), Vec2::ZERO);
    }
}
