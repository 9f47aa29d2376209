use glam::Vec2;

use crate::store::Store;

/// View transform applied by the grid renderer.
///
/// A world point `p` lands on screen at `p * zoom + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub zoom: f32,
    pub x: f32,
    pub y: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            x: 0.0,
            y: 0.0,
        }
    }
}

impl Camera {
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn panned(&self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            ..*self
        }
    }

    pub fn zoomed(&self, factor: f32) -> Self {
        Self {
            zoom: self.zoom * factor,
            ..*self
        }
    }

    /// Zooms by `factor` while keeping the screen point `pivot` over the same
    /// world point, which is what a scroll-wheel zoom under the cursor wants.
    pub fn zoomed_about(&self, factor: f32, pivot: Vec2) -> Self {
        let world = self.screen_to_world(pivot);
        let zoom = self.zoom * factor;
        let offset = pivot - world * zoom;
        Self {
            zoom,
            x: offset.x,
            y: offset.y,
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.zoom + self.offset()
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset()) / self.zoom
    }
}

/// Holds the renderer's [`Camera`]. Resets to `{zoom: 1, x: 0, y: 0}`.
///
/// No clamping happens here; the renderer decides what range is sensible.
pub type CameraStore = Store<Camera>;

impl Store<Camera> {
    pub fn pan(&self, delta: Vec2) {
        self.update(|camera| camera.panned(delta));
    }

    pub fn zoom_about(&self, factor: f32, pivot: Vec2) {
        self.update(|camera| camera.zoomed_about(factor, pivot));
    }
}
