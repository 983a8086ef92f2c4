//! Camera controller: the only code that mutates a [`Camera`].
//!
//! Every operation builds the complete next camera and commits it with a
//! single assignment, so a reader never observes a new zoom paired with a
//! stale pan. Zoom is always clamped to
//! [`MIN_ZOOM_PERCENT`]..=[`MAX_ZOOM_PERCENT`]; nothing here fails.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use tracing::debug;

use crate::camera::{Camera, Point};
use crate::consts::{
    DEFAULT_ZOOM_PERCENT, MAX_ZOOM_PERCENT, MIN_ZOOM_PERCENT, WHEEL_ZOOM_IN_FACTOR, WHEEL_ZOOM_OUT_FACTOR,
};
use crate::fit::{Rect, Size, fit_camera};

/// Owns the camera for one canvas session.
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    camera: Camera,
}

impl Viewport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing camera. The zoom is clamped on the way in.
    #[must_use]
    pub fn with_camera(camera: Camera) -> Self {
        let zoom_percent = if camera.zoom_percent.is_finite() {
            clamp_zoom(camera.zoom_percent)
        } else {
            DEFAULT_ZOOM_PERCENT
        };
        let pan = if camera.pan.is_finite() { camera.pan } else { Point::default() };
        Self { camera: Camera { zoom_percent, pan } }
    }

    /// The current camera.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Convert a screen point to world space under the current camera.
    #[must_use]
    pub fn to_world(&self, screen: Point) -> Point {
        self.camera.screen_to_world(screen)
    }

    /// Convert a world point to screen space under the current camera.
    #[must_use]
    pub fn to_screen(&self, world: Point) -> Point {
        self.camera.world_to_screen(world)
    }

    /// Shift the view by a screen-space delta. The canvas is unbounded.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        if !dx.is_finite() || !dy.is_finite() || (dx == 0.0 && dy == 0.0) {
            return false;
        }
        let pan = Point::new(self.camera.pan.x + dx, self.camera.pan.y + dy);
        self.commit(Camera { pan, ..self.camera })
    }

    /// Additive zoom about the coordinate origin, as used by the +/- buttons.
    ///
    /// The pan offset is left untouched.
    pub fn zoom_by(&mut self, delta_percent: f64) -> bool {
        if !delta_percent.is_finite() {
            return false;
        }
        let zoom_percent = clamp_zoom(self.camera.zoom_percent + delta_percent);
        self.commit(Camera { zoom_percent, ..self.camera })
    }

    /// One wheel notch of zoom about `screen`: in when `delta_sign > 0`, out when `< 0`.
    ///
    /// The world point under `screen` stays under `screen`.
    pub fn zoom_at(&mut self, screen: Point, delta_sign: f64) -> bool {
        if delta_sign > 0.0 {
            self.zoom_at_factor(screen, WHEEL_ZOOM_IN_FACTOR)
        } else if delta_sign < 0.0 {
            self.zoom_at_factor(screen, WHEEL_ZOOM_OUT_FACTOR)
        } else {
            false
        }
    }

    /// Multiply the zoom by `factor` while keeping the world point under `screen` fixed.
    pub fn zoom_at_factor(&mut self, screen: Point, factor: f64) -> bool {
        if !screen.is_finite() || !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let zoom_percent = clamp_zoom(self.camera.zoom_percent * factor);
        if (zoom_percent - self.camera.zoom_percent).abs() < f64::EPSILON {
            return false;
        }
        let anchor = self.camera.screen_to_world(screen);
        let scale = zoom_percent / 100.0;
        let pan = Point::new(screen.x - anchor.x * scale, screen.y - anchor.y * scale);
        self.commit(Camera { zoom_percent, pan })
    }

    /// Back to 100% with the world origin at the top-left of the viewport.
    pub fn reset(&mut self) -> bool {
        self.commit(Camera::default())
    }

    /// Frame `rects` inside `viewport` (see [`fit_camera`]).
    ///
    /// Empty content or a viewport with no area resets the camera instead.
    pub fn fit_to_bounds(&mut self, rects: &[Rect], viewport: Size, margin: f64, max_scale: f64) -> bool {
        match fit_camera(rects, viewport, margin, max_scale) {
            Some(camera) => self.commit(camera),
            None => {
                debug!(
                    rects = rects.len(),
                    width = viewport.width,
                    height = viewport.height,
                    "fit: nothing to frame, resetting camera"
                );
                self.reset()
            }
        }
    }

    fn commit(&mut self, next: Camera) -> bool {
        if next == self.camera {
            return false;
        }
        self.camera = next;
        true
    }
}

fn clamp_zoom(zoom_percent: f64) -> f64 {
    zoom_percent.clamp(MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT)
}
