#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_ZOOM_PERCENT;

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Camera state for pan/zoom on the infinite canvas.
///
/// `pan` is the screen-space position (CSS pixels) of the world origin.
/// `zoom_percent` is a percentage scale (100 = 1:1). The clamp to the legal
/// zoom range lives in [`crate::viewport::Viewport`]; a `Camera` on its own is
/// just the pair of numbers the renderer reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub zoom_percent: f64,
    pub pan: Point,
}

impl Default for Camera {
    fn default() -> Self {
        Self { zoom_percent: DEFAULT_ZOOM_PERCENT, pan: Point::default() }
    }
}

impl Camera {
    #[must_use]
    pub fn new(zoom_percent: f64, pan: Point) -> Self {
        Self { zoom_percent, pan }
    }

    /// Scale factor applied to world lengths (1.0 at 100%).
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.zoom_percent / 100.0
    }

    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        let scale = self.scale();
        Point { x: (screen.x - self.pan.x) / scale, y: (screen.y - self.pan.y) / scale }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        let scale = self.scale();
        Point { x: world.x * scale + self.pan.x, y: world.y * scale + self.pan.y }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale()
    }

    /// CSS transform placing the world layer under this camera.
    ///
    /// The world layer must use `transform-origin: 0 0` for this to line up
    /// with [`Camera::world_to_screen`].
    #[must_use]
    pub fn css_transform(&self) -> String {
        format!("translate({}px, {}px) scale({})", self.pan.x, self.pan.y, self.scale())
    }

    /// Zoom as shown in the zoom control, e.g. `"110%"`.
    #[must_use]
    pub fn zoom_label(&self) -> String {
        format!("{}%", self.zoom_percent.round())
    }
}
