//! Fit-to-content: union bounds of world rectangles and the camera that frames them.
//!
//! [`fit_camera`] is pure. [`crate::viewport::Viewport::fit_to_bounds`] commits
//! its result (or falls back to a reset when it returns `None`).

#[cfg(test)]
#[path = "fit_test.rs"]
mod fit_test;

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Point};
use crate::consts::{FIT_EPSILON, MAX_ZOOM_PERCENT, MIN_ZOOM_PERCENT};

/// Axis-aligned rectangle in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Whether `pt` lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Pixel size of the visible canvas area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A size with no drawable area (zero, negative, or non-finite on either axis).
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Union bounding box of `rects`. Non-finite rectangles are skipped.
///
/// Returns `None` when no usable rectangle remains.
#[must_use]
pub fn bounding_box(rects: &[Rect]) -> Option<Rect> {
    let mut iter = rects.iter().filter(|r| r.is_finite());
    let first = iter.next()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.right(), first.bottom());
    for r in iter {
        min_x = min_x.min(r.x);
        min_y = min_y.min(r.y);
        max_x = max_x.max(r.right());
        max_y = max_y.max(r.bottom());
    }
    Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Camera that centers `rects` in `viewport`, filling at most `margin` of it on
/// the tighter axis and never zooming in past `max_scale`.
///
/// Returns `None` when there is nothing to frame or no room to frame it in;
/// callers reset the camera in that case.
#[must_use]
pub fn fit_camera(rects: &[Rect], viewport: Size, margin: f64, max_scale: f64) -> Option<Camera> {
    if viewport.is_degenerate() {
        return None;
    }
    let bounds = bounding_box(rects)?;

    let content_w = if bounds.width > 0.0 { bounds.width } else { FIT_EPSILON };
    let content_h = if bounds.height > 0.0 { bounds.height } else { FIT_EPSILON };

    let scale_x = (viewport.width * margin) / content_w;
    let scale_y = (viewport.height * margin) / content_h;
    let scale = scale_x.min(scale_y).min(max_scale);
    let zoom_percent = (scale * 100.0).clamp(MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT);

    let world_center = Point::new(bounds.x + content_w * 0.5, bounds.y + content_h * 0.5);
    let screen_center = viewport.center();
    let applied = zoom_percent / 100.0;
    let pan = Point::new(screen_center.x - world_center.x * applied, screen_center.y - world_center.y * applied);

    Some(Camera { zoom_percent, pan })
}
