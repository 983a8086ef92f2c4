//! Shared numeric constants for the canvas crate.

// ── Zoom ────────────────────────────────────────────────────────

/// Lowest zoom the camera accepts, in percent.
pub const MIN_ZOOM_PERCENT: f64 = 10.0;

/// Highest zoom the camera accepts, in percent.
pub const MAX_ZOOM_PERCENT: f64 = 400.0;

/// Zoom of a fresh or reset camera, in percent (1:1 scale).
pub const DEFAULT_ZOOM_PERCENT: f64 = 100.0;

/// Additive step used by the discrete zoom buttons, in percent.
pub const ZOOM_STEP_PERCENT: f64 = 5.0;

/// Multiplicative factor for one wheel notch towards the content.
pub const WHEEL_ZOOM_IN_FACTOR: f64 = 1.1;

/// Multiplicative factor for one wheel notch away from the content.
pub const WHEEL_ZOOM_OUT_FACTOR: f64 = 0.9;

/// Change in finger distance, in screen pixels, that counts as one pinch step.
pub const PINCH_STEP_PX: f64 = 8.0;

// ── Fit to content ──────────────────────────────────────────────

/// Fraction of the viewport the fitted content may occupy (15% margin).
pub const FIT_MARGIN: f64 = 0.85;

/// Fit never zooms in past this scale, however small the content.
pub const FIT_MAX_ZOOM_CAP: f64 = 2.0;

/// Stand-in extent for content that is zero-width or zero-height.
pub const FIT_EPSILON: f64 = 1e-6;

// ── Assets ──────────────────────────────────────────────────────

/// Where a new asset lands when the caller gives no position.
pub const DEFAULT_ASSET_X: f64 = 500.0;

/// Where a new asset lands when the caller gives no position.
pub const DEFAULT_ASSET_Y: f64 = 300.0;

/// Width of a new asset when the caller gives none.
pub const DEFAULT_ASSET_WIDTH: f64 = 340.0;

/// Height of a new asset when the caller gives none.
pub const DEFAULT_ASSET_HEIGHT: f64 = 220.0;

/// Title of a new asset when the caller gives none.
pub const DEFAULT_ASSET_TITLE: &str = "New asset";
