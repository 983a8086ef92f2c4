//! Input model: modifier keys, mouse buttons, keys, wheel deltas, and gesture states.
//!
//! These are the types the host hands to the engine on every event, plus
//! `InputState`, the gesture tracked between press and release. Each active
//! variant carries exactly the context needed to turn the next move event into
//! a camera or asset update.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::AssetId;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Click adds to / removes from the selection instead of replacing it.
    #[must_use]
    pub fn is_multi_select(self) -> bool {
        self.shift || self.meta
    }

    /// Wheel zooms instead of panning.
    #[must_use]
    pub fn is_zoom(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger touch).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

/// A keyboard key, named as the browser reports it (`"Escape"`, `" "`, `"Delete"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// The space bar, held to pan with the primary button.
    #[must_use]
    pub fn is_pan_key(&self) -> bool {
        matches!(self.0.as_str(), " " | "Space" | "Spacebar")
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }

    /// Delete or Backspace.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self.0.as_str(), "Delete" | "Backspace")
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// The gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next press.
    #[default]
    Idle,
    /// An asset follows the pointer.
    DraggingAsset {
        /// Id of the asset being dragged.
        id: AssetId,
        /// World-space offset from the asset's top-left corner to the pointer
        /// at press time. Held constant for the whole drag.
        grab_offset: Point,
    },
    /// The canvas follows the pointer.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// Two-finger pinch: distance drives zoom, midpoint drives pan.
    Pinching {
        /// Finger distance at the last applied zoom step.
        last_distance: f64,
        /// Screen-space midpoint at the previous touch event.
        last_mid: Point,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
