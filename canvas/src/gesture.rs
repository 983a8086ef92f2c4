//! Gesture state machine: pointer, wheel, and touch events into camera and asset updates.
//!
//! `Gesture` owns only the [`InputState`] and the pan-key flag. The camera and
//! the assets are borrowed per call, so each handler sees the camera as it is
//! after any zoom it applied itself. Handlers return the [`Action`]s the host
//! should apply; an empty vector means nothing observable changed.
//!
//! Rules in brief:
//!
//! - Middle button, or primary with the pan key held, pans.
//! - Primary on an asset selects it (toggling under Shift/Meta) and drags it
//!   if it ended up selected. Primary on empty canvas clears the selection.
//! - Wheel zooms about the pointer with Ctrl/Meta held, otherwise pans.
//! - Two touches pinch: distance steps zoom about the midpoint, then the
//!   midpoint drift pans.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use std::collections::BTreeSet;

use tracing::debug;

use crate::camera::Point;
use crate::consts::PINCH_STEP_PX;
use crate::doc::{AssetId, AssetStore};
use crate::engine::Action;
use crate::hit::hit_test;
use crate::input::{Button, InputState, Modifiers, WheelDelta};
use crate::viewport::Viewport;

#[derive(Debug, Clone, Default)]
pub struct Gesture {
    state: InputState,
    pan_key_held: bool,
}

impl Gesture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The gesture in progress.
    #[must_use]
    pub fn state(&self) -> InputState {
        self.state
    }

    #[must_use]
    pub fn pan_key_held(&self) -> bool {
        self.pan_key_held
    }

    /// CSS cursor matching the current state.
    #[must_use]
    pub fn cursor(&self) -> &'static str {
        match self.state {
            InputState::DraggingAsset { .. } | InputState::Panning { .. } => "grabbing",
            InputState::Idle if self.pan_key_held => "grab",
            InputState::Idle | InputState::Pinching { .. } => "default",
        }
    }

    // --- Pointer ---

    /// Press. A press during a pinch is ignored; any other press replaces the
    /// current gesture.
    pub fn pointer_down<S: AssetStore + ?Sized>(
        &mut self,
        screen: Point,
        button: Button,
        modifiers: Modifiers,
        viewport: &Viewport,
        store: &mut S,
    ) -> Vec<Action> {
        if matches!(self.state, InputState::Pinching { .. }) || !screen.is_finite() {
            return Vec::new();
        }

        match button {
            Button::Secondary => Vec::new(),
            Button::Middle => self.start_pan(screen),
            Button::Primary if self.pan_key_held => self.start_pan(screen),
            Button::Primary => self.press_primary(screen, modifiers, viewport, store),
        }
    }

    /// Pointer motion. Drags follow the pointer; pans follow its screen delta.
    pub fn pointer_move<S: AssetStore + ?Sized>(
        &mut self,
        screen: Point,
        viewport: &mut Viewport,
        store: &mut S,
    ) -> Vec<Action> {
        if !screen.is_finite() {
            return Vec::new();
        }
        match self.state {
            InputState::DraggingAsset { id, .. } => match self.update_drag(screen, viewport, store) {
                Some(position) => vec![Action::AssetMoved { id, position }, Action::RenderNeeded],
                None => vec![Action::SetCursor(self.cursor().to_owned())],
            },
            InputState::Panning { last_screen } => {
                self.state = InputState::Panning { last_screen: screen };
                let delta = screen - last_screen;
                if viewport.pan_by(delta.x, delta.y) {
                    camera_actions(viewport)
                } else {
                    Vec::new()
                }
            }
            InputState::Idle | InputState::Pinching { .. } => Vec::new(),
        }
    }

    /// Release. Any gesture ends; a dragged asset keeps its last position.
    pub fn pointer_up(&mut self) -> Vec<Action> {
        self.finish("pointer up")
    }

    /// Pointer capture lost or window blurred. Same outcome as a release.
    pub fn cancel(&mut self) -> Vec<Action> {
        self.finish("cancel")
    }

    // --- Wheel ---

    /// Ctrl/Meta + wheel zooms about `screen` (scroll up zooms in); plain
    /// wheel pans the canvas against the scroll direction. Works in any state.
    pub fn wheel(
        &mut self,
        screen: Point,
        delta: WheelDelta,
        modifiers: Modifiers,
        viewport: &mut Viewport,
    ) -> Vec<Action> {
        let changed = if modifiers.is_zoom() {
            viewport.zoom_at(screen, -delta.dy)
        } else {
            viewport.pan_by(-delta.dx, -delta.dy)
        };
        if changed { camera_actions(viewport) } else { Vec::new() }
    }

    // --- Touch ---

    /// Touches currently on the surface after a touch started.
    ///
    /// Two touches start a pinch and abandon any drag or pan. One touch acts
    /// as a primary press.
    pub fn touch_start<S: AssetStore + ?Sized>(
        &mut self,
        touches: &[Point],
        viewport: &Viewport,
        store: &mut S,
    ) -> Vec<Action> {
        match touches {
            [a, b] if a.is_finite() && b.is_finite() => {
                self.transition(InputState::Pinching { last_distance: a.distance(*b), last_mid: a.midpoint(*b) });
                vec![Action::SetCursor(self.cursor().to_owned())]
            }
            [single] => self.pointer_down(*single, Button::Primary, Modifiers::default(), viewport, store),
            _ => Vec::new(),
        }
    }

    /// Touches currently on the surface after a touch moved.
    ///
    /// While pinching, zoom is applied first in `PINCH_STEP_PX` steps about the
    /// new midpoint, then the midpoint drift is applied as a pan.
    pub fn touch_move<S: AssetStore + ?Sized>(
        &mut self,
        touches: &[Point],
        viewport: &mut Viewport,
        store: &mut S,
    ) -> Vec<Action> {
        let InputState::Pinching { mut last_distance, last_mid } = self.state else {
            return match touches {
                [single] => self.pointer_move(*single, viewport, store),
                _ => Vec::new(),
            };
        };
        let [a, b, ..] = touches else {
            return Vec::new();
        };
        if !a.is_finite() || !b.is_finite() {
            return Vec::new();
        }

        let distance = a.distance(*b);
        let mid = a.midpoint(*b);
        let mut changed = false;

        let stretch = distance - last_distance;
        if stretch.abs() >= PINCH_STEP_PX {
            changed |= viewport.zoom_at(mid, stretch);
            last_distance = distance;
        }
        let drift = mid - last_mid;
        changed |= viewport.pan_by(drift.x, drift.y);

        self.state = InputState::Pinching { last_distance, last_mid: mid };
        if changed { camera_actions(viewport) } else { Vec::new() }
    }

    /// Touches still on the surface after a touch ended.
    ///
    /// A pinch ends once fewer than two touches remain; the remaining finger
    /// does not start a new gesture.
    pub fn touch_end(&mut self, remaining: &[Point]) -> Vec<Action> {
        if matches!(self.state, InputState::Pinching { .. }) && remaining.len() >= 2 {
            return Vec::new();
        }
        self.finish("touch end")
    }

    // --- Keys ---

    /// Space held or released. Only affects presses that start afterwards.
    pub fn set_pan_key(&mut self, held: bool) -> Vec<Action> {
        if self.pan_key_held == held {
            return Vec::new();
        }
        self.pan_key_held = held;
        vec![Action::SetCursor(self.cursor().to_owned())]
    }

    // --- Explicit drag ---

    /// Start dragging `id` from `screen` without touching the selection.
    ///
    /// Returns false if the asset doesn't exist.
    pub fn begin_drag<S: AssetStore + ?Sized>(
        &mut self,
        screen: Point,
        id: AssetId,
        viewport: &Viewport,
        store: &S,
    ) -> bool {
        let Some(asset) = store.asset(&id) else {
            return false;
        };
        if !screen.is_finite() {
            return false;
        }
        let grab_offset = viewport.to_world(screen) - asset.position;
        self.transition(InputState::DraggingAsset { id, grab_offset });
        true
    }

    /// Move the dragged asset so the grab point sits under `screen`.
    ///
    /// Returns the new top-left corner, or `None` when no drag is active. A
    /// drag whose asset has vanished is dropped back to idle.
    pub fn update_drag<S: AssetStore + ?Sized>(
        &mut self,
        screen: Point,
        viewport: &Viewport,
        store: &mut S,
    ) -> Option<Point> {
        let InputState::DraggingAsset { id, grab_offset } = self.state else {
            return None;
        };
        if !screen.is_finite() {
            return None;
        }
        let position = viewport.to_world(screen) - grab_offset;
        if store.set_asset_position(&id, position) {
            Some(position)
        } else {
            debug!(%id, "gesture: drag target vanished");
            self.transition(InputState::Idle);
            None
        }
    }

    /// End an active drag. Returns false if none was active.
    pub fn end_drag(&mut self) -> bool {
        if !matches!(self.state, InputState::DraggingAsset { .. }) {
            return false;
        }
        self.transition(InputState::Idle);
        true
    }

    // --- Internals ---

    fn start_pan(&mut self, screen: Point) -> Vec<Action> {
        self.transition(InputState::Panning { last_screen: screen });
        vec![Action::SetCursor(self.cursor().to_owned())]
    }

    fn press_primary<S: AssetStore + ?Sized>(
        &mut self,
        screen: Point,
        modifiers: Modifiers,
        viewport: &Viewport,
        store: &mut S,
    ) -> Vec<Action> {
        let world = viewport.to_world(screen);
        let multi = modifiers.is_multi_select();
        let mut actions = Vec::new();

        let Some(id) = hit_test(world, &*store) else {
            self.transition(InputState::Idle);
            if !multi && !store.selection().is_empty() {
                store.set_selection(BTreeSet::new());
                actions.push(Action::SelectionChanged(Vec::new()));
            }
            return actions;
        };

        let mut selection = store.selection().clone();
        if !multi {
            selection.clear();
            selection.insert(id);
        } else if !selection.remove(&id) {
            selection.insert(id);
        }
        if selection != *store.selection() {
            store.set_selection(selection);
            actions.push(Action::SelectionChanged(store.selection().iter().copied().collect()));
        }

        if store.selection().contains(&id) && self.begin_drag(screen, id, viewport, &*store) {
            actions.push(Action::SetCursor(self.cursor().to_owned()));
        } else {
            self.transition(InputState::Idle);
        }
        actions
    }

    fn finish(&mut self, reason: &'static str) -> Vec<Action> {
        if self.state.is_idle() {
            return Vec::new();
        }
        debug!(reason, "gesture: finished");
        self.transition(InputState::Idle);
        vec![Action::SetCursor(self.cursor().to_owned())]
    }

    fn transition(&mut self, next: InputState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "gesture: transition");
        }
        self.state = next;
    }
}

fn camera_actions(viewport: &Viewport) -> Vec<Action> {
    vec![Action::CameraChanged(viewport.camera()), Action::RenderNeeded]
}
