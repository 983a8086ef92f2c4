use tracing::debug;

use crate::camera::{Camera, Point};
use crate::consts::{FIT_MARGIN, FIT_MAX_ZOOM_CAP, ZOOM_STEP_PERCENT};
use crate::doc::{Asset, AssetDraft, AssetId, AssetStore, Workspace};
use crate::fit::Size;
use crate::gesture::Gesture;
use crate::input::{Button, InputState, Key, Modifiers, WheelDelta};
use crate::viewport::Viewport;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AssetMoved { id: AssetId, position: Point },
    SelectionChanged(Vec<AssetId>),
    AssetsRemoved(Vec<AssetId>),
    CameraChanged(Camera),
    SetCursor(String),
    RenderNeeded,
}

/// Core engine state: the workspace, the camera, and the gesture in progress.
///
/// Holds no reference to any UI toolkit, so the whole interaction model can be
/// driven and tested headless.
#[derive(Debug, Clone, Default)]
pub struct EngineCore {
    pub workspace: Workspace,
    pub viewport: Viewport,
    pub gesture: Gesture,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Width of a panel overlaying the right edge of the canvas. Fitting
    /// centers content in the area left of it.
    pub side_panel_width: f64,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Setup ---

    /// Update the canvas size in CSS pixels.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    pub fn set_side_panel_width(&mut self, width: f64) {
        self.side_panel_width = if width.is_finite() { width.max(0.0) } else { 0.0 };
    }

    // --- Data inputs ---

    /// Replace every asset, e.g. when restoring a saved board.
    pub fn load(&mut self, assets: Vec<Asset>) {
        self.workspace.load(assets);
        self.drop_stale_drag();
    }

    /// Create an asset from a draft.
    pub fn add_asset(&mut self, draft: AssetDraft) -> AssetId {
        self.workspace.add_asset(draft)
    }

    /// Insert assets produced elsewhere (the assistant), keeping their ids.
    pub fn add_assets(&mut self, assets: Vec<Asset>) -> Vec<Action> {
        if assets.is_empty() {
            return Vec::new();
        }
        for asset in assets {
            self.workspace.insert(asset);
        }
        vec![Action::RenderNeeded]
    }

    /// Remove one asset. A drag on it ends.
    pub fn remove_asset(&mut self, id: &AssetId) -> Vec<Action> {
        let was_selected = self.workspace.is_selected(id);
        if self.workspace.remove_asset(id).is_none() {
            return Vec::new();
        }
        self.drop_stale_drag();
        let mut actions = vec![Action::AssetsRemoved(vec![*id])];
        if was_selected {
            actions.push(Action::SelectionChanged(self.selection()));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Coordinate transform ---

    #[must_use]
    pub fn to_world(&self, screen: Point) -> Point {
        self.viewport.to_world(screen)
    }

    #[must_use]
    pub fn to_screen(&self, world: Point) -> Point {
        self.viewport.to_screen(world)
    }

    // --- Camera ---

    /// Shift the view by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        let changed = self.viewport.pan_by(dx, dy);
        self.camera_actions(changed)
    }

    /// Zoom button: `+1` steps in, `-1` steps out, by `ZOOM_STEP_PERCENT` each.
    pub fn zoom_step(&mut self, steps: f64) -> Vec<Action> {
        let changed = self.viewport.zoom_by(steps * ZOOM_STEP_PERCENT);
        self.camera_actions(changed)
    }

    /// One wheel notch of zoom about `screen`.
    pub fn zoom_at(&mut self, screen: Point, delta_sign: f64) -> Vec<Action> {
        let changed = self.viewport.zoom_at(screen, delta_sign);
        self.camera_actions(changed)
    }

    pub fn reset_camera(&mut self) -> Vec<Action> {
        let changed = self.viewport.reset();
        self.camera_actions(changed)
    }

    /// Frame every asset in the visible canvas area.
    pub fn fit_to_content(&mut self) -> Vec<Action> {
        let area = Size::new(self.viewport_width - self.side_panel_width, self.viewport_height);
        let rects = self.workspace.rects();
        let changed = self.viewport.fit_to_bounds(&rects, area, FIT_MARGIN, FIT_MAX_ZOOM_CAP);
        self.camera_actions(changed)
    }

    // --- Explicit drag ---

    /// Start dragging `id` from `screen`. Returns false if the asset doesn't exist.
    pub fn begin_drag(&mut self, screen: Point, id: AssetId) -> bool {
        self.gesture.begin_drag(screen, id, &self.viewport, &self.workspace)
    }

    /// Move the dragged asset under `screen` and return its new position.
    pub fn update_drag(&mut self, screen: Point) -> Option<Point> {
        self.gesture.update_drag(screen, &self.viewport, &mut self.workspace)
    }

    pub fn end_drag(&mut self) -> bool {
        self.gesture.end_drag()
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.gesture.pointer_down(screen, button, modifiers, &self.viewport, &mut self.workspace)
    }

    pub fn on_pointer_move(&mut self, screen: Point, _modifiers: Modifiers) -> Vec<Action> {
        self.gesture.pointer_move(screen, &mut self.viewport, &mut self.workspace)
    }

    pub fn on_pointer_up(&mut self, _screen: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        self.gesture.pointer_up()
    }

    /// Pointer capture lost or the window lost focus.
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        self.gesture.cancel()
    }

    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.gesture.wheel(screen, delta, modifiers, &mut self.viewport)
    }

    pub fn on_touch_start(&mut self, touches: &[Point]) -> Vec<Action> {
        self.gesture.touch_start(touches, &self.viewport, &mut self.workspace)
    }

    pub fn on_touch_move(&mut self, touches: &[Point]) -> Vec<Action> {
        self.gesture.touch_move(touches, &mut self.viewport, &mut self.workspace)
    }

    pub fn on_touch_end(&mut self, remaining: &[Point]) -> Vec<Action> {
        self.gesture.touch_end(remaining)
    }

    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.is_pan_key() {
            return self.gesture.set_pan_key(true);
        }
        if key.is_escape() {
            let mut actions = self.gesture.cancel();
            if self.workspace.clear_selection() {
                actions.push(Action::SelectionChanged(Vec::new()));
                actions.push(Action::RenderNeeded);
            }
            return actions;
        }
        if key.is_delete() && self.gesture.state().is_idle() {
            return self.delete_selection();
        }
        Vec::new()
    }

    pub fn on_key_up(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.is_pan_key() {
            return self.gesture.set_pan_key(false);
        }
        Vec::new()
    }

    // --- Queries ---

    /// Selected asset ids, sorted.
    #[must_use]
    pub fn selection(&self) -> Vec<AssetId> {
        self.workspace.selection().iter().copied().collect()
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.viewport.camera()
    }

    /// Look up an asset by ID.
    #[must_use]
    pub fn asset(&self, id: &AssetId) -> Option<&Asset> {
        self.workspace.asset(id)
    }

    #[must_use]
    pub fn input_state(&self) -> InputState {
        self.gesture.state()
    }

    // --- Internals ---

    fn delete_selection(&mut self) -> Vec<Action> {
        let ids = self.selection();
        if ids.is_empty() {
            return Vec::new();
        }
        for id in &ids {
            self.workspace.remove_asset(id);
        }
        debug!(count = ids.len(), "engine: removed selected assets");
        vec![Action::AssetsRemoved(ids), Action::SelectionChanged(Vec::new()), Action::RenderNeeded]
    }

    fn drop_stale_drag(&mut self) {
        if let InputState::DraggingAsset { id, .. } = self.gesture.state()
            && self.workspace.asset(&id).is_none()
        {
            self.gesture.end_drag();
        }
    }

    fn camera_actions(&self, changed: bool) -> Vec<Action> {
        if changed {
            vec![Action::CameraChanged(self.camera()), Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }
}
