#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::doc::AssetKind;

// =============================================================
// Helpers
// =============================================================

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn ctrl_modifier() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

fn key(name: &str) -> Key {
    Key(name.into())
}

fn make_asset_at(kind: AssetKind, x: f64, y: f64, w: f64, h: f64) -> Asset {
    Asset {
        id: Uuid::new_v4(),
        kind,
        title: "card".into(),
        content: String::new(),
        description: None,
        position: pt(x, y),
        width: w,
        height: h,
    }
}

fn add_at(core: &mut EngineCore, x: f64, y: f64, w: f64, h: f64) -> AssetId {
    core.add_asset(AssetDraft { position: Some(pt(x, y)), width: Some(w), height: Some(h), ..Default::default() })
}

fn has_action<F>(actions: &[Action], pred: F) -> bool
where
    F: Fn(&Action) -> bool,
{
    actions.iter().any(pred)
}

fn has_render_needed(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::RenderNeeded))
}

fn has_camera_changed(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::CameraChanged(_)))
}

fn position(core: &EngineCore, id: AssetId) -> Point {
    core.asset(&id).map(|a| a.position).unwrap()
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn core_new_has_no_selection() {
    let core = EngineCore::new();
    assert!(core.selection().is_empty());
}

#[test]
fn core_default_camera_is_identity() {
    let core = EngineCore::new();
    assert_eq!(core.camera(), Camera::default());
    assert_eq!(core.camera().zoom_label(), "100%");
}

#[test]
fn core_default_workspace_is_empty_and_idle() {
    let core = EngineCore::new();
    assert!(core.workspace.is_empty());
    assert!(core.input_state().is_idle());
    assert_eq!(core.viewport_width, 0.0);
    assert_eq!(core.viewport_height, 0.0);
    assert_eq!(core.side_panel_width, 0.0);
}

#[test]
fn set_side_panel_width_rejects_negative_and_nan() {
    let mut core = EngineCore::new();
    core.set_side_panel_width(-20.0);
    assert_eq!(core.side_panel_width, 0.0);
    core.set_side_panel_width(f64::NAN);
    assert_eq!(core.side_panel_width, 0.0);
    core.set_side_panel_width(384.0);
    assert_eq!(core.side_panel_width, 384.0);
}

// =============================================================
// Coordinate transform
// =============================================================

#[test]
fn to_world_and_to_screen_round_trip() {
    let mut core = EngineCore::new();
    core.pan(120.0, -40.0);
    core.zoom_step(7.0);
    let screen = pt(333.0, 77.0);
    let back = core.to_screen(core.to_world(screen));
    assert!(approx_eq(back.x, screen.x) && approx_eq(back.y, screen.y));
}

// =============================================================
// Camera operations
// =============================================================

#[test]
fn pan_reports_camera_change() {
    let mut core = EngineCore::new();
    let actions = core.pan(10.0, 20.0);
    assert!(has_action(&actions, |a| matches!(a, Action::CameraChanged(c) if c.pan == pt(10.0, 20.0))));
    assert!(has_render_needed(&actions));
    assert!(core.pan(0.0, 0.0).is_empty());
}

#[test]
fn zoom_step_moves_by_five_percent() {
    let mut core = EngineCore::new();
    core.zoom_step(1.0);
    assert_eq!(core.camera().zoom_percent, 105.0);
    core.zoom_step(-1.0);
    core.zoom_step(-1.0);
    assert_eq!(core.camera().zoom_percent, 95.0);
    assert_eq!(core.camera().zoom_label(), "95%");
}

#[test]
fn zoom_step_at_bounds_is_silent() {
    let mut core = EngineCore::new();
    core.zoom_step(1000.0);
    assert_eq!(core.camera().zoom_percent, 400.0);
    assert!(core.zoom_step(1.0).is_empty());
    core.zoom_step(-1000.0);
    assert_eq!(core.camera().zoom_percent, 10.0);
    assert!(core.zoom_step(-1.0).is_empty());
}

#[test]
fn zoom_at_keeps_focal_point() {
    let mut core = EngineCore::new();
    let actions = core.zoom_at(pt(100.0, 100.0), 1.0);
    assert!(has_camera_changed(&actions));
    assert!(approx_eq(core.camera().zoom_percent, 110.0));
    let world = core.to_world(pt(100.0, 100.0));
    assert!(approx_eq(world.x, 100.0) && approx_eq(world.y, 100.0));
}

#[test]
fn reset_camera_restores_identity() {
    let mut core = EngineCore::new();
    core.pan(55.0, 66.0);
    core.zoom_step(3.0);
    assert!(has_camera_changed(&core.reset_camera()));
    assert_eq!(core.camera(), Camera::default());
    assert!(core.reset_camera().is_empty());
}

// =============================================================
// Fit to content
// =============================================================

#[test]
fn fit_small_content_caps_at_two_hundred_percent() {
    let mut core = EngineCore::new();
    core.set_viewport(1000.0, 500.0);
    core.load(vec![make_asset_at(AssetKind::Image, 0.0, 0.0, 200.0, 100.0)]);
    let actions = core.fit_to_content();
    assert!(has_camera_changed(&actions));
    assert!(approx_eq(core.camera().zoom_percent, 200.0));
    assert!(approx_eq(core.camera().pan.x, 300.0));
    assert!(approx_eq(core.camera().pan.y, 150.0));
}

#[test]
fn fit_excludes_side_panel() {
    let mut core = EngineCore::new();
    core.set_viewport(1384.0, 500.0);
    core.set_side_panel_width(384.0);
    core.load(vec![make_asset_at(AssetKind::Image, 0.0, 0.0, 200.0, 100.0)]);
    core.fit_to_content();
    // Centered in the 1000px left of the panel.
    assert!(approx_eq(core.camera().pan.x, 300.0));
}

#[test]
fn fit_keeps_every_asset_on_screen() {
    let mut core = EngineCore::new();
    core.set_viewport(1280.0, 800.0);
    core.load(vec![
        make_asset_at(AssetKind::Image, 400.0, 200.0, 480.0, 320.0),
        make_asset_at(AssetKind::Scene, -900.0, 1200.0, 340.0, 220.0),
        make_asset_at(AssetKind::Text, 2500.0, -400.0, 340.0, 220.0),
    ]);
    core.fit_to_content();
    for asset in core.workspace.assets() {
        let tl = core.to_screen(asset.position);
        let br = core.to_screen(pt(asset.position.x + asset.width, asset.position.y + asset.height));
        assert!(tl.x >= 0.0 && tl.y >= 0.0, "{tl:?}");
        assert!(br.x <= 1280.0 && br.y <= 800.0, "{br:?}");
    }
}

#[test]
fn fit_with_no_assets_resets() {
    let mut core = EngineCore::new();
    core.set_viewport(1000.0, 500.0);
    core.pan(40.0, 40.0);
    core.fit_to_content();
    assert_eq!(core.camera(), Camera::default());
}

#[test]
fn fit_with_zero_viewport_resets() {
    let mut core = EngineCore::new();
    core.load(vec![make_asset_at(AssetKind::Image, 0.0, 0.0, 200.0, 100.0)]);
    core.zoom_step(4.0);
    core.fit_to_content();
    assert_eq!(core.camera(), Camera::default());
}

// =============================================================
// Assets
// =============================================================

#[test]
fn add_asset_uses_defaults() {
    let mut core = EngineCore::new();
    let id = core.add_asset(AssetDraft::default());
    let asset = core.asset(&id).unwrap();
    assert_eq!(asset.position, pt(500.0, 300.0));
    assert_eq!((asset.width, asset.height), (340.0, 220.0));
}

#[test]
fn add_assets_keeps_ids() {
    let mut core = EngineCore::new();
    let a = make_asset_at(AssetKind::Character, 0.0, 0.0, 10.0, 10.0);
    let id = a.id;
    let actions = core.add_assets(vec![a]);
    assert!(has_render_needed(&actions));
    assert_eq!(core.asset(&id).map(|a| a.kind), Some(AssetKind::Character));
    assert!(core.add_assets(Vec::new()).is_empty());
}

#[test]
fn remove_asset_prunes_selection_and_reports() {
    let mut core = EngineCore::new();
    let id = add_at(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.on_pointer_down(pt(5.0, 5.0), Button::Primary, no_modifiers());
    core.on_pointer_up(pt(5.0, 5.0), Button::Primary, no_modifiers());
    let actions = core.remove_asset(&id);
    assert!(has_action(&actions, |a| *a == Action::AssetsRemoved(vec![id])));
    assert!(has_action(&actions, |a| matches!(a, Action::SelectionChanged(ids) if ids.is_empty())));
    assert!(core.selection().is_empty());
    assert!(core.remove_asset(&id).is_empty());
}

#[test]
fn remove_asset_mid_drag_ends_drag() {
    let mut core = EngineCore::new();
    let id = add_at(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.on_pointer_down(pt(5.0, 5.0), Button::Primary, no_modifiers());
    core.remove_asset(&id);
    assert!(core.input_state().is_idle());
}

#[test]
fn load_prunes_selection_and_stale_drag() {
    let mut core = EngineCore::new();
    let id = add_at(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.on_pointer_down(pt(5.0, 5.0), Button::Primary, no_modifiers());
    core.load(vec![make_asset_at(AssetKind::Text, 0.0, 0.0, 10.0, 10.0)]);
    assert!(core.selection().is_empty());
    assert!(core.asset(&id).is_none());
    assert!(core.input_state().is_idle());
}

// =============================================================
// Pointer events
// =============================================================

#[test]
fn drag_scenario_at_identity() {
    let mut core = EngineCore::new();
    core.load(vec![make_asset_at(AssetKind::Image, 400.0, 200.0, 480.0, 320.0)]);
    let id = core.workspace.assets()[0].id;
    core.on_pointer_down(pt(410.0, 210.0), Button::Primary, no_modifiers());
    let actions = core.on_pointer_move(pt(460.0, 260.0), no_modifiers());
    assert!(has_action(&actions, |a| *a == Action::AssetMoved { id, position: pt(450.0, 250.0) }));
    core.on_pointer_up(pt(460.0, 260.0), Button::Primary, no_modifiers());
    assert_eq!(position(&core, id), pt(450.0, 250.0));
    assert_eq!(core.selection(), vec![id]);
}

#[test]
fn pointer_cancel_ends_drag() {
    let mut core = EngineCore::new();
    let id = add_at(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.on_pointer_down(pt(10.0, 10.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(20.0, 20.0), no_modifiers());
    core.on_pointer_cancel();
    assert!(core.input_state().is_idle());
    core.on_pointer_move(pt(90.0, 90.0), no_modifiers());
    assert_eq!(position(&core, id), pt(10.0, 10.0));
}

#[test]
fn explicit_drag_api_round_trip() {
    let mut core = EngineCore::new();
    core.zoom_step(20.0);
    let id = add_at(&mut core, 0.0, 0.0, 100.0, 100.0);
    let start = core.to_screen(pt(20.0, 20.0));
    assert!(core.begin_drag(start, id));
    let moved = core.update_drag(core.to_screen(pt(70.0, 45.0))).unwrap();
    assert!(approx_eq(moved.x, 50.0) && approx_eq(moved.y, 25.0));
    assert!(core.end_drag());
    assert!(core.update_drag(pt(0.0, 0.0)).is_none());
}

// =============================================================
// Wheel / touch
// =============================================================

#[test]
fn wheel_zoom_scenario() {
    let mut core = EngineCore::new();
    core.on_wheel(pt(100.0, 100.0), WheelDelta { dx: 0.0, dy: -120.0 }, ctrl_modifier());
    assert!(approx_eq(core.camera().zoom_percent, 110.0));
    assert_eq!(core.camera().zoom_label(), "110%");
    let world = core.to_world(pt(100.0, 100.0));
    assert!(approx_eq(world.x, 100.0) && approx_eq(world.y, 100.0));
}

#[test]
fn wheel_without_modifier_pans() {
    let mut core = EngineCore::new();
    core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 5.0, dy: 15.0 }, no_modifiers());
    assert_eq!(core.camera().pan, pt(-5.0, -15.0));
}

#[test]
fn touch_pinch_zooms_and_ends() {
    let mut core = EngineCore::new();
    core.on_touch_start(&[pt(100.0, 100.0), pt(200.0, 100.0)]);
    let actions = core.on_touch_move(&[pt(90.0, 100.0), pt(210.0, 100.0)]);
    assert!(has_camera_changed(&actions));
    assert!(approx_eq(core.camera().zoom_percent, 110.0));
    core.on_touch_end(&[pt(90.0, 100.0)]);
    assert!(core.input_state().is_idle());
}

// =============================================================
// Keys
// =============================================================

#[test]
fn space_held_pans_with_primary() {
    let mut core = EngineCore::new();
    let id = add_at(&mut core, 0.0, 0.0, 100.0, 100.0);
    let actions = core.on_key_down(&key(" "), no_modifiers());
    assert!(has_action(&actions, |a| matches!(a, Action::SetCursor(c) if c == "grab")));
    core.on_pointer_down(pt(50.0, 50.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(80.0, 60.0), no_modifiers());
    assert_eq!(core.camera().pan, pt(30.0, 10.0));
    assert_eq!(position(&core, id), pt(0.0, 0.0));
    core.on_pointer_up(pt(80.0, 60.0), Button::Primary, no_modifiers());
    core.on_key_up(&key(" "), no_modifiers());
    assert!(!core.gesture.pan_key_held());
}

#[test]
fn escape_cancels_and_clears_selection() {
    let mut core = EngineCore::new();
    add_at(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.on_pointer_down(pt(50.0, 50.0), Button::Primary, no_modifiers());
    let actions = core.on_key_down(&key("Escape"), no_modifiers());
    assert!(core.input_state().is_idle());
    assert!(core.selection().is_empty());
    assert!(has_action(&actions, |a| matches!(a, Action::SelectionChanged(ids) if ids.is_empty())));
}

#[test]
fn delete_removes_selected_assets() {
    let mut core = EngineCore::new();
    let a = add_at(&mut core, 0.0, 0.0, 10.0, 10.0);
    let b = add_at(&mut core, 100.0, 0.0, 10.0, 10.0);
    let c = add_at(&mut core, 200.0, 0.0, 10.0, 10.0);
    core.on_pointer_down(pt(5.0, 5.0), Button::Primary, no_modifiers());
    core.on_pointer_up(pt(5.0, 5.0), Button::Primary, no_modifiers());
    let shift = Modifiers { shift: true, ..Default::default() };
    core.on_pointer_down(pt(105.0, 5.0), Button::Primary, shift);
    core.on_pointer_up(pt(105.0, 5.0), Button::Primary, shift);

    let actions = core.on_key_down(&key("Delete"), no_modifiers());
    let Some(Action::AssetsRemoved(removed)) = actions.first() else {
        panic!("expected AssetsRemoved first, got {actions:?}");
    };
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(removed, &expected);
    assert!(core.asset(&a).is_none());
    assert!(core.asset(&b).is_none());
    assert!(core.asset(&c).is_some());
    assert!(core.selection().is_empty());
}

#[test]
fn backspace_with_empty_selection_is_noop() {
    let mut core = EngineCore::new();
    add_at(&mut core, 0.0, 0.0, 10.0, 10.0);
    assert!(core.on_key_down(&key("Backspace"), no_modifiers()).is_empty());
    assert_eq!(core.workspace.len(), 1);
}

#[test]
fn delete_during_drag_is_ignored() {
    let mut core = EngineCore::new();
    let id = add_at(&mut core, 0.0, 0.0, 10.0, 10.0);
    core.on_pointer_down(pt(5.0, 5.0), Button::Primary, no_modifiers());
    assert!(core.on_key_down(&key("Delete"), no_modifiers()).is_empty());
    assert!(core.asset(&id).is_some());
}

#[test]
fn unrelated_key_is_ignored() {
    let mut core = EngineCore::new();
    assert!(core.on_key_down(&key("q"), no_modifiers()).is_empty());
    assert!(core.on_key_up(&key("q"), no_modifiers()).is_empty());
}
