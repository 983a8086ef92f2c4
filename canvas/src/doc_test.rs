#![allow(clippy::float_cmp)]

use super::*;

fn asset_at(kind: AssetKind, x: f64, y: f64, w: f64, h: f64) -> Asset {
    Asset {
        id: Uuid::new_v4(),
        kind,
        title: "card".into(),
        content: String::new(),
        description: None,
        position: Point::new(x, y),
        width: w,
        height: h,
    }
}

fn workspace_with(assets: Vec<Asset>) -> Workspace {
    let mut ws = Workspace::new();
    ws.load(assets);
    ws
}

// =============================================================
// AssetKind
// =============================================================

#[test]
fn kind_default_is_image() {
    assert_eq!(AssetKind::default(), AssetKind::Image);
}

#[test]
fn kind_labels() {
    assert_eq!(AssetKind::Image.label(), "IMAGE");
    assert_eq!(AssetKind::Video.label(), "VIDEO");
    assert_eq!(AssetKind::Text.label(), "TEXT");
    assert_eq!(AssetKind::Character.label(), "CHARACTER");
    assert_eq!(AssetKind::Scene.label(), "SCENE");
}

#[test]
fn kind_textual_split() {
    assert!(AssetKind::Text.is_textual());
    assert!(AssetKind::Character.is_textual());
    assert!(AssetKind::Scene.is_textual());
    assert!(!AssetKind::Image.is_textual());
    assert!(!AssetKind::Video.is_textual());
}

#[test]
fn kind_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&AssetKind::Character).unwrap(), "\"character\"");
    let kind: AssetKind = serde_json::from_str("\"scene\"").unwrap();
    assert_eq!(kind, AssetKind::Scene);
}

#[test]
fn kind_rejects_unknown_value() {
    assert!(serde_json::from_str::<AssetKind>("\"hologram\"").is_err());
}

// =============================================================
// Asset / AssetDraft
// =============================================================

#[test]
fn asset_rect_matches_geometry() {
    let a = asset_at(AssetKind::Image, 400.0, 200.0, 480.0, 320.0);
    assert_eq!(a.rect(), Rect::new(400.0, 200.0, 480.0, 320.0));
}

#[test]
fn empty_draft_takes_defaults() {
    let a = AssetDraft::default().into_asset();
    assert_eq!(a.kind, AssetKind::Image);
    assert_eq!(a.title, DEFAULT_ASSET_TITLE);
    assert_eq!(a.content, "");
    assert_eq!(a.position, Point::new(DEFAULT_ASSET_X, DEFAULT_ASSET_Y));
    assert_eq!(a.width, DEFAULT_ASSET_WIDTH);
    assert_eq!(a.height, DEFAULT_ASSET_HEIGHT);
}

#[test]
fn draft_fields_are_respected() {
    let a = AssetDraft {
        kind: Some(AssetKind::Scene),
        title: Some("Rooftop".into()),
        content: Some("Night, rain".into()),
        description: Some("Opening scene".into()),
        position: Some(Point::new(-20.0, 40.0)),
        width: Some(600.0),
        height: Some(90.0),
    }
    .into_asset();
    assert_eq!(a.kind, AssetKind::Scene);
    assert_eq!(a.title, "Rooftop");
    assert_eq!(a.content, "Night, rain");
    assert_eq!(a.description.as_deref(), Some("Opening scene"));
    assert_eq!(a.position, Point::new(-20.0, 40.0));
    assert_eq!(a.width, 600.0);
    assert_eq!(a.height, 90.0);
}

#[test]
fn draft_blank_title_falls_back() {
    let a = AssetDraft { title: Some("   ".into()), ..Default::default() }.into_asset();
    assert_eq!(a.title, DEFAULT_ASSET_TITLE);
}

#[test]
fn draft_non_positive_size_is_normalized() {
    let a = AssetDraft { width: Some(0.0), height: Some(-5.0), ..Default::default() }.into_asset();
    assert_eq!(a.width, DEFAULT_ASSET_WIDTH);
    assert_eq!(a.height, DEFAULT_ASSET_HEIGHT);
}

#[test]
fn drafts_get_unique_ids() {
    let a = AssetDraft::default().into_asset();
    let b = AssetDraft::default().into_asset();
    assert_ne!(a.id, b.id);
}

#[test]
fn asset_serde_round_trip_keeps_fields() {
    let a = asset_at(AssetKind::Video, 1.0, 2.0, 3.0, 4.0);
    let json = serde_json::to_value(&a).unwrap();
    assert_eq!(json["kind"], "video");
    assert!(json.get("description").is_none());
    let back: Asset = serde_json::from_value(json).unwrap();
    assert_eq!(back, a);
}

// =============================================================
// Workspace: insert / add / remove / load
// =============================================================

#[test]
fn workspace_new_is_empty() {
    let ws = Workspace::new();
    assert!(ws.is_empty());
    assert_eq!(ws.len(), 0);
    assert!(ws.selection().is_empty());
}

#[test]
fn add_asset_returns_id_of_inserted_asset() {
    let mut ws = Workspace::new();
    let id = ws.add_asset(AssetDraft { kind: Some(AssetKind::Text), ..Default::default() });
    assert_eq!(ws.len(), 1);
    assert_eq!(ws.asset(&id).map(|a| a.kind), Some(AssetKind::Text));
}

#[test]
fn insert_replaces_in_place() {
    let a = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let b = asset_at(AssetKind::Image, 5.0, 5.0, 10.0, 10.0);
    let mut ws = workspace_with(vec![a.clone(), b.clone()]);
    let mut moved = a.clone();
    moved.position = Point::new(99.0, 99.0);
    ws.insert(moved);
    assert_eq!(ws.len(), 2);
    assert_eq!(ws.assets()[0].id, a.id);
    assert_eq!(ws.assets()[0].position, Point::new(99.0, 99.0));
}

#[test]
fn insert_normalizes_geometry() {
    let mut ws = Workspace::new();
    let a = asset_at(AssetKind::Image, f64::NAN, 0.0, -1.0, 0.0);
    let id = a.id;
    ws.insert(a);
    let stored = ws.asset(&id).unwrap();
    assert!(stored.position.is_finite());
    assert!(stored.width > 0.0 && stored.height > 0.0);
}

#[test]
fn remove_asset_returns_it() {
    let a = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let id = a.id;
    let mut ws = workspace_with(vec![a]);
    assert_eq!(ws.remove_asset(&id).map(|a| a.id), Some(id));
    assert!(ws.is_empty());
}

#[test]
fn remove_asset_prunes_selection() {
    let a = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let b = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let (ida, idb) = (a.id, b.id);
    let mut ws = workspace_with(vec![a, b]);
    ws.set_selection([ida, idb].into_iter().collect());
    ws.remove_asset(&ida);
    assert!(!ws.is_selected(&ida));
    assert!(ws.is_selected(&idb));
}

#[test]
fn remove_missing_asset_is_none() {
    let mut ws = Workspace::new();
    assert!(ws.remove_asset(&Uuid::new_v4()).is_none());
}

#[test]
fn load_replaces_assets_and_prunes_selection() {
    let a = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let b = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let (ida, idb) = (a.id, b.id);
    let mut ws = workspace_with(vec![a.clone(), b]);
    ws.set_selection([ida, idb].into_iter().collect());
    ws.load(vec![a]);
    assert_eq!(ws.len(), 1);
    assert!(ws.is_selected(&ida));
    assert!(!ws.is_selected(&idb));
}

// =============================================================
// Workspace: AssetStore contract
// =============================================================

#[test]
fn set_asset_position_moves_asset() {
    let a = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let id = a.id;
    let mut ws = workspace_with(vec![a]);
    assert!(ws.set_asset_position(&id, Point::new(450.0, 250.0)));
    assert_eq!(ws.asset(&id).unwrap().position, Point::new(450.0, 250.0));
}

#[test]
fn set_asset_position_missing_returns_false() {
    let mut ws = Workspace::new();
    assert!(!ws.set_asset_position(&Uuid::new_v4(), Point::new(1.0, 1.0)));
}

#[test]
fn set_selection_drops_unknown_ids() {
    let a = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let id = a.id;
    let mut ws = workspace_with(vec![a]);
    ws.set_selection([id, Uuid::new_v4()].into_iter().collect());
    assert_eq!(ws.selection().len(), 1);
    assert!(ws.is_selected(&id));
}

// =============================================================
// Workspace: click selection
// =============================================================

#[test]
fn select_single_replaces_selection() {
    let a = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let b = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let (ida, idb) = (a.id, b.id);
    let mut ws = workspace_with(vec![a, b]);
    assert!(ws.select(&ida, false));
    assert!(ws.select(&idb, false));
    assert_eq!(ws.selection().iter().copied().collect::<Vec<_>>(), vec![idb]);
}

#[test]
fn select_multi_adds_then_toggles_off() {
    let a = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let b = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let (ida, idb) = (a.id, b.id);
    let mut ws = workspace_with(vec![a, b]);
    ws.select(&ida, false);
    assert!(ws.select(&idb, true));
    assert_eq!(ws.selection().len(), 2);
    assert!(!ws.select(&ida, true));
    assert!(!ws.is_selected(&ida));
    assert!(ws.is_selected(&idb));
}

#[test]
fn select_unknown_id_is_ignored() {
    let a = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let id = a.id;
    let mut ws = workspace_with(vec![a]);
    ws.select(&id, false);
    assert!(!ws.select(&Uuid::new_v4(), false));
    assert!(ws.is_selected(&id));
}

#[test]
fn clear_selection_reports_change() {
    let a = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let id = a.id;
    let mut ws = workspace_with(vec![a]);
    assert!(!ws.clear_selection());
    ws.select(&id, false);
    assert!(ws.clear_selection());
    assert!(ws.selection().is_empty());
}

#[test]
fn selected_assets_follow_stacking_order() {
    let a = asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 10.0);
    let b = asset_at(AssetKind::Text, 0.0, 0.0, 10.0, 10.0);
    let c = asset_at(AssetKind::Scene, 0.0, 0.0, 10.0, 10.0);
    let (ida, idc) = (a.id, c.id);
    let mut ws = workspace_with(vec![a, b, c]);
    ws.set_selection([idc, ida].into_iter().collect());
    let kinds: Vec<AssetKind> = ws.selected_assets().iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![AssetKind::Image, AssetKind::Scene]);
}

#[test]
fn rects_cover_every_asset() {
    let ws = workspace_with(vec![
        asset_at(AssetKind::Image, 0.0, 0.0, 10.0, 20.0),
        asset_at(AssetKind::Image, 30.0, 40.0, 50.0, 60.0),
    ]);
    assert_eq!(ws.rects(), vec![Rect::new(0.0, 0.0, 10.0, 20.0), Rect::new(30.0, 40.0, 50.0, 60.0)]);
}
