//! Document model: canvas assets, the store contract, and the in-memory workspace.
//!
//! This module defines what sits on the canvas (`Asset`, `AssetKind`), a
//! sparse creation type that fills in defaults (`AssetDraft`), the contract the
//! gesture machine uses to read positions and write moves and selection
//! (`AssetStore`), and the runtime store that owns the live assets plus the
//! selection set (`Workspace`).
//!
//! Assets arrive from the host (user actions) and from the agent backend
//! (generated assets). The gesture machine only ever goes through
//! `AssetStore`, so it works against any host-side store that honours the
//! selection invariant: every selected id names a live asset.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::{
    DEFAULT_ASSET_HEIGHT, DEFAULT_ASSET_TITLE, DEFAULT_ASSET_WIDTH, DEFAULT_ASSET_X, DEFAULT_ASSET_Y,
};
use crate::fit::Rect;

/// Unique identifier for an asset.
pub type AssetId = Uuid;

/// The kind of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Still image; `content` holds a URL or `data:` URL.
    #[default]
    Image,
    /// Video clip; `content` holds a URL.
    Video,
    /// Free text note.
    Text,
    /// Character card; `content` holds the character description.
    Character,
    /// Scene card; `content` holds the scene description.
    Scene,
}

impl AssetKind {
    /// Upper-case label used in cards and in assistant context.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
            Self::Text => "TEXT",
            Self::Character => "CHARACTER",
            Self::Scene => "SCENE",
        }
    }

    /// Whether `content` is prose rather than a media reference.
    #[must_use]
    pub fn is_textual(self) -> bool {
        match self {
            Self::Text | Self::Character | Self::Scene => true,
            Self::Image | Self::Video => false,
        }
    }
}

/// An asset as stored in the workspace and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier for this asset.
    pub id: AssetId,
    /// What the card shows.
    pub kind: AssetKind,
    /// Card title.
    pub title: String,
    /// URL for media kinds, prose for textual kinds.
    pub content: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Top-left corner in world coordinates.
    pub position: Point,
    /// Width in world units. Always positive.
    pub width: f64,
    /// Height in world units. Always positive.
    pub height: f64,
}

impl Asset {
    /// World-space bounds of the card.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }

    /// Replace non-positive or non-finite geometry with defaults.
    fn normalize(&mut self) {
        if !(self.width.is_finite() && self.width > 0.0) {
            self.width = DEFAULT_ASSET_WIDTH;
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            self.height = DEFAULT_ASSET_HEIGHT;
        }
        if !self.position.is_finite() {
            self.position = Point::new(DEFAULT_ASSET_X, DEFAULT_ASSET_Y);
        }
    }
}

/// A partially specified asset. Missing fields take defaults on insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AssetKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl AssetDraft {
    /// Build a full asset with a fresh id, filling gaps with defaults.
    #[must_use]
    pub fn into_asset(self) -> Asset {
        let mut asset = Asset {
            id: Uuid::new_v4(),
            kind: self.kind.unwrap_or_default(),
            title: self
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ASSET_TITLE.to_owned()),
            content: self.content.unwrap_or_default(),
            description: self.description,
            position: self
                .position
                .unwrap_or(Point::new(DEFAULT_ASSET_X, DEFAULT_ASSET_Y)),
            width: self.width.unwrap_or(DEFAULT_ASSET_WIDTH),
            height: self.height.unwrap_or(DEFAULT_ASSET_HEIGHT),
        };
        asset.normalize();
        asset
    }
}

/// What the gesture machine needs from whoever owns the assets.
///
/// Implementations must keep `selection()` a subset of the live asset ids.
pub trait AssetStore {
    /// All assets, bottom-most first.
    fn assets(&self) -> &[Asset];

    /// Look up an asset by id.
    fn asset(&self, id: &AssetId) -> Option<&Asset> {
        self.assets().iter().find(|a| a.id == *id)
    }

    /// Move an asset's top-left corner. Returns false if the asset doesn't exist.
    fn set_asset_position(&mut self, id: &AssetId, position: Point) -> bool;

    /// Currently selected asset ids.
    fn selection(&self) -> &BTreeSet<AssetId>;

    /// Replace the selection. Ids that name no live asset are dropped.
    fn set_selection(&mut self, ids: BTreeSet<AssetId>);
}

/// In-memory asset store with a selection set.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    assets: Vec<Asset>,
    selection: BTreeSet<AssetId>,
}

impl Workspace {
    /// Create an empty workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an asset from a draft and return its id.
    pub fn add_asset(&mut self, draft: AssetDraft) -> AssetId {
        let asset = draft.into_asset();
        let id = asset.id;
        self.assets.push(asset);
        id
    }

    /// Insert or replace an asset. A replaced asset keeps its stacking slot.
    pub fn insert(&mut self, mut asset: Asset) {
        asset.normalize();
        if let Some(existing) = self.assets.iter_mut().find(|a| a.id == asset.id) {
            *existing = asset;
        } else {
            self.assets.push(asset);
        }
    }

    /// Remove an asset by id, returning it if it was present.
    ///
    /// The id is pruned from the selection as well.
    pub fn remove_asset(&mut self, id: &AssetId) -> Option<Asset> {
        let idx = self.assets.iter().position(|a| a.id == *id)?;
        self.selection.remove(id);
        Some(self.assets.remove(idx))
    }

    /// Replace all assets. The selection keeps only ids that survive.
    pub fn load(&mut self, assets: Vec<Asset>) {
        self.assets.clear();
        for asset in assets {
            self.insert(asset);
        }
        let live: BTreeSet<AssetId> = self.assets.iter().map(|a| a.id).collect();
        self.selection.retain(|id| live.contains(id));
    }

    /// Click-selection: replace the selection with `id`, or toggle `id` when `multi`.
    ///
    /// Unknown ids leave the selection untouched. Returns whether `id` is
    /// selected afterwards.
    pub fn select(&mut self, id: &AssetId, multi: bool) -> bool {
        if self.asset(id).is_none() {
            return false;
        }
        if !multi {
            self.selection.clear();
            self.selection.insert(*id);
            return true;
        }
        if self.selection.remove(id) {
            false
        } else {
            self.selection.insert(*id);
            true
        }
    }

    /// Deselect everything. Returns false if nothing was selected.
    pub fn clear_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        self.selection.clear();
        true
    }

    /// Whether `id` is currently selected.
    #[must_use]
    pub fn is_selected(&self, id: &AssetId) -> bool {
        self.selection.contains(id)
    }

    /// Selected assets in stacking order.
    #[must_use]
    pub fn selected_assets(&self) -> Vec<&Asset> {
        self.assets
            .iter()
            .filter(|a| self.selection.contains(&a.id))
            .collect()
    }

    /// World-space bounds of every asset, for fitting.
    #[must_use]
    pub fn rects(&self) -> Vec<Rect> {
        self.assets.iter().map(Asset::rect).collect()
    }

    /// Number of assets currently in the workspace.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Returns `true` if the workspace contains no assets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetStore for Workspace {
    fn assets(&self) -> &[Asset] {
        &self.assets
    }

    fn set_asset_position(&mut self, id: &AssetId, position: Point) -> bool {
        let Some(asset) = self.assets.iter_mut().find(|a| a.id == *id) else {
            return false;
        };
        asset.position = position;
        true
    }

    fn selection(&self) -> &BTreeSet<AssetId> {
        &self.selection
    }

    fn set_selection(&mut self, ids: BTreeSet<AssetId>) {
        let live: BTreeSet<AssetId> = self.assets.iter().map(|a| a.id).collect();
        self.selection = ids.into_iter().filter(|id| live.contains(id)).collect();
    }
}
