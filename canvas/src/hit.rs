//! Hit-testing: which asset lies under a world-space point.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::doc::{AssetId, AssetStore};

/// Return the top-most asset under `world_pt`, checking selected assets first.
///
/// Within each group, later assets sit above earlier ones. Edges count as
/// inside.
#[must_use]
pub fn hit_test<S: AssetStore + ?Sized>(world_pt: Point, store: &S) -> Option<AssetId> {
    if !world_pt.is_finite() {
        return None;
    }
    let selection = store.selection();
    let assets = store.assets();

    assets
        .iter()
        .rev()
        .filter(|a| selection.contains(&a.id))
        .chain(assets.iter().rev().filter(|a| !selection.contains(&a.id)))
        .find(|a| a.rect().contains(world_pt))
        .map(|a| a.id)
}
