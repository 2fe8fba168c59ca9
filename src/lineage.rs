//! Version Lineage - Root Index Over The Asset Arena
//!
//! A lineage is the root asset plus everything derived from it, directly or
//! transitively via `parent_asset_id`. The index is computed once per query
//! instead of re-walking parent pointers ad hoc.

use std::collections::{HashMap, HashSet};

use crate::assets::Asset;

/// Lineage index over a borrowed asset collection.
pub struct Lineage<'a> {
    assets: &'a [Asset],
    arena: HashMap<&'a str, &'a Asset>,
    /// Asset id -> lineage root id.
    root_ids: HashMap<&'a str, &'a str>,
}

impl<'a> Lineage<'a> {
    pub fn build(assets: &'a [Asset]) -> Self {
        let arena: HashMap<&str, &Asset> =
            assets.iter().map(|a| (a.id.as_str(), a)).collect();

        let mut root_ids = HashMap::new();
        for asset in assets {
            root_ids.insert(asset.id.as_str(), resolve_root_id(&arena, asset));
        }

        Self { assets, arena, root_ids }
    }

    pub fn get(&self, id: &str) -> Option<&'a Asset> {
        self.arena.get(id).copied()
    }

    /// The root of the lineage `id` belongs to, if `id` is known.
    pub fn root_of(&self, id: &str) -> Option<&'a Asset> {
        let root_id = self.root_ids.get(id)?;
        self.arena.get(root_id).copied()
    }

    /// Every member of the lineage rooted at `root_id`, in collection order.
    pub fn members_of(&self, root_id: &str) -> Vec<&'a Asset> {
        self.assets
            .iter()
            .filter(|a| self.root_ids.get(a.id.as_str()).copied() == Some(root_id))
            .collect()
    }

    /// Version number for the next version in the lineage rooted at `root_id`.
    pub fn next_version_number(&self, root_id: &str) -> u32 {
        self.members_of(root_id)
            .iter()
            .map(|a| a.version_number)
            .max()
            .unwrap_or(0)
            + 1
    }
}

fn resolve_root_id<'a>(arena: &HashMap<&'a str, &'a Asset>, asset: &'a Asset) -> &'a str {
    let mut current = asset;
    let mut seen: HashSet<&str> = HashSet::new();
    // Dangling or cyclic parent pointers (possible in hand-edited snapshots)
    // terminate the walk at the last resolvable asset.
    while let Some(parent_id) = current.parent_asset_id.as_deref() {
        if !seen.insert(current.id.as_str()) {
            break;
        }
        match arena.get(parent_id) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    current.id.as_str()
}

/// All versions attached to `parent_id` (itself included when present),
/// newest version first.
pub fn versions_of<'a>(assets: &'a [Asset], parent_id: &str) -> Vec<&'a Asset> {
    let mut versions: Vec<&Asset> = assets
        .iter()
        .filter(|a| a.id == parent_id || a.parent_asset_id.as_deref() == Some(parent_id))
        .collect();
    versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
    versions
}
