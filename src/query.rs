//! Query Engine - Pure Filter/Search/Sort
//!
//! Read paths never mutate; everything here is computed on demand from the
//! current collection.

use serde::{Deserialize, Serialize};

use crate::assets::{Asset, AssetType, ClientId, UsageContext};

/// Free-text search: whitespace-delimited terms, every term must match at
/// least one of name/description/tags/type/variant, case-insensitively.
/// An empty query matches everything.
pub fn search<'a>(assets: &'a [Asset], query: &str) -> Vec<&'a Asset> {
    assets.iter().filter(|a| matches_query(a, query)).collect()
}

pub fn matches_query(asset: &Asset, query: &str) -> bool {
    query.split_whitespace().all(|term| {
        let term = term.to_lowercase();
        asset.name.to_lowercase().contains(&term)
            || asset.description.to_lowercase().contains(&term)
            || asset.tags.iter().any(|t| t.to_lowercase().contains(&term))
            || asset.asset_type.as_str().contains(&term)
            || asset.variant.to_lowercase().contains(&term)
    })
}

/// Filter criteria. All populated criteria compose by logical AND; the tag
/// and context sets match when any entry matches. Defaults match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub client: Option<ClientId>,
    #[serde(default)]
    pub types: Vec<AssetType>,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub formats: Vec<String>,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default)]
    pub primary: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub contexts: Vec<UsageContext>,
    #[serde(default)]
    pub query: String,
}

impl FilterCriteria {
    pub fn matches(&self, asset: &Asset) -> bool {
        if let Some(client) = &self.client {
            if &asset.client_id != client {
                return false;
            }
        }
        if !self.types.is_empty() && !self.types.contains(&asset.asset_type) {
            return false;
        }
        if !self.variants.is_empty()
            && !self.variants.iter().any(|v| v.eq_ignore_ascii_case(&asset.variant))
        {
            return false;
        }
        if !self.formats.is_empty()
            && !self.formats.iter().any(|f| f.eq_ignore_ascii_case(&asset.format))
        {
            return false;
        }
        if let Some(approved) = self.approved {
            if asset.is_approved != approved {
                return false;
            }
        }
        if let Some(primary) = self.primary {
            if asset.is_primary != primary {
                return false;
            }
        }
        if !self.tags.is_empty() {
            let any_tag = self
                .tags
                .iter()
                .any(|t| asset.tags.iter().any(|at| at.eq_ignore_ascii_case(t)));
            if !any_tag {
                return false;
            }
        }
        if !self.contexts.is_empty()
            && !self.contexts.iter().any(|c| asset.allowed_contexts.contains(c))
        {
            return false;
        }
        matches_query(asset, &self.query)
    }
}

pub fn filter<'a>(assets: &'a [Asset], criteria: &FilterCriteria) -> Vec<&'a Asset> {
    assets.iter().filter(|a| criteria.matches(a)).collect()
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    #[default]
    Date,
    Usage,
    Type,
    Size,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Stable sort; ties keep their prior relative order.
pub fn sort(assets: &mut [&Asset], key: SortKey, order: SortOrder) {
    assets.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Date => a.uploaded_at.cmp(&b.uploaded_at),
            SortKey::Usage => a.total_downloads.cmp(&b.total_downloads),
            SortKey::Type => a.asset_type.as_str().cmp(b.asset_type.as_str()),
            SortKey::Size => a.file_size.cmp(&b.file_size),
        };
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}
