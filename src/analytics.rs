//! Analytics - Full Recompute Per Mutation
//!
//! No incremental bookkeeping: every mutation rebuilds the summary from the
//! collection, so the numbers can never drift from the assets they describe.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assets::Asset;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_assets: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_client: BTreeMap<String, usize>,
    pub top_downloads: Vec<AssetDigest>,
    pub recent_uploads: Vec<AssetDigest>,
    pub total_storage_bytes: u64,
    /// Percentage of compliant assets; 100 for an empty collection.
    pub compliance_rate: f64,
    pub average_downloads: f64,
    pub by_format: BTreeMap<String, FormatStats>,
}

/// Slim asset reference used in ranked lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDigest {
    pub id: String,
    pub name: String,
    pub client_id: String,
    pub total_downloads: u64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatStats {
    pub count: usize,
    pub average_downloads: f64,
}

impl Default for Analytics {
    fn default() -> Self {
        compute(&[], 5)
    }
}

impl AssetDigest {
    fn of(asset: &Asset) -> Self {
        Self {
            id: asset.id.clone(),
            name: asset.name.clone(),
            client_id: asset.client_id.clone(),
            total_downloads: asset.total_downloads,
            uploaded_at: asset.uploaded_at,
        }
    }
}

pub fn compute(assets: &[Asset], top_n: usize) -> Analytics {
    let total = assets.len();

    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_client: BTreeMap<String, usize> = BTreeMap::new();
    let mut downloads_by_format: BTreeMap<String, (usize, u64)> = BTreeMap::new();
    let mut total_storage_bytes = 0u64;
    let mut total_downloads = 0u64;
    let mut compliant = 0usize;

    for asset in assets {
        *by_type.entry(asset.asset_type.as_str().to_string()).or_default() += 1;
        *by_client.entry(asset.client_id.clone()).or_default() += 1;
        let entry = downloads_by_format
            .entry(asset.format.to_lowercase())
            .or_insert((0, 0));
        entry.0 += 1;
        entry.1 += asset.total_downloads;
        total_storage_bytes += asset.file_size;
        total_downloads += asset.total_downloads;
        if asset.guidelines_compliant {
            compliant += 1;
        }
    }

    let mut by_downloads: Vec<&Asset> = assets.iter().collect();
    by_downloads.sort_by(|a, b| b.total_downloads.cmp(&a.total_downloads));
    let top_downloads = by_downloads.iter().take(top_n).map(|a| AssetDigest::of(a)).collect();

    let mut by_upload: Vec<&Asset> = assets.iter().collect();
    by_upload.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
    let recent_uploads = by_upload.iter().take(top_n).map(|a| AssetDigest::of(a)).collect();

    let compliance_rate = if total == 0 {
        100.0
    } else {
        compliant as f64 / total as f64 * 100.0
    };
    let average_downloads = if total == 0 {
        0.0
    } else {
        total_downloads as f64 / total as f64
    };

    let by_format = downloads_by_format
        .into_iter()
        .map(|(format, (count, downloads))| {
            let stats = FormatStats {
                count,
                average_downloads: downloads as f64 / count as f64,
            };
            (format, stats)
        })
        .collect();

    Analytics {
        total_assets: total,
        by_type,
        by_client,
        top_downloads,
        recent_uploads,
        total_storage_bytes,
        compliance_rate,
        average_downloads,
        by_format,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetType, NewAsset};

    fn asset(id: &str, format: &str, downloads: u64, compliant: bool) -> Asset {
        let mut a = Asset::from_new(
            NewAsset {
                client_id: "client-1".to_string(),
                name: format!("asset-{id}"),
                description: String::new(),
                asset_type: AssetType::Logo,
                variant: String::new(),
                format: format.to_string(),
                tags: vec![],
                file_size: 100,
                dimensions: None,
                url: String::new(),
                thumbnail_url: None,
                is_public: false,
                allowed_users: vec![],
                allowed_contexts: vec![],
                uploaded_by: "tester".to_string(),
                expires_at: None,
            },
            id.to_string(),
            Utc::now(),
        );
        a.total_downloads = downloads;
        a.guidelines_compliant = compliant;
        a
    }

    #[test]
    fn test_empty_collection_is_fully_compliant() {
        let summary = compute(&[], 5);
        assert_eq!(summary.total_assets, 0);
        assert_eq!(summary.compliance_rate, 100.0);
        assert_eq!(summary.average_downloads, 0.0);
    }

    #[test]
    fn test_per_format_averages() {
        let assets = vec![
            asset("a", "svg", 10, true),
            asset("b", "svg", 20, true),
            asset("c", "png", 6, false),
        ];
        let summary = compute(&assets, 5);

        assert_eq!(summary.total_assets, 3);
        assert_eq!(summary.total_storage_bytes, 300);
        assert_eq!(summary.by_format["svg"].count, 2);
        assert_eq!(summary.by_format["svg"].average_downloads, 15.0);
        assert_eq!(summary.by_format["png"].average_downloads, 6.0);
        assert!((summary.compliance_rate - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_downloads_ranked() {
        let assets = vec![
            asset("a", "svg", 1, true),
            asset("b", "svg", 30, true),
            asset("c", "png", 7, true),
        ];
        let summary = compute(&assets, 2);
        let ids: Vec<&str> = summary.top_downloads.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }
}
