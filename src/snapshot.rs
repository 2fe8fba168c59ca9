//! Snapshot - The Persisted Document
//!
//! One serialized document holds everything durable: assets, guidelines,
//! collections, settings and view state. Selection, loading flags, transient
//! errors and share links are session-only and never written. Every field
//! defaults, so documents from older schemas keep deserializing.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::{Asset, Collection, Guidelines, Settings};
use crate::hashing::compute_content_hash;
use crate::query::{FilterCriteria, SortKey, SortOrder};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot requires engine >= {required}, current is {current}")]
    EngineVersionMismatch { required: String, current: String },

    #[error("Snapshot version parse error: {0}")]
    VersionParse(#[from] semver::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "default_engine_min_version")]
    pub engine_min_version: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub guidelines: Vec<Guidelines>,
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub filters: FilterCriteria,
    #[serde(default)]
    pub sort_by: SortKey,
    #[serde(default)]
    pub sort_order: SortOrder,
}

fn default_engine_min_version() -> String {
    "1.0.0".to_string()
}

impl Snapshot {
    /// Canonical content hash, for tamper-evident persistence.
    pub fn content_hash(&self) -> Result<String, serde_json::Error> {
        compute_content_hash(self)
    }

    /// Refuse documents written by a newer engine than this one.
    pub fn check_engine_version(&self) -> Result<(), SnapshotError> {
        let current = semver::Version::parse(ENGINE_VERSION)?;
        let required = semver::Version::parse(&self.engine_min_version)?;
        if current < required {
            return Err(SnapshotError::EngineVersionMismatch {
                required: self.engine_min_version.clone(),
                current: ENGINE_VERSION.to_string(),
            });
        }
        Ok(())
    }
}

pub fn load_from_file(path: &Path) -> Result<Snapshot, SnapshotError> {
    let content = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&content)?;
    snapshot.check_engine_version()?;
    Ok(snapshot)
}

pub fn save_to_file(snapshot: &Snapshot, path: &Path) -> Result<(), SnapshotError> {
    let content = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, content)?;
    Ok(())
}
