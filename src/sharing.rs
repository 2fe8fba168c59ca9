//! Share Links - Ephemeral, Access-Limited Pointers
//!
//! Links live outside normal access control: an unguessable token, a hard
//! expiry, an optional access budget, an optional password. Dead links are
//! refused, never purged.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::assets::AssetId;
use crate::hashing::sha256_hex;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShareError {
    #[error("Share link not found: {0}")]
    NotFound(String),

    #[error("Share link expired")]
    Expired,

    #[error("Share link access limit reached")]
    AccessLimit,

    #[error("Share link password mismatch")]
    Auth,
}

#[derive(Debug, Clone, Default)]
pub struct ShareOptions {
    pub max_access: Option<u32>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub id: String,
    /// Snapshot of the shared asset ids at creation time.
    pub asset_ids: Vec<AssetId>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub access_count: u32,
    #[serde(default)]
    pub max_access: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ShareLink {
    pub fn url(&self, origin: &str) -> String {
        format!("{}/share/{}", origin.trim_end_matches('/'), self.id)
    }
}

/// Session-scoped registry of issued links. Not part of the persisted
/// snapshot; links die with the session at the latest.
pub struct ShareLinkRegistry {
    links: HashMap<String, ShareLink>,
}

impl ShareLinkRegistry {
    pub fn new() -> Self {
        Self { links: HashMap::new() }
    }

    pub fn get(&self, id: &str) -> Option<&ShareLink> {
        self.links.get(id)
    }

    /// Issue a link expiring `ttl` from now. A zero ttl is already expired
    /// by the time any resolution can observe it.
    pub fn issue(&mut self, asset_ids: Vec<AssetId>, ttl: Duration, options: ShareOptions) -> String {
        self.issue_at(Utc::now(), asset_ids, ttl, options)
    }

    pub fn issue_at(
        &mut self,
        now: DateTime<Utc>,
        asset_ids: Vec<AssetId>,
        ttl: Duration,
        options: ShareOptions,
    ) -> String {
        let id = mint_token();
        let link = ShareLink {
            id: id.clone(),
            asset_ids,
            created_at: now,
            expires_at: now + ttl,
            access_count: 0,
            max_access: options.max_access,
            password: options.password,
        };
        self.links.insert(id.clone(), link);
        id
    }

    /// Resolve a link, consuming one unit of its access budget on success.
    pub fn resolve(&mut self, id: &str, password: Option<&str>) -> Result<Vec<AssetId>, ShareError> {
        self.resolve_at(Utc::now(), id, password)
    }

    pub fn resolve_at(
        &mut self,
        now: DateTime<Utc>,
        id: &str,
        password: Option<&str>,
    ) -> Result<Vec<AssetId>, ShareError> {
        let link = self
            .links
            .get_mut(id)
            .ok_or_else(|| ShareError::NotFound(id.to_string()))?;

        if now > link.expires_at {
            return Err(ShareError::Expired);
        }
        if let Some(max) = link.max_access {
            if link.access_count >= max {
                return Err(ShareError::AccessLimit);
            }
        }
        if let Some(expected) = &link.password {
            if password != Some(expected.as_str()) {
                return Err(ShareError::Auth);
            }
        }

        link.access_count += 1;
        Ok(link.asset_ids.clone())
    }
}

impl Default for ShareLinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Unguessable link token: fresh UUID entropy through SHA-256.
fn mint_token() -> String {
    sha256_hex(Uuid::new_v4().as_bytes())
}
