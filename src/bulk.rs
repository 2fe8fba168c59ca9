//! Bulk Operations - Per-Item Outcomes
//!
//! One command, many assets, no transaction: a failing id is recorded and
//! the rest proceed. The outcome carries enough to retry just the failures.

use serde::{Deserialize, Serialize};

use crate::assets::{AssetId, AssetUpdate};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum BulkCommand {
    Approve,
    Reject { reason: String },
    MoveToCollection { collection_id: String },
    Tag { tags: Vec<String> },
    EditFields { update: AssetUpdate },
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    pub asset_id: AssetId,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, asset_id: impl Into<AssetId>, reason: impl Into<String>) {
        self.failed += 1;
        self.failures.push(BulkFailure {
            asset_id: asset_id.into(),
            reason: reason.into(),
        });
    }

    /// Ids to feed back into a retry of only the failed subset.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.asset_id.as_str()).collect()
    }
}
