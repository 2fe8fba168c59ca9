//! Object Storage Contract
//!
//! The engine never touches file bytes itself; it consumes this collaborator
//! and stores only the receipt. Upload failure surfaces to the caller with
//! the collection untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::ClientId;

/// Opaque passthrough of a collaborator failure.
#[derive(Debug, Error)]
#[error("Storage error: {0}")]
pub struct StorageError(pub String);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    pub file_name: String,
    pub content_type: String,
    pub client_id: ClientId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub path: String,
}

pub trait ObjectStorage {
    fn upload(&self, file: &[u8], metadata: &UploadMetadata) -> Result<UploadReceipt, StorageError>;
}
