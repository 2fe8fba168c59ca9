//! Export - Metadata Archives and Flat Reports
//!
//! Layered atop query results: callers select, this module packages. The
//! archive form carries per-asset canonical JSON when content fetch is
//! unavailable; the report form is a plain textual summary.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::assets::Asset;
use crate::hashing::{canonical_json, sha256_hex};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataArchive {
    pub entries: Vec<ArchiveEntry>,
    /// SHA-256 over the concatenated entry hashes.
    pub checksum: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
    pub file_name: String,
    pub data_base64: String,
    pub hash: String,
}

pub fn metadata_archive(assets: &[&Asset]) -> Result<MetadataArchive, serde_json::Error> {
    let mut entries = Vec::with_capacity(assets.len());
    let mut combined = String::new();

    for asset in assets {
        let payload = canonical_json(asset)?;
        let hash = sha256_hex(payload.as_bytes());
        combined.push_str(&hash);
        entries.push(ArchiveEntry {
            file_name: format!("{}.v{}.json", asset.name, asset.version_number),
            data_base64: BASE64.encode(payload.as_bytes()),
            hash,
        });
    }

    Ok(MetadataArchive {
        checksum: sha256_hex(combined.as_bytes()),
        entries,
    })
}

pub fn text_report(assets: &[&Asset]) -> String {
    let mut report = String::from("name\ttype\tformat\tversion\tdownloads\tcompliant\n");
    for asset in assets {
        report.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            asset.name,
            asset.asset_type.as_str(),
            asset.format,
            asset.version_number,
            asset.total_downloads,
            asset.guidelines_compliant,
        ));
    }
    report
}
