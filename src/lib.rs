//! BrandVault Core - Brand Asset Engine
//!
//! # The Six Guarantees (Non-Negotiable)
//! 1. Lineages Are Append-Only
//! 2. One Primary Per (Type, Client)
//! 3. Compliance Is Evaluated, Never Asserted
//! 4. Share Links Expire And Count
//! 5. Snapshots Enable Recovery
//! 6. Callers Command, Engine Enforces

pub mod assets;
pub mod compliance;
pub mod lineage;
pub mod query;
pub mod analytics;
pub mod sharing;
pub mod bulk;
pub mod storage;
pub mod export;
pub mod snapshot;
pub mod hashing;
pub mod repository;

pub use assets::{Asset, AssetType, AssetUpdate, NewAsset, UsageContext};
pub use compliance::{ComplianceEvaluator, ComplianceReport, RuleSeverity};
pub use query::{FilterCriteria, SortKey, SortOrder};
pub use analytics::Analytics;
pub use sharing::{ShareError, ShareLink, ShareLinkRegistry, ShareOptions};
pub use bulk::{BulkCommand, BulkOutcome};
pub use snapshot::Snapshot;
pub use repository::{AssetRepository, EngineError};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_SNAPSHOT_ENGINE: &str = "1.0.0";
