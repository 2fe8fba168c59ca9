//! Asset Repository - Single Entry Point For All Mutation
//!
//! CRITICAL: every create/update path MUST run the compliance evaluator
//! internally. No bypass.
//!
//! One explicit state container instance owns the canonical collection;
//! callers hold a handle and issue commands. Commands run to completion
//! before the next is accepted, and every mutation ends with a full
//! analytics recompute.

use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::analytics::{self, Analytics};
use crate::assets::{
    Asset, AssetId, AssetUpdate, ClientId, Collection, Guidelines, NewAsset, NewGuidelines,
    CompliancePolicy, Settings, UsageRecord,
};
use crate::bulk::{BulkCommand, BulkOutcome};
use crate::compliance::{ComplianceEvaluator, ComplianceReport};
use crate::lineage::{self, Lineage};
use crate::query::{self, FilterCriteria, SortKey, SortOrder};
use crate::sharing::{ShareError, ShareLink, ShareLinkRegistry, ShareOptions};
use crate::snapshot::Snapshot;
use crate::storage::{ObjectStorage, StorageError, UploadMetadata};

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static EVALUATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_evaluation_call_count() -> u32 {
    EVALUATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_evaluation_call_count() {
    EVALUATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Compliance blocked: {0}")]
    ComplianceBlocked(String),

    #[error(transparent)]
    Share(#[from] ShareError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The canonical mutable state of one brand-asset workspace.
pub struct AssetRepository {
    assets: Vec<Asset>,
    guidelines: Vec<Guidelines>,
    collections: Vec<Collection>,
    settings: Settings,
    filters: FilterCriteria,
    sort_by: SortKey,
    sort_order: SortOrder,
    shares: ShareLinkRegistry,
    evaluator: ComplianceEvaluator,
    analytics: Analytics,
}

impl AssetRepository {
    pub fn new() -> Self {
        Self {
            assets: vec![],
            guidelines: vec![],
            collections: vec![],
            settings: Settings::default(),
            filters: FilterCriteria::default(),
            sort_by: SortKey::default(),
            sort_order: SortOrder::default(),
            shares: ShareLinkRegistry::new(),
            evaluator: ComplianceEvaluator::new(),
            analytics: Analytics::default(),
        }
    }

    /// Restore from a persisted document. Share links are session-only and
    /// start empty; analytics are recomputed rather than trusted.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut repo = Self {
            assets: snapshot.assets,
            guidelines: snapshot.guidelines,
            collections: snapshot.collections,
            settings: snapshot.settings,
            filters: snapshot.filters,
            sort_by: snapshot.sort_by,
            sort_order: snapshot.sort_order,
            shares: ShareLinkRegistry::new(),
            evaluator: ComplianceEvaluator::new(),
            analytics: Analytics::default(),
        };
        repo.refresh_analytics();
        repo
    }

    /// The document handed to the external persistence layer after each
    /// mutating command. Transient state (selection, share links, analytics)
    /// is excluded.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            engine_min_version: crate::MIN_SNAPSHOT_ENGINE.to_string(),
            assets: self.assets.clone(),
            guidelines: self.guidelines.clone(),
            collections: self.collections.clone(),
            settings: self.settings.clone(),
            filters: self.filters.clone(),
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }

    // --- Read paths ---

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn guidelines(&self) -> &[Guidelines] {
        &self.guidelines
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    pub fn search(&self, query: &str) -> Vec<&Asset> {
        query::search(&self.assets, query)
    }

    pub fn filtered(&self, criteria: &FilterCriteria) -> Vec<&Asset> {
        query::filter(&self.assets, criteria)
    }

    /// The collection as the stored view state sees it: current filters
    /// applied, then the current sort.
    pub fn current_view(&self) -> Vec<&Asset> {
        let mut view = query::filter(&self.assets, &self.filters);
        query::sort(&mut view, self.sort_by, self.sort_order);
        view
    }

    pub fn set_filters(&mut self, criteria: FilterCriteria) {
        self.filters = criteria;
    }

    pub fn set_sort(&mut self, key: SortKey, order: SortOrder) {
        self.sort_by = key;
        self.sort_order = order;
    }

    // --- Asset commands ---

    pub fn add_asset(&mut self, new: NewAsset) -> Result<Asset, EngineError> {
        validate_new(&new)?;

        let now = Utc::now();
        let mut asset = Asset::from_new(new, Uuid::new_v4().to_string(), now);
        let report = self.evaluate_compliance(&mut asset);
        self.enforce_policy(&asset, &report)?;

        debug!(asset_id = %asset.id, client = %asset.client_id, "asset added");
        let created = asset.clone();
        // New assets go to the head of the collection.
        self.assets.insert(0, asset);
        self.refresh_analytics();
        Ok(created)
    }

    pub fn update_asset(&mut self, id: &str, update: AssetUpdate) -> Result<Asset, EngineError> {
        let idx = self
            .assets
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;

        if let Some(expected) = update.expected_updated_at {
            if self.assets[idx].updated_at != expected {
                warn!(asset_id = %id, "stale update refused");
                return Err(EngineError::Conflict(format!(
                    "asset {} changed since {}",
                    id, expected
                )));
            }
        }

        // Stage on a copy so a policy refusal leaves the stored asset alone.
        let mut staged = self.assets[idx].clone();
        update.apply(&mut staged);
        staged.updated_at = Utc::now();
        let report = self.evaluate_compliance(&mut staged);
        self.enforce_policy(&staged, &report)?;

        self.assets[idx] = staged.clone();
        self.refresh_analytics();
        Ok(staged)
    }

    pub fn delete_asset(&mut self, id: &str) -> Result<Asset, EngineError> {
        let idx = self
            .assets
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;

        let removed = self.assets.remove(idx);
        self.prune_collection_refs(id);
        debug!(asset_id = %id, "asset deleted");
        self.refresh_analytics();
        Ok(removed)
    }

    /// Bulk form: deleting an absent id is reported, never raised.
    pub fn delete_assets(&mut self, ids: &[AssetId]) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for id in ids {
            match self.assets.iter().position(|a| &a.id == id) {
                Some(idx) => {
                    self.assets.remove(idx);
                    self.prune_collection_refs(id);
                    outcome.record_success();
                }
                None => outcome.record_failure(id.clone(), "not found"),
            }
        }
        self.refresh_analytics();
        outcome
    }

    pub fn approve_asset(&mut self, id: &str) -> Result<Asset, EngineError> {
        let asset = self.asset_mut(id)?;
        asset.is_approved = true;
        asset.updated_at = Utc::now();
        let approved = asset.clone();
        self.refresh_analytics();
        Ok(approved)
    }

    pub fn reject_asset(&mut self, id: &str, reason: &str) -> Result<Asset, EngineError> {
        let asset = self.asset_mut(id)?;
        asset.is_approved = false;
        asset.compliance_notes.push(reason.to_string());
        asset.updated_at = Utc::now();
        let rejected = asset.clone();
        self.refresh_analytics();
        Ok(rejected)
    }

    /// Atomic primary swap: the target becomes the one primary of its
    /// (type, client) group, all siblings drop the flag in the same command.
    pub fn set_as_primary(&mut self, id: &str) -> Result<Asset, EngineError> {
        let (asset_type, client_id) = {
            let target = self
                .asset(id)
                .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
            (target.asset_type, target.client_id.clone())
        };

        let now = Utc::now();
        let mut promoted = None;
        for asset in &mut self.assets {
            if asset.asset_type != asset_type || asset.client_id != client_id {
                continue;
            }
            let make_primary = asset.id == id;
            if asset.is_primary != make_primary {
                asset.is_primary = make_primary;
                asset.updated_at = now;
            }
            if make_primary {
                promoted = Some(asset.clone());
            }
        }

        debug!(asset_id = %id, "primary swapped");
        self.refresh_analytics();
        // The target was found above, so it was visited in the loop.
        promoted.ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    pub fn record_download(&mut self, id: &str) -> Result<u64, EngineError> {
        let now = Utc::now();
        let asset = self.asset_mut(id)?;
        asset.total_downloads += 1;
        asset.last_used = Some(now);
        let count = asset.total_downloads;
        self.refresh_analytics();
        Ok(count)
    }

    pub fn record_usage(&mut self, id: &str, record: UsageRecord) -> Result<(), EngineError> {
        let asset = self.asset_mut(id)?;
        asset.last_used = Some(record.used_at);
        asset.usage_history.push(record);
        self.refresh_analytics();
        Ok(())
    }

    pub fn tag_asset(&mut self, id: &str, tags: &[String]) -> Result<Asset, EngineError> {
        let asset = self.asset_mut(id)?;
        for tag in tags {
            if !asset.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                asset.tags.push(tag.clone());
            }
        }
        asset.updated_at = Utc::now();
        let tagged = asset.clone();
        self.refresh_analytics();
        Ok(tagged)
    }

    // --- Versioning commands ---

    /// New version in the lineage of `original_id`: numbered past the
    /// lineage maximum, parented at the lineage root (flat tree), client
    /// inherited from the root.
    pub fn create_version(&mut self, original_id: &str, new: NewAsset) -> Result<Asset, EngineError> {
        validate_new(&new)?;

        let (root_id, client_id, version_number) = {
            let lineage = Lineage::build(&self.assets);
            let root = lineage
                .root_of(original_id)
                .ok_or_else(|| EngineError::NotFound(original_id.to_string()))?;
            (root.id.clone(), root.client_id.clone(), lineage.next_version_number(&root.id))
        };

        let now = Utc::now();
        let mut asset = Asset::from_new(new, Uuid::new_v4().to_string(), now);
        asset.client_id = client_id;
        asset.parent_asset_id = Some(root_id);
        asset.version_number = version_number;
        let report = self.evaluate_compliance(&mut asset);
        self.enforce_policy(&asset, &report)?;

        debug!(asset_id = %asset.id, version = version_number, "version created");
        let created = asset.clone();
        self.assets.insert(0, asset);
        self.refresh_analytics();
        Ok(created)
    }

    /// All versions attached to `parent_id`, newest first.
    pub fn versions_of(&self, parent_id: &str) -> Vec<&Asset> {
        lineage::versions_of(&self.assets, parent_id)
    }

    /// Append a new version mirroring `version_id`'s content under the
    /// lineage root's name and client. Reverting never deletes history.
    pub fn revert_to_version(&mut self, version_id: &str) -> Result<Asset, EngineError> {
        let (target, root) = {
            let lineage = Lineage::build(&self.assets);
            let target = lineage
                .get(version_id)
                .ok_or_else(|| EngineError::NotFound(version_id.to_string()))?;
            let root = lineage
                .root_of(version_id)
                .ok_or_else(|| EngineError::NotFound(version_id.to_string()))?;
            (target.clone(), root.clone())
        };

        let new = NewAsset {
            client_id: root.client_id.clone(),
            name: root.name.clone(),
            description: target.description.clone(),
            asset_type: target.asset_type,
            variant: target.variant.clone(),
            format: target.format.clone(),
            tags: target.tags.clone(),
            file_size: target.file_size,
            dimensions: target.dimensions,
            url: target.url.clone(),
            thumbnail_url: target.thumbnail_url.clone(),
            is_public: target.is_public,
            allowed_users: target.allowed_users.clone(),
            allowed_contexts: target.allowed_contexts.clone(),
            uploaded_by: target.uploaded_by.clone(),
            expires_at: target.expires_at,
        };
        self.create_version(&root.id, new)
    }

    // --- Guideline commands ---

    pub fn add_guidelines(&mut self, new: NewGuidelines) -> Guidelines {
        let guidelines = Guidelines::from_new(new, Uuid::new_v4().to_string(), Utc::now());
        let created = guidelines.clone();
        self.guidelines.insert(0, guidelines);
        created
    }

    pub fn update_guidelines(&mut self, id: &str, new: NewGuidelines) -> Result<Guidelines, EngineError> {
        let existing = self
            .guidelines
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;

        let created_at = existing.created_at;
        let mut replacement = Guidelines::from_new(new, id.to_string(), Utc::now());
        replacement.created_at = created_at;
        *existing = replacement.clone();
        Ok(replacement)
    }

    pub fn delete_guidelines(&mut self, id: &str) -> Result<Guidelines, EngineError> {
        let idx = self
            .guidelines
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        Ok(self.guidelines.remove(idx))
    }

    // --- Collection commands ---

    pub fn create_collection(&mut self, client_id: ClientId, name: String) -> Collection {
        let collection = Collection {
            id: Uuid::new_v4().to_string(),
            client_id,
            name,
            asset_ids: vec![],
            created_at: Utc::now(),
        };
        let created = collection.clone();
        self.collections.push(collection);
        created
    }

    pub fn add_to_collection(&mut self, collection_id: &str, asset_id: &str) -> Result<(), EngineError> {
        if self.asset(asset_id).is_none() {
            return Err(EngineError::NotFound(asset_id.to_string()));
        }
        let collection = self
            .collections
            .iter_mut()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| EngineError::NotFound(collection_id.to_string()))?;

        if !collection.asset_ids.iter().any(|id| id == asset_id) {
            collection.asset_ids.push(asset_id.to_string());
        }
        Ok(())
    }

    pub fn remove_from_collection(&mut self, collection_id: &str, asset_id: &str) -> Result<(), EngineError> {
        let collection = self
            .collections
            .iter_mut()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| EngineError::NotFound(collection_id.to_string()))?;
        collection.asset_ids.retain(|id| id != asset_id);
        Ok(())
    }

    pub fn delete_collection(&mut self, id: &str) -> Result<Collection, EngineError> {
        let idx = self
            .collections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        Ok(self.collections.remove(idx))
    }

    // --- Bulk commands ---

    /// Sequential, non-transactional fan-out; one failing id never aborts
    /// the remainder.
    pub fn bulk_apply(&mut self, ids: &[AssetId], command: &BulkCommand) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for id in ids {
            let result = match command {
                BulkCommand::Approve => self.approve_asset(id).map(|_| ()),
                BulkCommand::Reject { reason } => self.reject_asset(id, reason).map(|_| ()),
                BulkCommand::MoveToCollection { collection_id } => {
                    self.add_to_collection(collection_id, id)
                }
                BulkCommand::Tag { tags } => self.tag_asset(id, tags).map(|_| ()),
                BulkCommand::EditFields { update } => {
                    self.update_asset(id, update.clone()).map(|_| ())
                }
                BulkCommand::Delete => self.delete_asset(id).map(|_| ()),
            };
            match result {
                Ok(()) => outcome.record_success(),
                Err(e) => outcome.record_failure(id.clone(), e.to_string()),
            }
        }
        outcome
    }

    // --- Share commands ---

    pub fn issue_share_link(
        &mut self,
        asset_ids: Vec<AssetId>,
        ttl: Duration,
        options: ShareOptions,
    ) -> Result<String, EngineError> {
        for id in &asset_ids {
            if self.asset(id).is_none() {
                return Err(EngineError::NotFound(id.clone()));
            }
        }
        let link_id = self.shares.issue(asset_ids, ttl, options);
        debug!(link_id = %link_id, "share link issued");
        Ok(link_id)
    }

    pub fn resolve_share_link(
        &mut self,
        link_id: &str,
        password: Option<&str>,
    ) -> Result<Vec<AssetId>, EngineError> {
        Ok(self.shares.resolve(link_id, password)?)
    }

    pub fn share_link(&self, link_id: &str) -> Option<&ShareLink> {
        self.shares.get(link_id)
    }

    // --- Storage collaborator ---

    /// Upload through the collaborator, then register the asset with the
    /// receipt's locations. A storage failure leaves the collection untouched.
    pub fn import_upload(
        &mut self,
        storage: &dyn ObjectStorage,
        file: &[u8],
        metadata: &UploadMetadata,
        mut new: NewAsset,
    ) -> Result<Asset, EngineError> {
        let receipt = storage.upload(file, metadata)?;
        new.url = receipt.url;
        new.thumbnail_url = receipt.thumbnail_url;
        new.file_size = file.len() as u64;
        self.add_asset(new)
    }

    // --- Internals ---

    fn asset_mut(&mut self, id: &str) -> Result<&mut Asset, EngineError> {
        self.assets
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    /// The ONLY place `guidelines_compliant` is written.
    fn evaluate_compliance(&self, asset: &mut Asset) -> ComplianceReport {
        #[cfg(feature = "test-hooks")]
        EVALUATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        let report = self.evaluator.evaluate(asset);
        asset.guidelines_compliant = report.is_compliant;
        asset.compliance_notes = report.notes();
        report
    }

    fn enforce_policy(&self, asset: &Asset, report: &ComplianceReport) -> Result<(), EngineError> {
        if self.settings.compliance_policy == CompliancePolicy::Block && report.has_errors() {
            warn!(asset_id = %asset.id, "blocked by compliance policy");
            return Err(EngineError::ComplianceBlocked(report.notes().join("; ")));
        }
        Ok(())
    }

    fn prune_collection_refs(&mut self, asset_id: &str) {
        for collection in &mut self.collections {
            collection.asset_ids.retain(|id| id != asset_id);
        }
    }

    fn refresh_analytics(&mut self) {
        self.analytics = analytics::compute(&self.assets, self.settings.analytics_top_n);
    }
}

impl Default for AssetRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_new(new: &NewAsset) -> Result<(), EngineError> {
    if new.client_id.trim().is_empty() {
        return Err(EngineError::Validation("missing required field: clientId".into()));
    }
    if new.name.trim().is_empty() {
        return Err(EngineError::Validation("missing required field: name".into()));
    }
    if new.format.trim().is_empty() {
        return Err(EngineError::Validation("missing required field: format".into()));
    }
    Ok(())
}
