//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use chrono::{Duration, Utc};

use brandvault_core::{
    assets::{AssetType, AssetUpdate, CompliancePolicy, Dimensions, NewAsset},
    compliance::ComplianceEvaluator,
    repository::{AssetRepository, EngineError},
    sharing::{ShareError, ShareLinkRegistry, ShareOptions},
    snapshot,
    Asset,
};

fn new_asset(client: &str, name: &str, asset_type: AssetType, format: &str) -> NewAsset {
    NewAsset {
        client_id: client.to_string(),
        name: name.to_string(),
        description: "test asset".to_string(),
        asset_type,
        variant: String::new(),
        format: format.to_string(),
        tags: vec!["brand".to_string()],
        file_size: 2048,
        dimensions: Some(Dimensions { width: 1024, height: 1024 }),
        url: String::new(),
        thumbnail_url: None,
        is_public: false,
        allowed_users: vec![],
        allowed_contexts: vec![],
        uploaded_by: "tester".to_string(),
        expires_at: None,
    }
}

fn primary_count(repo: &AssetRepository, asset_type: AssetType, client: &str) -> usize {
    repo.assets()
        .iter()
        .filter(|a| a.asset_type == asset_type && a.client_id == client && a.is_primary)
        .count()
}

#[test]
fn invariant_single_primary_per_type_and_client() {
    let mut repo = AssetRepository::new();
    let a = repo.add_asset(new_asset("c1", "logo-a", AssetType::Logo, "svg")).unwrap();
    let b = repo.add_asset(new_asset("c1", "logo-b", AssetType::Logo, "svg")).unwrap();
    let other_client = repo.add_asset(new_asset("c2", "logo-c", AssetType::Logo, "svg")).unwrap();

    repo.set_as_primary(&a.id).unwrap();
    assert_eq!(primary_count(&repo, AssetType::Logo, "c1"), 1);

    // Promoting a sibling atomically demotes the previous primary.
    repo.set_as_primary(&b.id).unwrap();
    assert_eq!(primary_count(&repo, AssetType::Logo, "c1"), 1);
    assert!(repo.asset(&b.id).unwrap().is_primary);
    assert!(!repo.asset(&a.id).unwrap().is_primary);

    // Other (type, client) groups are untouched.
    repo.set_as_primary(&other_client.id).unwrap();
    assert!(repo.asset(&b.id).unwrap().is_primary);
    assert_eq!(primary_count(&repo, AssetType::Logo, "c2"), 1);
}

#[test]
fn invariant_version_numbers_gapless() {
    let mut repo = AssetRepository::new();
    let root = repo.add_asset(new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();
    assert_eq!(root.version_number, 1);

    let v2 = repo.create_version(&root.id, new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();
    // Creating from a non-root member still numbers lineage-wide.
    let v3 = repo.create_version(&v2.id, new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();
    let v4 = repo.create_version(&root.id, new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();

    assert_eq!(v2.version_number, 2);
    assert_eq!(v3.version_number, 3);
    assert_eq!(v4.version_number, 4);

    let mut numbers: Vec<u32> = repo
        .versions_of(&root.id)
        .iter()
        .map(|a| a.version_number)
        .collect();
    numbers.sort_unstable();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[test]
fn invariant_versions_attach_to_the_lineage_root() {
    let mut repo = AssetRepository::new();
    let root = repo.add_asset(new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();
    let v2 = repo.create_version(&root.id, new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();
    let v3 = repo.create_version(&v2.id, new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();

    assert_eq!(v2.parent_asset_id.as_deref(), Some(root.id.as_str()));
    assert_eq!(v3.parent_asset_id.as_deref(), Some(root.id.as_str()));
    // The client is inherited from the root even if the payload disagrees.
    let stray = repo.create_version(&v3.id, new_asset("other", "mark", AssetType::Logo, "svg")).unwrap();
    assert_eq!(stray.client_id, "c1");
}

#[test]
fn invariant_evaluator_deterministic() {
    let evaluator = ComplianceEvaluator::new();
    let asset = Asset::from_new(
        new_asset("c1", "Messy Name", AssetType::Logo, "jpg"),
        "fixed-id".to_string(),
        Utc::now(),
    );

    let first = evaluator.evaluate(&asset);
    // Interleave an unrelated evaluation; the report must not change.
    let other = Asset::from_new(
        new_asset("c2", "other", AssetType::Font, "woff"),
        "other-id".to_string(),
        Utc::now(),
    );
    evaluator.evaluate(&other);
    let second = evaluator.evaluate(&asset);

    assert_eq!(first.is_compliant, second.is_compliant);
    assert_eq!(
        serde_json::to_string(&first.issues).unwrap(),
        serde_json::to_string(&second.issues).unwrap()
    );
}

#[test]
fn invariant_access_budget_is_exact() {
    let mut registry = ShareLinkRegistry::new();
    let options = ShareOptions { max_access: Some(3), password: None };
    let id = registry.issue(vec!["a1".to_string()], Duration::hours(1), options);

    for _ in 0..3 {
        assert!(registry.resolve(&id, None).is_ok());
    }
    assert_eq!(registry.resolve(&id, None), Err(ShareError::AccessLimit));
    // Soft death: the record is refused, not purged.
    assert!(registry.get(&id).is_some());
}

#[test]
fn invariant_expired_link_always_refused() {
    let mut registry = ShareLinkRegistry::new();
    // Already expired at issue time, untouched budget, no password.
    let id = registry.issue(vec!["a1".to_string()], Duration::seconds(-60), ShareOptions::default());

    assert_eq!(registry.get(&id).map(|l| l.access_count), Some(0));
    assert_eq!(registry.resolve(&id, None), Err(ShareError::Expired));
}

#[test]
fn scenario_zero_ttl_expires_immediately() {
    let mut repo = AssetRepository::new();
    let a = repo.add_asset(new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();

    let link_id = repo
        .issue_share_link(vec![a.id.clone()], Duration::zero(), ShareOptions::default())
        .unwrap();
    let result = repo.resolve_share_link(&link_id, None);
    assert!(matches!(result, Err(EngineError::Share(ShareError::Expired))));
}

#[test]
fn invariant_unknown_link_is_not_found() {
    let mut registry = ShareLinkRegistry::new();
    assert!(matches!(registry.resolve("nope", None), Err(ShareError::NotFound(_))));
}

#[test]
fn invariant_empty_query_and_criteria_return_everything() {
    let mut repo = AssetRepository::new();
    repo.add_asset(new_asset("c1", "one", AssetType::Logo, "svg")).unwrap();
    repo.add_asset(new_asset("c1", "two", AssetType::Icon, "png")).unwrap();
    repo.add_asset(new_asset("c2", "three", AssetType::Font, "woff")).unwrap();

    assert_eq!(repo.search("").len(), 3);
    assert_eq!(repo.filtered(&Default::default()).len(), 3);
    assert_eq!(repo.current_view().len(), 3);
}

#[test]
fn invariant_bulk_delete_reports_misses_without_raising() {
    let mut repo = AssetRepository::new();
    let a = repo.add_asset(new_asset("c1", "one", AssetType::Logo, "svg")).unwrap();
    let b = repo.add_asset(new_asset("c1", "two", AssetType::Icon, "png")).unwrap();

    let ids = vec![
        a.id.clone(),
        "ghost-1".to_string(),
        b.id.clone(),
        "ghost-2".to_string(),
        "ghost-3".to_string(),
    ];
    let outcome = repo.delete_assets(&ids);

    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 3);
    assert_eq!(outcome.failures.len(), 3);
    assert!(outcome.failed_ids().contains(&"ghost-2"));
    assert!(repo.assets().is_empty());
}

#[test]
fn scenario_primary_flag_and_new_versions() {
    let mut repo = AssetRepository::new();
    let a = repo.add_asset(new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();
    assert!(!a.is_primary);

    let a = repo.set_as_primary(&a.id).unwrap();
    assert!(a.is_primary);

    let a2 = repo.create_version(&a.id, new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();
    assert_eq!(a2.version_number, a.version_number + 1);
    assert_eq!(a2.parent_asset_id.as_deref(), Some(a.id.as_str()));
    // The primary flag never follows a new version automatically.
    assert!(!a2.is_primary);
    assert!(repo.asset(&a.id).unwrap().is_primary);
}

#[test]
fn scenario_format_warning_annotates_without_failing() {
    let mut repo = AssetRepository::new();
    let asset = repo
        .add_asset(new_asset("c1", "acme-mark", AssetType::Logo, "jpg"))
        .unwrap();

    // Warning severity: non-preferred logo format annotates but stays compliant.
    assert!(asset.guidelines_compliant);
    assert_eq!(asset.compliance_notes.len(), 1);
    assert!(asset.compliance_notes[0].starts_with("logo-format:"));
}

#[test]
fn invariant_compliance_is_always_evaluated() {
    let mut repo = AssetRepository::new();
    // The caller cannot assert compliance; a font in a broken format comes
    // back non-compliant no matter what the payload claimed.
    let asset = repo
        .add_asset(new_asset("c1", "body-font", AssetType::Font, "jpg"))
        .unwrap();
    assert!(!asset.guidelines_compliant);
    assert!(asset.compliance_notes.iter().any(|n| n.starts_with("font-format:")));
}

#[test]
fn invariant_block_policy_refuses_error_severity() {
    let mut repo = AssetRepository::new();
    repo.settings_mut().compliance_policy = CompliancePolicy::Block;

    let result = repo.add_asset(new_asset("c1", "body-font", AssetType::Font, "jpg"));
    assert!(matches!(result, Err(EngineError::ComplianceBlocked(_))));
    assert!(repo.assets().is_empty());
}

#[test]
fn invariant_validation_and_not_found_errors() {
    let mut repo = AssetRepository::new();

    let missing_client = repo.add_asset(new_asset("", "mark", AssetType::Logo, "svg"));
    assert!(matches!(missing_client, Err(EngineError::Validation(_))));

    let unknown = repo.update_asset("ghost", AssetUpdate::default());
    assert!(matches!(unknown, Err(EngineError::NotFound(_))));

    let unknown_version = repo.create_version("ghost", new_asset("c1", "mark", AssetType::Logo, "svg"));
    assert!(matches!(unknown_version, Err(EngineError::NotFound(_))));
}

#[test]
fn invariant_stale_update_conflicts() {
    let mut repo = AssetRepository::new();
    let created = repo.add_asset(new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();
    let stale_token = created.updated_at;

    // An intervening edit moves updated_at forward.
    let mut rename = AssetUpdate::default();
    rename.name = Some("acme-mark".to_string());
    repo.update_asset(&created.id, rename).unwrap();

    let mut stale = AssetUpdate::default();
    stale.description = Some("late edit".to_string());
    stale.expected_updated_at = Some(stale_token);
    assert!(matches!(
        repo.update_asset(&created.id, stale),
        Err(EngineError::Conflict(_))
    ));

    // Without the token, last write wins.
    let mut unconditional = AssetUpdate::default();
    unconditional.description = Some("late edit".to_string());
    assert!(repo.update_asset(&created.id, unconditional).is_ok());
}

#[test]
fn invariant_downloads_only_increase() {
    let mut repo = AssetRepository::new();
    let a = repo.add_asset(new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();
    assert_eq!(a.total_downloads, 0);

    assert_eq!(repo.record_download(&a.id).unwrap(), 1);
    assert_eq!(repo.record_download(&a.id).unwrap(), 2);
    assert!(repo.asset(&a.id).unwrap().last_used.is_some());
}

#[test]
fn invariant_revert_appends_instead_of_rewriting() {
    let mut repo = AssetRepository::new();
    let root = repo.add_asset(new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();

    let mut edited = new_asset("c1", "mark-refresh", AssetType::Logo, "svg");
    edited.description = "refreshed artwork".to_string();
    repo.create_version(&root.id, edited).unwrap();

    let reverted = repo.revert_to_version(&root.id).unwrap();

    // Content mirrors the target; identity stays with the lineage root.
    assert_eq!(reverted.version_number, 3);
    assert_eq!(reverted.name, root.name);
    assert_eq!(reverted.description, root.description);
    assert_eq!(reverted.client_id, root.client_id);
    assert_eq!(repo.versions_of(&root.id).len(), 3);
}

#[test]
fn invariant_delete_prunes_collection_references() {
    let mut repo = AssetRepository::new();
    let a = repo.add_asset(new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();
    let collection = repo.create_collection("c1".to_string(), "launch kit".to_string());
    repo.add_to_collection(&collection.id, &a.id).unwrap();

    repo.delete_asset(&a.id).unwrap();
    assert!(repo.collections()[0].asset_ids.is_empty());
}

#[test]
fn invariant_analytics_follow_every_mutation() {
    let mut repo = AssetRepository::new();
    assert_eq!(repo.analytics().total_assets, 0);
    assert_eq!(repo.analytics().compliance_rate, 100.0);

    let a = repo.add_asset(new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();
    repo.add_asset(new_asset("c2", "icon", AssetType::Icon, "png")).unwrap();
    assert_eq!(repo.analytics().total_assets, 2);
    assert_eq!(repo.analytics().by_client["c1"], 1);

    repo.record_download(&a.id).unwrap();
    assert_eq!(repo.analytics().top_downloads[0].id, a.id);

    repo.delete_asset(&a.id).unwrap();
    assert_eq!(repo.analytics().total_assets, 1);
}

#[test]
fn invariant_snapshot_roundtrip_preserves_state() {
    let mut repo = AssetRepository::new();
    let a = repo.add_asset(new_asset("c1", "mark", AssetType::Logo, "svg")).unwrap();
    let collection = repo.create_collection("c1".to_string(), "kit".to_string());
    repo.add_to_collection(&collection.id, &a.id).unwrap();
    let link_id = repo
        .issue_share_link(vec![a.id.clone()], Duration::hours(1), Default::default())
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    snapshot::save_to_file(&repo.snapshot(), &path).unwrap();

    let restored = AssetRepository::from_snapshot(snapshot::load_from_file(&path).unwrap());
    assert_eq!(restored.assets().len(), 1);
    assert_eq!(restored.asset(&a.id).unwrap().name, "mark");
    assert_eq!(restored.collections().len(), 1);
    assert_eq!(restored.analytics().total_assets, 1);
    // Share links are session-only and never persisted.
    assert!(restored.share_link(&link_id).is_none());
}

#[test]
fn invariant_old_schema_snapshots_still_load() {
    let document = r#"{
        "assets": [{
            "id": "legacy-1",
            "clientId": "c1",
            "name": "legacy-mark",
            "assetType": "logo",
            "format": "svg",
            "uploadedBy": "importer",
            "uploadedAt": "2023-04-01T12:00:00Z",
            "updatedAt": "2023-04-01T12:00:00Z"
        }]
    }"#;

    let parsed: brandvault_core::Snapshot = serde_json::from_str(document).unwrap();
    let repo = AssetRepository::from_snapshot(parsed);

    let legacy = repo.asset("legacy-1").unwrap();
    assert_eq!(legacy.version_number, 1);
    assert!(!legacy.is_primary);
    assert!(legacy.tags.is_empty());
    assert_eq!(repo.analytics().total_assets, 1);
}
