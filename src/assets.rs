//! Asset Data Model - Versioned Creative Files

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type AssetId = String;
pub type ClientId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AssetType {
    Logo,
    Icon,
    ColorPalette,
    Font,
    Template,
    Image,
    Video,
    Document,
    Guideline,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Logo => "logo",
            AssetType::Icon => "icon",
            AssetType::ColorPalette => "color-palette",
            AssetType::Font => "font",
            AssetType::Template => "template",
            AssetType::Image => "image",
            AssetType::Video => "video",
            AssetType::Document => "document",
            AssetType::Guideline => "guideline",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UsageContext {
    Web,
    Print,
    Social,
    Merchandise,
    Presentation,
    Internal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// One entry in an asset's usage history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub used_at: DateTime<Utc>,
    pub context: UsageContext,
    pub used_by: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: AssetId,
    pub client_id: ClientId,
    /// Absent means this asset is a lineage root.
    #[serde(default)]
    pub parent_asset_id: Option<AssetId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub asset_type: AssetType,
    #[serde(default)]
    pub variant: String,
    pub format: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default = "default_version_number")]
    pub version_number: u32,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub guidelines_compliant: bool,
    #[serde(default)]
    pub compliance_notes: Vec<String>,
    #[serde(default)]
    pub usage_history: Vec<UsageRecord>,
    #[serde(default)]
    pub total_downloads: u64,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub allowed_users: Vec<String>,
    #[serde(default)]
    pub allowed_contexts: Vec<UsageContext>,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_version_number() -> u32 { 1 }

/// Caller-supplied payload for asset creation.
///
/// Identity, timestamps, versioning and governance fields are engine-assigned
/// and deliberately absent here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub client_id: ClientId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub asset_type: AssetType,
    #[serde(default)]
    pub variant: String,
    pub format: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub allowed_users: Vec<String>,
    #[serde(default)]
    pub allowed_contexts: Vec<UsageContext>,
    pub uploaded_by: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Asset {
    /// Materialize a not-yet-governed asset from a creation payload.
    ///
    /// Compliance fields start pessimistically empty; the evaluator fills
    /// them before the asset is inserted.
    pub fn from_new(new: NewAsset, id: AssetId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            client_id: new.client_id,
            parent_asset_id: None,
            name: new.name,
            description: new.description,
            asset_type: new.asset_type,
            variant: new.variant,
            format: new.format,
            tags: new.tags,
            file_size: new.file_size,
            dimensions: new.dimensions,
            url: new.url,
            thumbnail_url: new.thumbnail_url,
            version_number: 1,
            is_primary: false,
            is_approved: false,
            guidelines_compliant: false,
            compliance_notes: vec![],
            usage_history: vec![],
            total_downloads: 0,
            last_used: None,
            is_public: new.is_public,
            allowed_users: new.allowed_users,
            allowed_contexts: new.allowed_contexts,
            uploaded_by: new.uploaded_by,
            uploaded_at: now,
            updated_at: now,
            expires_at: new.expires_at,
        }
    }
}

/// Explicit partial update, one named field per updatable column.
///
/// `expected_updated_at` is an optional optimistic-concurrency token: when
/// present, the update is refused if the stored asset has moved on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub allowed_users: Option<Vec<String>>,
    #[serde(default)]
    pub allowed_contexts: Option<Vec<UsageContext>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expected_updated_at: Option<DateTime<Utc>>,
}

impl AssetUpdate {
    /// Apply the populated fields, leaving the rest untouched.
    pub fn apply(&self, asset: &mut Asset) {
        if let Some(name) = &self.name { asset.name = name.clone(); }
        if let Some(description) = &self.description { asset.description = description.clone(); }
        if let Some(variant) = &self.variant { asset.variant = variant.clone(); }
        if let Some(format) = &self.format { asset.format = format.clone(); }
        if let Some(tags) = &self.tags { asset.tags = tags.clone(); }
        if let Some(file_size) = self.file_size { asset.file_size = file_size; }
        if let Some(dimensions) = self.dimensions { asset.dimensions = Some(dimensions); }
        if let Some(url) = &self.url { asset.url = url.clone(); }
        if let Some(thumbnail_url) = &self.thumbnail_url {
            asset.thumbnail_url = Some(thumbnail_url.clone());
        }
        if let Some(is_public) = self.is_public { asset.is_public = is_public; }
        if let Some(allowed_users) = &self.allowed_users {
            asset.allowed_users = allowed_users.clone();
        }
        if let Some(allowed_contexts) = &self.allowed_contexts {
            asset.allowed_contexts = allowed_contexts.clone();
        }
        if let Some(expires_at) = self.expires_at { asset.expires_at = Some(expires_at); }
    }
}

// --- Guidelines ---

/// Per-client rulebook. Display-only: the compliance evaluator runs its own
/// fixed rule set and never consults these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guidelines {
    pub id: String,
    pub client_id: ClientId,
    #[serde(default)]
    pub logo_spacing: LogoSpacing,
    #[serde(default)]
    pub color_palettes: Vec<ColorPalette>,
    #[serde(default)]
    pub fonts: Vec<FontDefinition>,
    #[serde(default)]
    pub prohibited_uses: Vec<String>,
    #[serde(default)]
    pub allowed_contexts: Vec<UsageContext>,
    #[serde(default)]
    pub restrictions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied payload for guideline creation and edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGuidelines {
    pub client_id: ClientId,
    #[serde(default)]
    pub logo_spacing: LogoSpacing,
    #[serde(default)]
    pub color_palettes: Vec<ColorPalette>,
    #[serde(default)]
    pub fonts: Vec<FontDefinition>,
    #[serde(default)]
    pub prohibited_uses: Vec<String>,
    #[serde(default)]
    pub allowed_contexts: Vec<UsageContext>,
    #[serde(default)]
    pub restrictions: Vec<String>,
}

impl Guidelines {
    pub fn from_new(new: NewGuidelines, id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            client_id: new.client_id,
            logo_spacing: new.logo_spacing,
            color_palettes: new.color_palettes,
            fonts: new.fonts,
            prohibited_uses: new.prohibited_uses,
            allowed_contexts: new.allowed_contexts,
            restrictions: new.restrictions,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoSpacing {
    /// Clear space around the mark, as a multiple of the mark height.
    #[serde(default = "default_clear_space_ratio")]
    pub clear_space_ratio: f64,
    #[serde(default = "default_min_size_px")]
    pub min_size_px: u32,
}

fn default_clear_space_ratio() -> f64 { 0.5 }
fn default_min_size_px() -> u32 { 24 }

impl Default for LogoSpacing {
    fn default() -> Self {
        Self {
            clear_space_ratio: default_clear_space_ratio(),
            min_size_px: default_min_size_px(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorPalette {
    pub name: String,
    pub kind: PaletteKind,
    #[serde(default)]
    pub swatches: Vec<Swatch>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaletteKind {
    Primary,
    Secondary,
    Accent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swatch {
    pub name: String,
    pub hex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontDefinition {
    pub family: String,
    #[serde(default)]
    pub weights: Vec<u16>,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub for_headings: bool,
    #[serde(default)]
    pub for_body: bool,
}

// --- Collections ---

/// Named grouping of asset ids. Purely organizational; asset deletion prunes
/// membership to keep references consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub client_id: ClientId,
    pub name: String,
    #[serde(default)]
    pub asset_ids: Vec<AssetId>,
    pub created_at: DateTime<Utc>,
}

// --- Settings ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub compliance_policy: CompliancePolicy,
    #[serde(default)]
    pub default_client: Option<ClientId>,
    #[serde(default = "default_analytics_top_n")]
    pub analytics_top_n: usize,
    /// Session-only remote backend wiring. Never persisted.
    #[serde(skip)]
    pub remote: Option<RemoteSession>,
}

fn default_analytics_top_n() -> usize { 5 }

impl Default for Settings {
    fn default() -> Self {
        Self {
            compliance_policy: CompliancePolicy::default(),
            default_client: None,
            analytics_top_n: default_analytics_top_n(),
            remote: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompliancePolicy {
    /// Error-severity issues mark the asset non-compliant but never refuse it.
    #[default]
    Advisory,
    /// Error-severity issues refuse creation/update outright.
    Block,
}

#[derive(Debug, Clone)]
pub struct RemoteSession {
    pub endpoint: String,
    pub api_key: String,
}
