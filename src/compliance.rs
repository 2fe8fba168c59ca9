//! Compliance System - Rule/Policy Separation
//!
//! Rules produce structured issues.
//! Policy (repository settings) maps issues to actions.

use serde::{Deserialize, Serialize};

use crate::assets::{Asset, AssetType};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceIssue {
    pub rule: String,
    pub severity: RuleSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub is_compliant: bool,
    pub issues: Vec<ComplianceIssue>,
}

impl ComplianceReport {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == RuleSeverity::Error)
    }

    /// Flatten issues into the advisory note strings stored on the asset.
    pub fn notes(&self) -> Vec<String> {
        self.issues
            .iter()
            .map(|i| format!("{}: {}", i.rule, i.message))
            .collect()
    }
}

/// One strongly-typed check per rule kind, matched exhaustively below.
#[derive(Debug, Clone)]
pub enum RuleCheck {
    FileFormat { allowed: Vec<&'static str> },
    Dimensions { min_width: u32, min_height: u32 },
    FileSize { max_bytes: u64 },
    Naming { convention: NamingConvention },
    Metadata { require_description: bool, require_tags: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingConvention {
    KebabCase,
    SnakeCase,
}

/// A static, engine-owned check. `applies_to` empty means every asset type.
#[derive(Debug, Clone)]
pub struct ComplianceRule {
    pub name: &'static str,
    pub severity: RuleSeverity,
    pub applies_to: Vec<AssetType>,
    pub check: RuleCheck,
}

/// Evaluator over the fixed rule list. Deterministic and side-effect-free;
/// callers decide what to do with the report.
pub struct ComplianceEvaluator {
    rules: Vec<ComplianceRule>,
}

impl ComplianceEvaluator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                ComplianceRule {
                    name: "logo-format",
                    severity: RuleSeverity::Warning,
                    applies_to: vec![AssetType::Logo],
                    check: RuleCheck::FileFormat { allowed: vec!["svg", "eps", "png"] },
                },
                ComplianceRule {
                    name: "font-format",
                    severity: RuleSeverity::Error,
                    applies_to: vec![AssetType::Font],
                    check: RuleCheck::FileFormat { allowed: vec!["woff", "woff2", "otf", "ttf"] },
                },
                ComplianceRule {
                    name: "min-resolution",
                    severity: RuleSeverity::Error,
                    applies_to: vec![AssetType::Logo, AssetType::Icon, AssetType::Image],
                    check: RuleCheck::Dimensions { min_width: 512, min_height: 512 },
                },
                ComplianceRule {
                    name: "file-size-cap",
                    severity: RuleSeverity::Warning,
                    applies_to: vec![],
                    check: RuleCheck::FileSize { max_bytes: 250 * 1024 * 1024 },
                },
                ComplianceRule {
                    name: "asset-naming",
                    severity: RuleSeverity::Warning,
                    applies_to: vec![],
                    check: RuleCheck::Naming { convention: NamingConvention::KebabCase },
                },
                ComplianceRule {
                    name: "metadata-completeness",
                    severity: RuleSeverity::Info,
                    applies_to: vec![],
                    check: RuleCheck::Metadata { require_description: true, require_tags: true },
                },
            ],
        }
    }

    pub fn rules(&self) -> &[ComplianceRule] {
        &self.rules
    }

    pub fn evaluate(&self, asset: &Asset) -> ComplianceReport {
        let mut issues = vec![];

        for rule in &self.rules {
            if !rule.applies_to.is_empty() && !rule.applies_to.contains(&asset.asset_type) {
                continue;
            }
            if let Some(message) = check(&rule.check, asset) {
                issues.push(ComplianceIssue {
                    rule: rule.name.to_string(),
                    severity: rule.severity.clone(),
                    message,
                });
            }
        }

        // Warnings and info annotate; only errors fail compliance.
        let is_compliant = !issues.iter().any(|i| i.severity == RuleSeverity::Error);
        ComplianceReport { is_compliant, issues }
    }
}

impl Default for ComplianceEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn check(check: &RuleCheck, asset: &Asset) -> Option<String> {
    match check {
        RuleCheck::FileFormat { allowed } => {
            if allowed.iter().any(|f| f.eq_ignore_ascii_case(&asset.format)) {
                None
            } else {
                Some(format!(
                    "format '{}' not among required formats [{}]",
                    asset.format,
                    allowed.join(", ")
                ))
            }
        }
        RuleCheck::Dimensions { min_width, min_height } => {
            // Only enforced when dimensions are known.
            let dims = asset.dimensions?;
            if dims.width < *min_width || dims.height < *min_height {
                Some(format!(
                    "{}x{} below minimum {}x{}",
                    dims.width, dims.height, min_width, min_height
                ))
            } else {
                None
            }
        }
        RuleCheck::FileSize { max_bytes } => {
            if asset.file_size > *max_bytes {
                Some(format!(
                    "{} bytes exceeds cap of {} bytes",
                    asset.file_size, max_bytes
                ))
            } else {
                None
            }
        }
        RuleCheck::Naming { convention } => {
            if matches_convention(&asset.name, *convention) {
                None
            } else {
                Some(format!(
                    "name '{}' does not follow the {} convention",
                    asset.name,
                    convention_label(*convention)
                ))
            }
        }
        RuleCheck::Metadata { require_description, require_tags } => {
            let mut missing = vec![];
            if *require_description && asset.description.trim().is_empty() {
                missing.push("description");
            }
            if *require_tags && asset.tags.is_empty() {
                missing.push("tags");
            }
            if missing.is_empty() {
                None
            } else {
                Some(format!("missing {}", missing.join(" and ")))
            }
        }
    }
}

fn matches_convention(name: &str, convention: NamingConvention) -> bool {
    let separator = match convention {
        NamingConvention::KebabCase => '-',
        NamingConvention::SnakeCase => '_',
    };
    !name.is_empty()
        && !name.starts_with(separator)
        && !name.ends_with(separator)
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == separator || c == '.')
}

fn convention_label(convention: NamingConvention) -> &'static str {
    match convention {
        NamingConvention::KebabCase => "kebab-case",
        NamingConvention::SnakeCase => "snake_case",
    }
}
