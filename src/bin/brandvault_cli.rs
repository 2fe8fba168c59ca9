//! BrandVault CLI - Bridge interface for the presentation layer
//!
//! Commands: analytics, evaluate, search, versions, report
//! Outputs JSON to stdout
//! Returns non-zero on validation/compliance failure

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use brandvault_core::{
    assets::NewAsset,
    compliance::ComplianceEvaluator,
    export,
    repository::AssetRepository,
    snapshot,
};

#[derive(Parser)]
#[command(name = "brandvault-cli")]
#[command(about = "BrandVault CLI - Brand Asset Engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the snapshot document
    #[arg(short, long, default_value = "snapshot.json")]
    snapshot: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the analytics summary
    Analytics,

    /// Evaluate an asset payload against the compliance rules
    Evaluate {
        /// JSON payload (NewAsset)
        #[arg(short, long)]
        payload: String,
    },

    /// Free-text search over the collection
    Search {
        /// Whitespace-delimited terms; every term must match
        #[arg(short, long)]
        query: String,
    },

    /// List the versions attached to an asset
    Versions {
        /// Asset id
        #[arg(short, long)]
        asset: String,
    },

    /// Flat textual report of the full collection
    Report,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Evaluation is pure; it needs no snapshot.
    if let Commands::Evaluate { payload } = &cli.command {
        let new: NewAsset = match serde_json::from_str(payload) {
            Ok(n) => n,
            Err(e) => {
                println!(r#"{{"isCompliant": false, "error": "Invalid payload: {}"}}"#, e);
                return ExitCode::FAILURE;
            }
        };

        let draft = brandvault_core::Asset::from_new(new, "draft".to_string(), chrono::Utc::now());
        let report = ComplianceEvaluator::new().evaluate(&draft);
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
        return if report.is_compliant {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(2)  // Compliance failure
        };
    }

    let repository = match snapshot::load_from_file(&cli.snapshot) {
        Ok(s) => AssetRepository::from_snapshot(s),
        Err(e) => {
            eprintln!(r#"{{"error": "Failed to load snapshot: {}"}}"#, e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Analytics => {
            println!("{}", serde_json::to_string_pretty(repository.analytics()).unwrap());
            ExitCode::SUCCESS
        }

        // Handled above, before the snapshot load.
        Commands::Evaluate { .. } => ExitCode::SUCCESS,

        Commands::Search { query } => {
            let hits: Vec<_> = repository
                .search(&query)
                .iter()
                .map(|a| serde_json::json!({
                    "id": a.id,
                    "name": a.name,
                    "type": a.asset_type,
                    "client": a.client_id,
                    "version": a.version_number,
                }))
                .collect();

            println!("{}", serde_json::to_string_pretty(&hits).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Versions { asset } => {
            let versions: Vec<_> = repository
                .versions_of(&asset)
                .iter()
                .map(|a| serde_json::json!({
                    "id": a.id,
                    "name": a.name,
                    "version": a.version_number,
                    "parent": a.parent_asset_id,
                    "primary": a.is_primary,
                }))
                .collect();

            if versions.is_empty() {
                println!(r#"{{"error": "No versions for asset: {}"}}"#, asset);
                return ExitCode::FAILURE;
            }
            println!("{}", serde_json::to_string_pretty(&versions).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Report => {
            let all: Vec<_> = repository.assets().iter().collect();
            print!("{}", export::text_report(&all));
            ExitCode::SUCCESS
        }
    }
}
