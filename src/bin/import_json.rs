//! Import binary - merges a JSON translation document into the configured grid
//!
//! Usage:
//!   cargo run --bin l10n-import -- translations.json
//!   cargo run --bin l10n-import -- translations.json --dry-run
//!
//! The document maps culture tags to key/text objects:
//!   { "en": { "greeting": "Hello" }, "sv": { "greeting": "Hej" } }
//!
//! Required environment variables:
//! - L10N_GRID_PATH

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;
use tabular_l10n::{LocalizationStore, StoreConfig, Translations};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tabular_l10n=info".parse()?)
                .add_directive("l10n_import=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let dry_run = args.iter().any(|arg| arg == "--dry-run");
    let Some(input) = args.iter().find(|arg| !arg.starts_with("--")) else {
        bail!("Usage: l10n-import <translations.json> [--dry-run]");
    };
    let input = PathBuf::from(input);

    let contents = fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let incoming: Translations = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    info!(
        "Read {} translations over {} cultures from {}",
        incoming.len(),
        incoming.culture_count(),
        input.display()
    );

    let config = StoreConfig::from_env()?;
    let store = LocalizationStore::open(config).context("Failed to open localization store")?;
    store.initialize().context("Failed to start loading the grid")?;
    store
        .wait_for_load()
        .await
        .context("Failed to load the grid")?;

    for (key, entries) in incoming.by_key() {
        store
            .update(
                key,
                entries
                    .into_iter()
                    .map(|(culture, text)| (culture.clone(), text)),
            )
            .with_context(|| format!("Failed to update key '{}'", key))?;
    }

    if dry_run {
        info!("Dry run, grid left unchanged");
        return Ok(());
    }

    let report = store.save().context("Failed to save the grid")?;
    info!("Import finished: {}", serde_json::to_string(&report)?);
    store.close()?;
    Ok(())
}
