//! Report binary - loads the configured grid and logs what it holds
//!
//! Usage:
//!   cargo run --bin l10n-report
//!
//! Required environment variables:
//! - L10N_GRID_PATH
//!
//! Optional:
//! - L10N_BACKUP_PATH
//! - L10N_KEY_SEPARATOR (defaults to ':')
//! - L10N_GLOSSARY_TAG (defaults to GLOSSARY)
//! - L10N_INPUT_CULTURE (defaults to en)

use anyhow::{Context, Result};
use tabular_l10n::{LocalizationStore, StoreConfig, StoreStatus};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tabular_l10n=info".parse()?),
        )
        .init();

    let config = StoreConfig::from_env()?;
    info!("Opening localization grid {}", config.grid_path.display());

    let store = LocalizationStore::open(config).context("Failed to open localization store")?;
    store.initialize().context("Failed to start loading the grid")?;
    let status = store
        .wait_for_load()
        .await
        .context("Failed to load the grid")?;

    if status != StoreStatus::Initialized {
        warn!("Grid holds no translations (status: {:?})", status);
        return Ok(());
    }

    let cultures = store.cultures()?;
    info!("Loaded {} cultures", cultures.len());
    for culture in &cultures {
        let keys = store.with_translations(|t| t.key_count(culture))?;
        let name = culture
            .info()
            .map(|info| info.native_name)
            .unwrap_or("unknown");
        info!("  {} ({}): {} keys", culture, name, keys);
    }

    store.close()?;
    Ok(())
}
