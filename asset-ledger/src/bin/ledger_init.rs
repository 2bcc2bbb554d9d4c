//! Seed the asset ledger world state

use anyhow::Context;
use asset_ledger::{contract::Genesis, Config, Ledger};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        backend = ?config.backend,
        data_dir = ?config.data_dir,
        "Starting ledger seeding"
    );

    let genesis = match &config.genesis_file {
        Some(path) => Genesis::from_json_file(path)
            .with_context(|| format!("Failed to load genesis file {}", path.display()))?,
        None => Genesis::default(),
    };

    let ledger = Ledger::open(config).context("Failed to open ledger")?;
    ledger
        .init_ledger(&genesis)
        .context("Failed to seed world state")?;

    let users = ledger.list_users()?.len();
    let assets = ledger.list_assets()?.len();
    tracing::info!(users, assets, "World state seeded");

    Ok(())
}
