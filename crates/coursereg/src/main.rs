use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use coursereg::config::AppConfig;
use coursereg::db::RegistrarDb;
use coursereg::seed::CatalogSeed;
use coursereg::server::create_router;
use coursereg::types::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!(db_path = %config.db_path, addr = %config.addr, "Starting course registration server");

    let db = RegistrarDb::open(&config.db_path)
        .with_context(|| format!("could not open database at {}", config.db_path))?;

    if let Some(seed_dir) = &config.seed_dir {
        if db.list_departments()?.is_empty() {
            let seed = CatalogSeed::load_from_directory(seed_dir)
                .with_context(|| format!("could not load seed from {}", seed_dir.display()))?;
            seed.apply(&db)?;
        } else {
            warn!(seed_dir = %seed_dir.display(), "Catalog already populated, skipping seed");
        }
    }

    let addr = config.addr;
    let state = Arc::new(AppState::new(db, config));
    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Could not listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
