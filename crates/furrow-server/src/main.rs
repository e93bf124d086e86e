mod config;

use std::sync::Arc;

use tracing::{info, warn};

use furrow_api::AppStateInner;
use furrow_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "furrow=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = Arc::new(Database::open(&config.db_path)?);
    let state = Arc::new(AppStateInner::new(db.clone(), config.admin_key));
    let app = furrow_api::router(state);

    info!("furrow listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router and its state are gone once serve returns.
    match Arc::try_unwrap(db) {
        Ok(db) => db.close()?,
        Err(_) => warn!("database still shared at shutdown, leaving it to drop"),
    }

    info!("furrow stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
