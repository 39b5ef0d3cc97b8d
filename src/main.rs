use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use gigboard::config::AppConfig;
use gigboard::database;
use gigboard::database::postgres::{PgDirectory, PgLedger};
use gigboard::handlers;
use gigboard::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up DATABASE_URL and friends.
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env()?;
    let default_filter = if config.is_development() {
        "gigboard=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    tracing::info!(
        environment = ?config.environment,
        database = %config.redacted_database_url(),
        "starting gigboard gateway"
    );

    let pool = database::connect(&config.database)
        .await
        .context("failed to open database pool")?;
    database::health_check(&pool)
        .await
        .context("database did not answer startup ping")?;

    let directory = Arc::new(PgDirectory::new(pool.clone()));
    let ledger = Arc::new(PgLedger::new(pool));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, directory, ledger);
    let app = handlers::app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with an error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received, draining connections");
}
