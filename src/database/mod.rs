pub mod filter;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use store::{ClientDirectory, DeleteOptions, JobLedger, RequestKey};

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Opens the shared connection pool the Postgres-backed stores run on.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await
}

/// Round-trips a trivial query; run once at startup so a bad DSN fails
/// loudly instead of on the first request.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
