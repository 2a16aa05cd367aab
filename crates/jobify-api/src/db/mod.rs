//! # Database Persistence Layer
//!
//! Postgres persistence for job records via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, every
//! create, update and delete is written to PostgreSQL before the in-memory
//! store changes, and the store is hydrated from the `jobs` table on
//! startup. When absent, the API operates in in-memory-only mode (suitable
//! for development and testing).

pub mod jobs;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::state::AppConfig;

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if no database URL is configured (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool(config: &AppConfig) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!(
            "DATABASE_URL not set, running in-memory only mode. \
             Jobs will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!(
        max_connections = config.database_max_connections,
        "Connected to PostgreSQL"
    );

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Cheap round trip used by the readiness probe.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
