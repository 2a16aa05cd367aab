//! # jobify-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the Jobify API.
//! Binds to configurable port (default 5000).

use jobify_api::state::{AppConfig, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();

    // Initialize structured tracing.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!(?config, "loaded configuration");
    if config.auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN not set, authentication disabled: every request acts as admin");
    }

    // A configured database that cannot be reached is fatal.
    let db_pool = jobify_api::db::init_pool(&config).await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let port = config.port;
    let state = AppState::with_config(config, db_pool);

    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("Database hydration failed: {e}");
        e
    })?;

    let app = jobify_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Jobify API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
