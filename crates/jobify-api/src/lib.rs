//! # jobify-api: Axum API Service for Jobify
//!
//! HTTP surface of the job application tracker. Handlers are thin: record
//! rules, query building and aggregation live in `jobify-core`; this crate
//! owns transport, authentication, storage and the error normalizer.
//!
//! ## API Surface
//!
//! | Prefix                 | Module                 | Auth |
//! |------------------------|------------------------|------|
//! | `/api/v1/jobs*`        | [`routes::jobs`]       | yes  |
//! | `/openapi.json`        | [`openapi`]            | no   |
//! | `/health/*`            | probes                 | no   |
//! | anything else          | static front end or 404 | no  |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → security headers → body limit → AuthMiddleware (API routes) → Handler
//! ```
//!
//! Every error leaves the service as `{"msg": "..."}`.

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::AppState;

use crate::auth::AuthConfig;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes, the OpenAPI document and static files are mounted outside
/// the auth middleware so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let static_dir = state.config.static_dir.clone();

    // Authenticated API routes. Unknown paths under the prefix get the API 404.
    let api = routes::jobs::router()
        .route_layer(from_fn(auth::auth_middleware))
        .fallback(route_not_found);

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    let router = Router::new()
        .merge(health)
        .merge(openapi::router())
        .nest("/api/v1", api);

    let router = match static_dir {
        Some(dir) => {
            let index = ServeFile::new(dir.join("index.html"));
            router.fallback_service(ServeDir::new(dir).fallback(index))
        }
        None => router.fallback(route_not_found),
    };

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_DNS_PREFETCH_CONTROL,
            HeaderValue::from_static("off"),
        ))
        .layer(axum::Extension(auth_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route does not exist".to_string())
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 when the database (if any) answers, 503 otherwise.
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::ping(pool).await {
            tracing::warn!(error = %e, "readiness check failed: database unreachable");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable");
        }
    }
    (StatusCode::OK, "ready")
}
