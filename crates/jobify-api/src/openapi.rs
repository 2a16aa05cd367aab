//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented job routes into a single OpenAPI
//! document served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI document for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Jobify API",
        version = "0.1.0",
        description = "Track job applications: create, list with filters, update, delete, and dashboard stats.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::jobs::create_job,
        crate::routes::jobs::list_jobs,
        crate::routes::jobs::show_stats,
        crate::routes::jobs::update_job,
        crate::routes::jobs::delete_job,
    ),
    components(schemas(
        // Domain types
        jobify_core::Job,
        jobify_core::JobId,
        jobify_core::UserId,
        jobify_core::JobStatus,
        jobify_core::JobType,
        jobify_core::NewJob,
        jobify_core::JobChanges,
        jobify_core::JobPage,
        jobify_core::JobStats,
        jobify_core::StatusCounts,
        jobify_core::MonthlyApplication,
        // Envelopes
        crate::routes::jobs::CreatedJobResponse,
        crate::routes::jobs::UpdatedJobResponse,
        crate::routes::jobs::MessageResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "jobs", description = "Job applications of the authenticated user"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI document.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
