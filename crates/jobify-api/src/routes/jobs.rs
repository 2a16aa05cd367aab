//! # Jobs Resource
//!
//! CRUD over job applications, the filtered list, and the dashboard stats.
//! Every handler is scoped to the authenticated caller; changes and deletes
//! go through the ownership check first.
//!
//! ## Endpoints
//!
//! - `POST /api/v1/jobs`: create a job
//! - `GET /api/v1/jobs`: list the caller's jobs (filter, sort, paginate)
//! - `GET /api/v1/jobs/stats`: status counts and monthly histogram
//! - `PATCH /api/v1/jobs/:id`: update a job
//! - `DELETE /api/v1/jobs/:id`: delete a job
//!
//! With a database configured, each write reaches Postgres before the
//! in-memory store. A failed write leaves the store untouched. Updates
//! re-read the record under a lock, so concurrent changes to different
//! fields all survive.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::Utc;
use jobify_core::{
    check_permissions, stats, Job, JobChanges, JobPage, JobQuery, JobStats, ListParams, NewJob,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{
    extract_query, extract_validated_json, job_not_found, parse_job_id, Validate,
};
use crate::state::AppState;

const MISSING_VALUES: &str = "Please provide all values";

// ── Request/Response DTOs ───────────────────────────────────────────

impl Validate for NewJob {
    fn validate(&self) -> Result<(), String> {
        if self.has_required_fields() {
            Ok(())
        } else {
            Err(MISSING_VALUES.to_string())
        }
    }
}

impl Validate for JobChanges {
    fn validate(&self) -> Result<(), String> {
        if self.has_required_fields() {
            Ok(())
        } else {
            Err(MISSING_VALUES.to_string())
        }
    }
}

/// Response to a create.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedJobResponse {
    pub job: Job,
}

/// Response to an update.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedJobResponse {
    pub updated_job: Job,
}

/// Plain confirmation message.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub msg: String,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the jobs router. Paths are relative to the `/api/v1` mount point.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobs/stats", get(show_stats))
        .route("/jobs/:id", patch(update_job).delete(delete_job))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /api/v1/jobs: Create a job owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    request_body = NewJob,
    responses(
        (status = 201, description = "Job created", body = CreatedJobResponse),
        (status = 400, description = "Missing values or validation failure", body = crate::error::ErrorBody),
        (status = 401, description = "Authentication invalid", body = crate::error::ErrorBody),
    ),
    tag = "jobs"
)]
async fn create_job(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<NewJob>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedJobResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let job = req.into_job(caller.user_id, Utc::now())?;

    if let Some(pool) = &state.db_pool {
        crate::db::jobs::insert(pool, &job).await?;
    }
    state.jobs.insert(*job.id.as_uuid(), job.clone());

    tracing::info!(job_id = %job.id, owner = %job.created_by, "job created");
    Ok((StatusCode::CREATED, Json(CreatedJobResponse { job })))
}

/// GET /api/v1/jobs: List the caller's jobs.
#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    params(ListParams),
    responses(
        (status = 200, description = "One page of jobs", body = JobPage),
        (status = 401, description = "Authentication invalid", body = crate::error::ErrorBody),
    ),
    tag = "jobs"
)]
async fn list_jobs(
    State(state): State<AppState>,
    caller: CallerIdentity,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<JobPage>, AppError> {
    let params = extract_query(params)?;
    let query = JobQuery::new(caller.user_id, &params);
    let matching = state.jobs.list_where(|job| query.matches(job));
    Ok(Json(query.run(matching)))
}

/// GET /api/v1/jobs/stats: Status counts and recent monthly applications.
#[utoipa::path(
    get,
    path = "/api/v1/jobs/stats",
    responses(
        (status = 200, description = "Dashboard stats", body = JobStats),
        (status = 401, description = "Authentication invalid", body = crate::error::ErrorBody),
    ),
    tag = "jobs"
)]
async fn show_stats(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Json<JobStats> {
    let owned = state.jobs.list_where(|job| job.created_by == caller.user_id);
    Json(stats::compute(&caller.user_id, &owned))
}

/// PATCH /api/v1/jobs/:id: Update a job.
#[utoipa::path(
    patch,
    path = "/api/v1/jobs/{id}",
    params(("id" = String, Path, description = "Job ID")),
    request_body = JobChanges,
    responses(
        (status = 200, description = "Job updated", body = UpdatedJobResponse),
        (status = 400, description = "Missing values or validation failure", body = crate::error::ErrorBody),
        (status = 403, description = "Not the owner", body = crate::error::ErrorBody),
        (status = 404, description = "Job not found", body = crate::error::ErrorBody),
    ),
    tag = "jobs"
)]
async fn update_job(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(raw_id): Path<String>,
    body: Result<Json<JobChanges>, JsonRejection>,
) -> Result<Json<UpdatedJobResponse>, AppError> {
    let changes = extract_validated_json(body)?;
    let id = parse_job_id(&raw_id)?;
    let requester = caller.requester();

    // Runs against the latest committed record while it is locked.
    let change = |current: &Job| -> Result<Job, AppError> {
        check_permissions(&requester, &current.created_by)?;
        Ok(current.apply(changes, Utc::now())?)
    };

    let updated = match &state.db_pool {
        Some(pool) => {
            let updated = crate::db::jobs::update_locked(pool, &id, change)
                .await?
                .ok_or_else(|| job_not_found(&raw_id))?;
            // Commits are serialized per row; never overwrite a later one.
            state
                .jobs
                .update(id.as_uuid(), |job| {
                    if updated.updated_at >= job.updated_at {
                        *job = updated.clone();
                    }
                })
                .ok_or_else(|| job_not_found(&raw_id))?;
            updated
        }
        None => state
            .jobs
            .try_update(id.as_uuid(), change)
            .ok_or_else(|| job_not_found(&raw_id))??,
    };

    tracing::info!(job_id = %id, caller = %caller.user_id, "job updated");
    Ok(Json(UpdatedJobResponse {
        updated_job: updated,
    }))
}

/// DELETE /api/v1/jobs/:id: Delete a job.
#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job removed", body = MessageResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorBody),
        (status = 404, description = "Job not found", body = crate::error::ErrorBody),
    ),
    tag = "jobs"
)]
async fn delete_job(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_job_id(&raw_id)?;

    let current = state
        .jobs
        .get(id.as_uuid())
        .ok_or_else(|| job_not_found(&raw_id))?;
    check_permissions(&caller.requester(), &current.created_by)?;

    if let Some(pool) = &state.db_pool {
        if !crate::db::jobs::delete(pool, &id).await? {
            return Err(job_not_found(&raw_id));
        }
    }
    state
        .jobs
        .remove(id.as_uuid())
        .ok_or_else(|| job_not_found(&raw_id))?;

    tracing::info!(job_id = %id, caller = %caller.user_id, "job removed");
    Ok(Json(MessageResponse {
        msg: "Success! Job removed".to_string(),
    }))
}
