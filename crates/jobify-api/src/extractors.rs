//! # Custom Extractors & Validation
//!
//! Provides the [`Validate`] trait for request DTOs and helpers that turn
//! extractor rejections into [`AppError`]s with `{msg}` bodies.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;
use jobify_core::JobId;

use crate::error::AppError;

/// Trait for request types that check preconditions beyond what serde
/// deserialization checks.
pub trait Validate {
    /// Check the request. Returns the client-facing message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
///
/// Handlers take the body as `Result<Json<T>, JsonRejection>` and call this.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
///
/// A failed check is a [`AppError::BadRequest`] carrying the trait's message.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::BadRequest)?;
    Ok(value)
}

/// Extract query-string parameters, mapping failures to [`AppError::BadRequest`].
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Parse a job id taken from the path. An id that cannot name any record is
/// reported the same way as one that names no record.
pub fn parse_job_id(raw: &str) -> Result<JobId, AppError> {
    raw.parse().map_err(|_| job_not_found(raw))
}

/// The 404 returned for an unknown job id.
pub fn job_not_found(id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("No job with id :{id}"))
}
