//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from `jobify-core` and storage errors from SQLx to
//! HTTP status codes. Every error response body is `{"msg": "..."}`.
//! Internal error details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jobify_core::{PermissionDenied, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Message returned for every error the client is not meant to see.
pub const INTERNAL_MESSAGE: &str = "Something went wrong, try again later";

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub msg: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing values or a request body that could not be parsed (400).
    #[error("{0}")]
    BadRequest(String),

    /// Schema validation failed (400). Messages are joined with `,`.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A value collided with a uniqueness constraint (400).
    #[error("{0} field has to be unique")]
    Unique(String),

    /// Missing or invalid credentials (401).
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but not allowed to touch the resource (403).
    #[error("{0}")]
    Forbidden(String),

    /// Unknown resource or route (404).
    #[error("{0}")]
    NotFound(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code for this error.
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) | Self::Unique(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let msg = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { msg })).into_response()
    }
}

impl From<PermissionDenied> for AppError {
    fn from(err: PermissionDenied) -> Self {
        Self::Forbidden(err.to_string())
    }
}

/// Unique violations become a client error naming the field; anything else
/// from the database is internal.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::Unique(unique_field(db.constraint(), db.table()));
            }
        }
        Self::Internal(err.to_string())
    }
}

/// Recover the column name from a Postgres unique constraint name.
///
/// Postgres names implicit constraints `<table>_<column>_key` and primary
/// keys `<table>_pkey`.
fn unique_field(constraint: Option<&str>, table: Option<&str>) -> String {
    let Some(constraint) = constraint else {
        return "value".to_string();
    };
    if constraint.ends_with("_pkey") {
        return "id".to_string();
    }
    let stem = constraint.strip_suffix("_key").unwrap_or(constraint);
    let field = table
        .and_then(|t| stem.strip_prefix(t))
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(stem);
    field.to_string()
}
