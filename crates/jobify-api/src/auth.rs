//! # Authentication Middleware
//!
//! Bearer token middleware that resolves the caller's identity.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{user_id}:{secret}
//! ```
//!
//! `role` is `user` or `admin`, `user_id` is a UUID, and `secret` must match
//! the configured `AUTH_TOKEN`. When no token is configured, authentication
//! is disabled and every request runs as a development admin.
//!
//! ## CallerIdentity
//!
//! Every authenticated request gets a [`CallerIdentity`] injected into the
//! request extensions. Handlers extract it via the `FromRequestParts` impl.

use axum::extract::Request;
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jobify_core::{Requester, Role, UserId};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::AppError;

/// Message returned for every authentication failure.
const AUTH_INVALID: &str = "Authentication Invalid";

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of the authenticated caller, extracted from the auth context
/// and available to all route handlers via Axum's `FromRequestParts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The caller's role.
    pub role: Role,
    /// The caller's user ID; owner of the records they create.
    pub user_id: UserId,
}

impl CallerIdentity {
    /// Identity used for every request while authentication is disabled.
    pub fn development_admin() -> Self {
        Self {
            role: Role::Admin,
            user_id: UserId::from_uuid(Uuid::nil()),
        }
    }

    /// The caller as seen by the ownership check.
    pub fn requester(&self) -> Requester {
        Requester {
            user_id: self.user_id,
            role: self.role,
        }
    }
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present (middleware didn't run or failed).
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .ok_or_else(|| AppError::Unauthenticated(AUTH_INVALID.to_string()))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets.
///
/// When lengths differ, performs a dummy comparison so the timing does not
/// depend on where the mismatch is.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token of the form `{role}:{user_id}:{secret}`.
///
/// The secret is checked first, so a wrong secret never reveals whether
/// the role or user ID would have parsed.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    let mut parts = provided.splitn(3, ':');
    let (Some(role), Some(user), Some(secret)) = (parts.next(), parts.next(), parts.next()) else {
        return Err("invalid token format, expected {role}:{user_id}:{secret}".into());
    };

    if !constant_time_token_eq(secret, expected_secret) {
        return Err("invalid bearer token".into());
    }

    let role = Role::parse(role).ok_or_else(|| format!("unknown role: {role}"))?;
    let user_id = user
        .parse::<UserId>()
        .map_err(|e| format!("invalid user_id: {e}"))?;

    Ok(CallerIdentity { role, user_id })
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Extract and validate the Bearer token from the Authorization header.
///
/// When `AuthConfig.token` is `None`, all requests are allowed with the
/// [`CallerIdentity::development_admin`] identity.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected_token = request.extensions().get::<AuthConfig>().cloned();

    match expected_token {
        Some(AuthConfig {
            token: Some(ref expected),
        }) => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match auth_header.and_then(|value| value.strip_prefix("Bearer ")) {
                Some(provided) => match parse_bearer_token(provided, expected) {
                    Ok(identity) => {
                        request.extensions_mut().insert(identity);
                        next.run(request).await
                    }
                    Err(reason) => {
                        tracing::warn!(%reason, "authentication failed: invalid bearer token");
                        unauthorized_response()
                    }
                },
                None if auth_header.is_some() => {
                    tracing::warn!("authentication failed: non-Bearer authorization scheme");
                    unauthorized_response()
                }
                None => {
                    tracing::warn!("authentication failed: missing authorization header");
                    unauthorized_response()
                }
            }
        }
        _ => {
            request
                .extensions_mut()
                .insert(CallerIdentity::development_admin());
            next.run(request).await
        }
    }
}

fn unauthorized_response() -> Response {
    AppError::Unauthenticated(AUTH_INVALID.to_string()).into_response()
}
