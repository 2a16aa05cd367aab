//! # Domain Errors
//!
//! Errors raised by the pure domain layer. The API crate maps each of
//! these onto an HTTP status; nothing here knows about HTTP.

use thiserror::Error;

/// Schema validation failure for a job record.
///
/// Validation collects every failing rule rather than stopping at the
/// first, so a single response can tell the client everything that is
/// wrong. `Display` joins the messages with `,`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .issues.join(","))]
pub struct ValidationError {
    issues: Vec<String>,
}

impl ValidationError {
    /// Build an error from a non-empty list of messages.
    pub fn new(issues: Vec<String>) -> Self {
        Self { issues }
    }

    /// The individual rule violations, in the order they were found.
    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    /// Turn a list of collected messages into `Ok(())` when it is empty.
    pub(crate) fn check(issues: Vec<String>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self::new(issues))
        }
    }
}

/// The requester is neither the owner of the resource nor an admin.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Not authorized to access this route")]
pub struct PermissionDenied;
