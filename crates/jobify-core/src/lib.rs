#![deny(missing_docs)]

//! # jobify-core: Domain Layer for the Jobify Job Tracker
//!
//! Everything here is pure: no I/O, no async, no HTTP. The API crate owns
//! storage and transport and calls into this crate for the rules.
//!
//! ## Modules
//!
//! - [`job`]: the [`Job`] record, its enums, field defaults and schema
//!   validation for creates and updates.
//! - [`query`]: the list query builder (owner scoping, status/type/search
//!   filters, sort keys and page arithmetic).
//! - [`stats`]: dashboard aggregation of per-status counts and the trailing
//!   six-month application histogram.
//! - [`access`]: roles and the ownership check applied before mutations.
//! - [`identity`]: UUID newtypes for users and jobs.
//! - [`error`]: [`ValidationError`] and [`PermissionDenied`].

pub mod access;
pub mod error;
pub mod identity;
pub mod job;
pub mod query;
pub mod stats;

pub use access::{check_permissions, Requester, Role};
pub use error::{PermissionDenied, ValidationError};
pub use identity::{JobId, UserId};
pub use job::{Job, JobChanges, JobStatus, JobType, NewJob};
pub use query::{JobPage, JobQuery, ListParams, Pagination, SortKey};
pub use stats::{JobStats, MonthlyApplication, StatusCounts};
