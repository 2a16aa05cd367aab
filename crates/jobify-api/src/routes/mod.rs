//! # API Route Modules
//!
//! - `jobs`: job application CRUD, the filtered list and dashboard stats,
//!   mounted under `/api/v1`.

pub mod jobs;
