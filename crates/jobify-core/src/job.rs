//! # Job Records
//!
//! The [`Job`] record, its enumerated fields, defaults, and the schema
//! rules applied on create and after every update.
//!
//! Incoming payloads carry `status` and `jobType` as raw strings so that an
//! unknown value becomes a validation message next to any other failing
//! rule, instead of a deserialization error that hides the rest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::identity::{JobId, UserId};

/// Location used when a create request does not name one.
pub const DEFAULT_JOB_LOCATION: &str = "my city";

/// Maximum length of `position`, in characters.
pub const MAX_POSITION_LEN: usize = 100;
/// Maximum length of `company`, in characters.
pub const MAX_COMPANY_LEN: usize = 50;
/// Maximum length of `jobLocation`, in characters.
pub const MAX_LOCATION_LEN: usize = 100;

/// Where an application stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Submitted, no response yet.
    #[default]
    Pending,
    /// An interview has been scheduled or held.
    Interview,
    /// The application was turned down.
    Declined,
}

impl JobStatus {
    /// Every status, in display order.
    pub const ALL: [JobStatus; 3] = [Self::Pending, Self::Interview, Self::Declined];

    /// Return the wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Interview => "interview",
            Self::Declined => "declined",
        }
    }

    /// Parse the wire representation. Matching is exact.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Employment type of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    /// Full-time employment.
    #[default]
    FullTime,
    /// Part-time employment.
    PartTime,
    /// Fully remote position.
    Remote,
    /// Internship.
    Internship,
}

impl JobType {
    /// Every job type, in display order.
    pub const ALL: [JobType; 4] = [
        Self::FullTime,
        Self::PartTime,
        Self::Remote,
        Self::Internship,
    ];

    /// Return the wire representation of this job type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullTime => "full-time",
            Self::PartTime => "part-time",
            Self::Remote => "remote",
            Self::Internship => "internship",
        }
    }

    /// Parse the wire representation. Matching is exact.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == s)
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked job application.
///
/// `created_by` is fixed at creation; [`Job::apply`] never touches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Record identifier.
    pub id: JobId,
    /// Position applied for.
    pub position: String,
    /// Company applied to.
    pub company: String,
    /// Where the job is located.
    pub job_location: String,
    /// Application status.
    pub status: JobStatus,
    /// Employment type.
    pub job_type: JobType,
    /// Owner of the record.
    pub created_by: UserId,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Fields of a create request, before defaults and validation.
///
/// `position` and `company` are optional so that a missing or `null` field
/// reaches the handler's presence check instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    /// Position applied for.
    #[serde(default)]
    pub position: Option<String>,
    /// Company applied to.
    #[serde(default)]
    pub company: Option<String>,
    /// Location; defaults to [`DEFAULT_JOB_LOCATION`].
    #[serde(default)]
    pub job_location: Option<String>,
    /// Status; defaults to `pending`.
    #[serde(default)]
    pub status: Option<String>,
    /// Job type; defaults to `full-time`.
    #[serde(default)]
    pub job_type: Option<String>,
}

/// Fields of an update request. Absent optional fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobChanges {
    /// New position.
    #[serde(default)]
    pub position: Option<String>,
    /// New company.
    #[serde(default)]
    pub company: Option<String>,
    /// New location, if changing.
    #[serde(default)]
    pub job_location: Option<String>,
    /// New status, if changing.
    #[serde(default)]
    pub status: Option<String>,
    /// New job type, if changing.
    #[serde(default)]
    pub job_type: Option<String>,
}

impl NewJob {
    /// Whether both `position` and `company` are filled in.
    pub fn has_required_fields(&self) -> bool {
        is_supplied(&self.position) && is_supplied(&self.company)
    }

    /// Apply defaults, validate, and build a record owned by `owner`.
    pub fn into_job(self, owner: UserId, now: DateTime<Utc>) -> Result<Job, ValidationError> {
        let mut issues = Vec::new();
        let status = parse_status(self.status.as_deref(), &mut issues).unwrap_or_default();
        let job_type = parse_job_type(self.job_type.as_deref(), &mut issues).unwrap_or_default();

        let job = Job {
            id: JobId::new(),
            position: self.position.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            job_location: self
                .job_location
                .unwrap_or_else(|| DEFAULT_JOB_LOCATION.to_string()),
            status,
            job_type,
            created_by: owner,
            created_at: now,
            updated_at: now,
        };
        job.collect_issues(&mut issues);
        ValidationError::check(issues)?;
        Ok(job)
    }
}

impl JobChanges {
    /// Whether both `position` and `company` are filled in.
    pub fn has_required_fields(&self) -> bool {
        is_supplied(&self.position) && is_supplied(&self.company)
    }
}

impl Job {
    /// Validate the text fields of an existing record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        self.collect_issues(&mut issues);
        ValidationError::check(issues)
    }

    /// Return the record as it would look after `changes`, re-validated.
    ///
    /// `self` is left untouched, so a failed update mutates nothing. Only the
    /// supplied fields change; a missing `position` or `company` keeps its
    /// current value.
    pub fn apply(&self, changes: JobChanges, now: DateTime<Utc>) -> Result<Job, ValidationError> {
        let mut issues = Vec::new();
        let status = parse_status(changes.status.as_deref(), &mut issues);
        let job_type = parse_job_type(changes.job_type.as_deref(), &mut issues);

        let updated = Job {
            id: self.id,
            position: changes
                .position
                .unwrap_or_else(|| self.position.clone()),
            company: changes.company.unwrap_or_else(|| self.company.clone()),
            job_location: changes
                .job_location
                .unwrap_or_else(|| self.job_location.clone()),
            status: status.unwrap_or(self.status),
            job_type: job_type.unwrap_or(self.job_type),
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: now,
        };
        updated.collect_issues(&mut issues);
        ValidationError::check(issues)?;
        Ok(updated)
    }

    fn collect_issues(&self, issues: &mut Vec<String>) {
        check_text("position", &self.position, MAX_POSITION_LEN, issues);
        check_text("company", &self.company, MAX_COMPANY_LEN, issues);
        check_text("jobLocation", &self.job_location, MAX_LOCATION_LEN, issues);
    }
}

fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

fn is_supplied(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(is_present)
}

fn check_text(field: &str, value: &str, max: usize, issues: &mut Vec<String>) {
    if !is_present(value) {
        issues.push(format!("Please provide {field}"));
    } else if value.chars().count() > max {
        issues.push(format!(
            "Path `{field}` is longer than the maximum allowed length ({max})."
        ));
    }
}

fn parse_status(raw: Option<&str>, issues: &mut Vec<String>) -> Option<JobStatus> {
    let raw = raw?;
    let parsed = JobStatus::parse(raw);
    if parsed.is_none() {
        issues.push(enum_issue(raw, "status"));
    }
    parsed
}

fn parse_job_type(raw: Option<&str>, issues: &mut Vec<String>) -> Option<JobType> {
    let raw = raw?;
    let parsed = JobType::parse(raw);
    if parsed.is_none() {
        issues.push(enum_issue(raw, "jobType"));
    }
    parsed
}

fn enum_issue(value: &str, field: &str) -> String {
    format!("`{value}` is not a valid enum value for path `{field}`.")
}
