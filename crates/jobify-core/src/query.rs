//! # List Query Builder
//!
//! Turns the raw list parameters of `GET /jobs` into a [`JobQuery`] and runs
//! it over a sequence of records in natural (insertion) order.
//!
//! ## Semantics
//!
//! - Results are always scoped to one owner.
//! - `status` and `jobType` narrow the result unless absent, empty, or
//!   `"all"`. A value naming no known member matches nothing.
//! - `search` is a case-insensitive substring match on `position`.
//! - `sort` is one of `latest`, `oldest`, `a-z`, `z-a`. Anything else keeps
//!   natural order. Sorting is stable, so ties keep natural order too.
//! - `page`/`limit` fall back to 1/10 when absent or not a positive
//!   integer. Pages past the end are empty, never an error.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::identity::UserId;
use crate::job::Job;

/// Page used when the request does not give a usable one.
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when the request does not give a usable one.
pub const DEFAULT_LIMIT: u64 = 10;

/// Filter value that disables a filter.
const ALL: &str = "all";

/// Raw query-string parameters of the list endpoint.
///
/// Everything is kept as an optional string; interpretation happens in
/// [`JobQuery::new`] so malformed values degrade to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Status filter, or `all`.
    pub status: Option<String>,
    /// Job type filter, or `all`.
    pub job_type: Option<String>,
    /// Case-insensitive substring of `position`.
    pub search: Option<String>,
    /// One of `latest`, `oldest`, `a-z`, `z-a`.
    pub sort: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
}

/// Ordering applied before pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Newest `createdAt` first.
    Latest,
    /// Oldest `createdAt` first.
    Oldest,
    /// `position` ascending.
    AZ,
    /// `position` descending.
    ZA,
}

impl SortKey {
    /// Parse a sort key. Unrecognized keys yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "latest" => Some(Self::Latest),
            "oldest" => Some(Self::Oldest),
            "a-z" => Some(Self::AZ),
            "z-a" => Some(Self::ZA),
            _ => None,
        }
    }

    /// Return the wire representation of this key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Oldest => "oldest",
            Self::AZ => "a-z",
            Self::ZA => "z-a",
        }
    }

    fn compare(&self, a: &Job, b: &Job) -> std::cmp::Ordering {
        match self {
            Self::Latest => b.created_at.cmp(&a.created_at),
            Self::Oldest => a.created_at.cmp(&b.created_at),
            Self::AZ => a.position.cmp(&b.position),
            Self::ZA => b.position.cmp(&a.position),
        }
    }
}

/// Page number and page size, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    limit: u64,
}

impl Pagination {
    /// Build from explicit values, substituting defaults for zero.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Build from raw query-string values.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        Self::new(parse_positive(page), parse_positive(limit))
    }

    /// 1-based page number.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Page size.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of records skipped before this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Pages needed to hold `total` records.
    pub fn num_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// Zero stands for "not given"; [`Pagination::new`] maps it to the default.
fn parse_positive(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(0)
}

/// One page of list results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobPage {
    /// Records on this page.
    pub jobs: Vec<Job>,
    /// Matching records across all pages.
    pub total_jobs: u64,
    /// `ceil(total_jobs / limit)`.
    pub num_of_pages: u64,
}

/// A fully interpreted list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    owner: UserId,
    status: Option<String>,
    job_type: Option<String>,
    search: Option<String>,
    sort: Option<SortKey>,
    pagination: Pagination,
}

impl JobQuery {
    /// Interpret raw list parameters for `owner`.
    pub fn new(owner: UserId, params: &ListParams) -> Self {
        Self {
            owner,
            status: active_filter(params.status.as_deref()),
            job_type: active_filter(params.job_type.as_deref()),
            search: params
                .search
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase),
            sort: params.sort.as_deref().and_then(SortKey::parse),
            pagination: Pagination::from_raw(params.page.as_deref(), params.limit.as_deref()),
        }
    }

    /// A query for every record of `owner`, first page, natural order.
    pub fn for_owner(owner: UserId) -> Self {
        Self::new(owner, &ListParams::default())
    }

    /// The owner this query is scoped to.
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    /// The effective sort key, if any.
    pub fn sort(&self) -> Option<SortKey> {
        self.sort
    }

    /// The effective pagination.
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Whether `job` passes the owner scope and every active filter.
    pub fn matches(&self, job: &Job) -> bool {
        if job.created_by != self.owner {
            return false;
        }
        if let Some(ref status) = self.status {
            if job.status.as_str() != status.as_str() {
                return false;
            }
        }
        if let Some(ref job_type) = self.job_type {
            if job.job_type.as_str() != job_type.as_str() {
                return false;
            }
        }
        if let Some(ref needle) = self.search {
            if !job.position.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        true
    }

    /// Filter, sort and paginate `jobs`, which must be in natural order.
    pub fn run<I>(&self, jobs: I) -> JobPage
    where
        I: IntoIterator<Item = Job>,
    {
        let mut matching: Vec<Job> = jobs.into_iter().filter(|job| self.matches(job)).collect();
        if let Some(key) = self.sort {
            matching.sort_by(|a, b| key.compare(a, b));
        }

        let total_jobs = matching.len() as u64;
        let offset = usize::try_from(self.pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.pagination.limit()).unwrap_or(usize::MAX);
        let jobs = matching.into_iter().skip(offset).take(limit).collect();

        JobPage {
            jobs,
            total_jobs,
            num_of_pages: self.pagination.num_pages(total_jobs),
        }
    }
}

fn active_filter(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.is_empty() && *s != ALL).map(str::to_string)
}
