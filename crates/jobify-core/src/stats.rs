//! # Dashboard Aggregation
//!
//! Per-status counts and the trailing monthly application histogram shown
//! on the stats page.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;
use utoipa::ToSchema;

use crate::identity::UserId;
use crate::job::{Job, JobStatus};

/// Number of most recent months reported in the histogram.
pub const MONTHLY_BUCKETS: usize = 6;

/// Count of records per status. Every key is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    /// Records with status `pending`.
    pub pending: u64,
    /// Records with status `interview`.
    pub interview: u64,
    /// Records with status `declined`.
    pub declined: u64,
}

impl StatusCounts {
    fn bump(&mut self, status: JobStatus) {
        match status {
            JobStatus::Pending => self.pending += 1,
            JobStatus::Interview => self.interview += 1,
            JobStatus::Declined => self.declined += 1,
        }
    }
}

/// Applications created in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlyApplication {
    /// Short month name and year, e.g. `"Oct 2026"`.
    pub date: String,
    /// Records created in that month.
    pub count: u64,
}

/// Response body of the stats endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    /// Counts per status.
    pub default_stats: StatusCounts,
    /// Up to six most recent months with any records, oldest first.
    pub monthly_applications: Vec<MonthlyApplication>,
}

/// Aggregate the records of `owner` found in `jobs`.
///
/// Months are bucketed on the UTC `createdAt`. Only months that contain at
/// least one record appear; the six most recent are returned in ascending
/// chronological order.
pub fn compute<'a, I>(owner: &UserId, jobs: I) -> JobStats
where
    I: IntoIterator<Item = &'a Job>,
{
    let mut default_stats = StatusCounts::default();
    // (year, month) -> (label, count)
    let mut months: BTreeMap<(i32, u32), (String, u64)> = BTreeMap::new();

    for job in jobs.into_iter().filter(|job| job.created_by == *owner) {
        default_stats.bump(job.status);

        let key = (job.created_at.year(), job.created_at.month());
        months
            .entry(key)
            .or_insert_with(|| (job.created_at.format("%b %Y").to_string(), 0))
            .1 += 1;
    }

    let mut monthly_applications: Vec<MonthlyApplication> = months
        .into_values()
        .rev()
        .take(MONTHLY_BUCKETS)
        .map(|(date, count)| MonthlyApplication { date, count })
        .collect();
    monthly_applications.reverse();

    JobStats {
        default_stats,
        monthly_applications,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::NewJob;
    use chrono::{TimeZone, Utc};

    fn job_at(owner: UserId, status: JobStatus, year: i32, month: u32, day: u32) -> Job {
        let at = Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap();
        let mut job = NewJob {
            position: Some("Dev".to_string()),
            company: Some("Acme".to_string()),
            ..NewJob::default()
        }
        .into_job(owner, at)
        .unwrap();
        job.status = status;
        job
    }

    #[test]
    fn missing_statuses_are_zero() {
        let owner = UserId::new();
        let jobs = vec![
            job_at(owner, JobStatus::Pending, 2026, 3, 1),
            job_at(owner, JobStatus::Declined, 2026, 3, 2),
            job_at(owner, JobStatus::Declined, 2026, 3, 3),
        ];
        let stats = compute(&owner, &jobs);
        assert_eq!(
            stats.default_stats,
            StatusCounts {
                pending: 1,
                interview: 0,
                declined: 2
            }
        );

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["defaultStats"]["interview"], 0);
    }

    #[test]
    fn only_owner_records_are_counted() {
        let owner = UserId::new();
        let jobs = vec![
            job_at(owner, JobStatus::Interview, 2026, 3, 1),
            job_at(UserId::new(), JobStatus::Interview, 2026, 3, 1),
        ];
        let stats = compute(&owner, &jobs);
        assert_eq!(stats.default_stats.interview, 1);
        assert_eq!(stats.monthly_applications[0].count, 1);
    }

    #[test]
    fn empty_input_has_empty_histogram() {
        let stats = compute(&UserId::new(), &Vec::<Job>::new());
        assert_eq!(stats.default_stats, StatusCounts::default());
        assert!(stats.monthly_applications.is_empty());
    }

    #[test]
    fn keeps_six_most_recent_months_ascending() {
        let owner = UserId::new();
        let mut jobs = Vec::new();
        // Eight distinct months spanning a year boundary, inserted out of order.
        for (year, month) in [
            (2026, 2),
            (2025, 7),
            (2025, 12),
            (2025, 8),
            (2026, 1),
            (2025, 9),
            (2025, 10),
            (2025, 11),
        ] {
            jobs.push(job_at(owner, JobStatus::Pending, year, month, 10));
        }
        jobs.push(job_at(owner, JobStatus::Pending, 2026, 2, 20));

        let stats = compute(&owner, &jobs);
        let labels: Vec<&str> = stats
            .monthly_applications
            .iter()
            .map(|m| m.date.as_str())
            .collect();
        assert_eq!(
            labels,
            ["Sep 2025", "Oct 2025", "Nov 2025", "Dec 2025", "Jan 2026", "Feb 2026"]
        );
        assert_eq!(stats.monthly_applications.last().unwrap().count, 2);
    }

    #[test]
    fn same_month_of_different_years_are_distinct() {
        let owner = UserId::new();
        let jobs = vec![
            job_at(owner, JobStatus::Pending, 2025, 5, 1),
            job_at(owner, JobStatus::Pending, 2026, 5, 1),
        ];
        let stats = compute(&owner, &jobs);
        assert_eq!(stats.monthly_applications.len(), 2);
        assert_eq!(stats.monthly_applications[0].date, "May 2025");
        assert_eq!(stats.monthly_applications[1].date, "May 2026");
    }
}
