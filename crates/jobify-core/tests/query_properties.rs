//! # Property Tests for Listing and Aggregation
//!
//! Random record sets are generated for two owners, then the list query
//! and the stats aggregation are checked against counts computed the
//! slow way.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use jobify_core::stats;
use jobify_core::{Job, JobQuery, JobStatus, JobType, ListParams, NewJob, UserId};

#[derive(Debug, Clone)]
struct Seed {
    mine: bool,
    status: usize,
    job_type: usize,
    position: String,
    days: i64,
}

fn seed() -> impl Strategy<Value = Seed> {
    (
        any::<bool>(),
        0..JobStatus::ALL.len(),
        0..JobType::ALL.len(),
        "[a-cA-C]{1,6}",
        0i64..400,
    )
        .prop_map(|(mine, status, job_type, position, days)| Seed {
            mine,
            status,
            job_type,
            position,
            days,
        })
}

fn build(me: UserId, other: UserId, seeds: &[Seed]) -> Vec<Job> {
    let epoch = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    seeds
        .iter()
        .map(|s| {
            let owner = if s.mine { me } else { other };
            let mut job = NewJob {
                position: Some(s.position.clone()),
                company: Some("Acme".to_string()),
                ..NewJob::default()
            }
            .into_job(owner, epoch + Duration::days(s.days))
            .unwrap();
            job.status = JobStatus::ALL[s.status];
            job.job_type = JobType::ALL[s.job_type];
            job
        })
        .collect()
}

fn optional_filter<T: Clone + std::fmt::Debug + 'static>(
    values: &'static [T],
) -> impl Strategy<Value = Option<T>> {
    proptest::option::of(proptest::sample::select(values))
}

proptest! {
    /// `totalJobs` counts exactly the owner's matching records and every
    /// returned record matches.
    #[test]
    fn total_equals_matching_count(
        seeds in proptest::collection::vec(seed(), 0..40),
        status in optional_filter(&JobStatus::ALL),
        job_type in optional_filter(&JobType::ALL),
        search in proptest::option::of("[a-c]{1,2}"),
    ) {
        let me = UserId::new();
        let jobs = build(me, UserId::new(), &seeds);
        let params = ListParams {
            status: status.map(|s| s.as_str().to_string()),
            job_type: job_type.map(|t| t.as_str().to_string()),
            search: search.clone(),
            limit: Some("1000".to_string()),
            ..ListParams::default()
        };
        let query = JobQuery::new(me, &params);

        let expected = jobs
            .iter()
            .filter(|j| j.created_by == me)
            .filter(|j| status.map_or(true, |s| j.status == s))
            .filter(|j| job_type.map_or(true, |t| j.job_type == t))
            .filter(|j| {
                search
                    .as_deref()
                    .map_or(true, |n| j.position.to_lowercase().contains(n))
            })
            .count() as u64;

        let page = query.run(jobs);
        prop_assert_eq!(page.total_jobs, expected);
        prop_assert_eq!(page.jobs.len() as u64, expected);
        for job in &page.jobs {
            prop_assert!(query.matches(job));
        }
    }

    /// Pages never exceed the limit, and the page count rounds up.
    #[test]
    fn pages_respect_limit(
        seeds in proptest::collection::vec(seed(), 0..40),
        page in 1u64..8,
        limit in 1u64..12,
    ) {
        let me = UserId::new();
        let jobs = build(me, UserId::new(), &seeds);
        let params = ListParams {
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
            ..ListParams::default()
        };
        let result = JobQuery::new(me, &params).run(jobs);

        prop_assert!(result.jobs.len() as u64 <= limit);
        prop_assert_eq!(result.num_of_pages, result.total_jobs.div_ceil(limit));
        let skipped = (page - 1) * limit;
        let expected_len = result.total_jobs.saturating_sub(skipped).min(limit);
        prop_assert_eq!(result.jobs.len() as u64, expected_len);
    }

    /// `a-z` and `z-a` produce mutually reversed orderings of positions.
    #[test]
    fn alphabetical_sorts_are_ordered(seeds in proptest::collection::vec(seed(), 0..30)) {
        let me = UserId::new();
        let jobs = build(me, UserId::new(), &seeds);
        let sorted = |key: &str| {
            let params = ListParams {
                sort: Some(key.to_string()),
                limit: Some("1000".to_string()),
                ..ListParams::default()
            };
            JobQuery::new(me, &params)
                .run(jobs.clone())
                .jobs
                .into_iter()
                .map(|j| j.position)
                .collect::<Vec<_>>()
        };

        let asc = sorted("a-z");
        let desc = sorted("z-a");
        prop_assert!(asc.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(desc.windows(2).all(|w| w[0] >= w[1]));
    }

    /// Status counts add up to the owner's records, and the histogram holds
    /// at most six strictly ascending months.
    #[test]
    fn stats_cover_owner_records(seeds in proptest::collection::vec(seed(), 0..40)) {
        let me = UserId::new();
        let jobs = build(me, UserId::new(), &seeds);
        let owned = seeds.iter().filter(|s| s.mine).count() as u64;

        let result = stats::compute(&me, &jobs);
        let counts = result.default_stats;
        prop_assert_eq!(counts.pending + counts.interview + counts.declined, owned);

        let months = &result.monthly_applications;
        prop_assert!(months.len() <= stats::MONTHLY_BUCKETS);
        prop_assert!(months.iter().all(|m| m.count > 0));
        prop_assert!(months.iter().map(|m| m.count).sum::<u64>() <= owned);

        let keys: Vec<_> = months
            .iter()
            .map(|m| chrono::NaiveDate::parse_from_str(&format!("01 {}", m.date), "%d %b %Y").unwrap())
            .collect();
        prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }
}
