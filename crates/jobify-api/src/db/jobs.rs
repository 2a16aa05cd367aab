//! Job persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `jobs` table. Schema
//! rules are enforced by `jobify-core` before anything reaches SQL; the
//! table's CHECK constraints are a second line only.

use chrono::{DateTime, Utc};
use jobify_core::{Job, JobId, JobStatus, JobType, UserId};
use sqlx::PgPool;
use uuid::Uuid;

/// Insert a new job record.
pub async fn insert(pool: &PgPool, job: &Job) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO jobs (id, position, company, job_location, status, job_type, created_by, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(*job.id.as_uuid())
    .bind(&job.position)
    .bind(&job.company)
    .bind(&job.job_location)
    .bind(job.status.as_str())
    .bind(job.job_type.as_str())
    .bind(*job.created_by.as_uuid())
    .bind(job.created_at)
    .bind(job.updated_at)
    .execute(pool)
    .await?;

    tracing::debug!(job_id = %job.id, "persisted job");
    Ok(())
}

/// Read a job under `FOR UPDATE`, let `change` derive the new record from it,
/// and write the result back in the same transaction.
///
/// Concurrent updates of one row are serialized, so each `change` sees the
/// previous commit. Returns `Ok(None)` if no row matched. An `Err` from
/// `change` rolls the transaction back.
pub async fn update_locked<E>(
    pool: &PgPool,
    id: &JobId,
    change: impl FnOnce(&Job) -> Result<Job, E>,
) -> Result<Option<Job>, E>
where
    E: From<sqlx::Error>,
{
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, JobRow>(
        "SELECT id, position, company, job_location, status, job_type, created_by, created_at, updated_at
         FROM jobs WHERE id = $1 FOR UPDATE",
    )
    .bind(*id.as_uuid())
    .fetch_optional(&mut *tx)
    .await?;
    let Some(row) = row else {
        return Ok(None);
    };

    let job = change(&row.try_into_job()?)?;
    sqlx::query(
        "UPDATE jobs SET position = $1, company = $2, job_location = $3, status = $4,
                job_type = $5, updated_at = $6
         WHERE id = $7",
    )
    .bind(&job.position)
    .bind(&job.company)
    .bind(&job.job_location)
    .bind(job.status.as_str())
    .bind(job.job_type.as_str())
    .bind(job.updated_at)
    .bind(*job.id.as_uuid())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::debug!(job_id = %job.id, "updated job");
    Ok(Some(job))
}

/// Delete a job. Returns `false` if no row matched.
pub async fn delete(pool: &PgPool, id: &JobId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(*id.as_uuid())
        .execute(pool)
        .await?;

    tracing::debug!(job_id = %id, rows = result.rows_affected(), "deleted job");
    Ok(result.rows_affected() > 0)
}

/// Load all jobs in creation order, for hydrating the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Job>, sqlx::Error> {
    let rows = sqlx::query_as::<_, JobRow>(
        "SELECT id, position, company, job_location, status, job_type, created_by, created_at, updated_at
         FROM jobs ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(JobRow::try_into_job).collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    position: String,
    company: String,
    job_location: String,
    status: String,
    job_type: String,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl JobRow {
    /// Unknown enum values fail the load instead of being silently rewritten.
    fn try_into_job(self) -> Result<Job, sqlx::Error> {
        let status = JobStatus::parse(&self.status)
            .ok_or_else(|| decode_error(self.id, "status", &self.status))?;
        let job_type = JobType::parse(&self.job_type)
            .ok_or_else(|| decode_error(self.id, "job_type", &self.job_type))?;

        Ok(Job {
            id: JobId::from_uuid(self.id),
            position: self.position,
            company: self.company,
            job_location: self.job_location,
            status,
            job_type,
            created_by: UserId::from_uuid(self.created_by),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn decode_error(id: Uuid, column: &str, value: &str) -> sqlx::Error {
    tracing::error!(%id, column, value, "unknown enum value in jobs table");
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("unknown {column} value {value:?} for job {id}").into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, job_type: &str) -> JobRow {
        let now = Utc::now();
        JobRow {
            id: Uuid::new_v4(),
            position: "Dev".to_string(),
            company: "Acme".to_string(),
            job_location: "Remote".to_string(),
            status: status.to_string(),
            job_type: job_type.to_string(),
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_converts_to_job() {
        let r = row("interview", "part-time");
        let (id, owner) = (r.id, r.created_by);
        let job = r.try_into_job().unwrap();
        assert_eq!(*job.id.as_uuid(), id);
        assert_eq!(*job.created_by.as_uuid(), owner);
        assert_eq!(job.status, JobStatus::Interview);
        assert_eq!(job.job_type, JobType::PartTime);
    }

    #[test]
    fn unknown_status_fails_decode() {
        let err = row("hired", "remote").try_into_job().unwrap_err();
        assert!(matches!(err, sqlx::Error::ColumnDecode { .. }));
    }

    #[test]
    fn unknown_job_type_fails_decode() {
        assert!(row("pending", "contract").try_into_job().is_err());
    }
}
