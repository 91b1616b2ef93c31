//! Durable job storage over the `jobs` table.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

use crate::db::job_repo::{self, JobRow};
use crate::db::Database;
use crate::error::JobError;

use super::model::{ArticleRequest, Job, JobStatus, JobSummary, JobUpdate, Stage, StageOutputs};

fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(id: &str, field: &str, s: &str) -> Result<DateTime<Utc>, JobError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| JobError::Corrupt {
            job_id: id.to_string(),
            reason: format!("{} '{}': {}", field, s, e),
        })
}

fn corrupt(id: &str, reason: impl Into<String>) -> JobError {
    JobError::Corrupt {
        job_id: id.to_string(),
        reason: reason.into(),
    }
}

impl TryFrom<JobRow> for Job {
    type Error = JobError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let id = row.id.as_str();
        let status = row.status.parse::<JobStatus>().map_err(|e| corrupt(id, e))?;
        let current_stage = row.current_stage.parse::<Stage>().map_err(|e| corrupt(id, e))?;
        let stage_outputs: StageOutputs = serde_json::from_str(&row.stage_outputs)
            .map_err(|e| corrupt(id, format!("stage_outputs: {}", e)))?;
        let target_word_count = u32::try_from(row.target_word_count)
            .map_err(|_| corrupt(id, format!("target_word_count {}", row.target_word_count)))?;
        let attempts = u32::try_from(row.attempts)
            .map_err(|_| corrupt(id, format!("attempts {}", row.attempts)))?;
        let created_at = parse_timestamp(id, "created_at", &row.created_at)?;
        let updated_at = parse_timestamp(id, "updated_at", &row.updated_at)?;
        let completed_at = row
            .completed_at
            .as_deref()
            .map(|s| parse_timestamp(id, "completed_at", s))
            .transpose()?;

        Ok(Job {
            id: row.id,
            request: ArticleRequest {
                topic: row.topic,
                target_word_count,
                language: row.language,
            },
            status,
            current_stage,
            stage_outputs,
            error: row.error,
            attempts,
            created_at,
            updated_at,
            completed_at,
        })
    }
}

impl TryFrom<&Job> for JobRow {
    type Error = JobError;

    fn try_from(job: &Job) -> Result<Self, Self::Error> {
        let stage_outputs = serde_json::to_string(&job.stage_outputs)
            .map_err(|e| corrupt(&job.id, format!("stage_outputs: {}", e)))?;

        Ok(JobRow {
            id: job.id.clone(),
            topic: job.request.topic.clone(),
            target_word_count: i64::from(job.request.target_word_count),
            language: job.request.language.clone(),
            status: job.status.as_str().to_string(),
            current_stage: job.current_stage.as_str().to_string(),
            stage_outputs,
            error: job.error.clone(),
            attempts: i64::from(job.attempts),
            created_at: format_timestamp(job.created_at),
            updated_at: format_timestamp(job.updated_at),
            completed_at: job.completed_at.map(format_timestamp),
        })
    }
}

/// Listing filter.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub status: Option<JobStatus>,
    pub limit: Option<u64>,
}

/// Job persistence. Cloning is cheap; clones share the connection.
#[derive(Clone)]
pub struct JobStore {
    db: Database,
}

impl JobStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Persists a new pending job for the request.
    pub fn create(&self, request: ArticleRequest) -> Result<Job, JobError> {
        let job = Job::new(request);
        let row = JobRow::try_from(&job)?;
        self.db.with_conn(|conn| job_repo::insert(conn, &row))?;
        log::debug!("Created job {} for topic '{}'", job.id, job.request.topic);
        Ok(job)
    }

    pub fn get(&self, job_id: &str) -> Result<Job, JobError> {
        match self.db.with_conn(|conn| job_repo::find(conn, job_id))? {
            Some(row) => Job::try_from(row),
            None => Err(JobError::NotFound(job_id.to_string())),
        }
    }

    /// Applies `update` to the stored job inside one IMMEDIATE transaction and
    /// returns the job as written.
    pub fn update(&self, job_id: &str, update: JobUpdate) -> Result<Job, JobError> {
        self.db.with_transaction(|conn| {
            let row = job_repo::find(conn, job_id)?
                .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;
            let mut job = Job::try_from(row)?;
            // Stored timestamps have microsecond precision; keep updated_at monotonic.
            let now = Utc::now().trunc_subsecs(6).max(job.updated_at);
            update.apply(&mut job, now)?;

            let row = JobRow::try_from(&job)?;
            if !job_repo::update(conn, &row)? {
                return Err(JobError::NotFound(job_id.to_string()));
            }
            Ok(job)
        })
    }

    /// Jobs newest first.
    pub fn list(&self, filter: &ListFilter) -> Result<Vec<JobSummary>, JobError> {
        let status = filter.status.as_ref().map(JobStatus::as_str);
        let rows = self
            .db
            .with_conn(|conn| job_repo::list(conn, status, filter.limit))?;
        rows.into_iter()
            .map(|row| Job::try_from(row).map(|job| job.summary()))
            .collect()
    }

    pub fn delete(&self, job_id: &str) -> Result<(), JobError> {
        if self.db.with_conn(|conn| job_repo::delete(conn, job_id))? {
            log::info!("Deleted job {}", job_id);
            Ok(())
        } else {
            Err(JobError::NotFound(job_id.to_string()))
        }
    }
}
