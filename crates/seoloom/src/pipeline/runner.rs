use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, info_span, warn};

use crate::config::Config;
use crate::db::Database;
use crate::error::JobError;
use crate::generator::ContentGenerator;
use crate::jobs::{
    ArticleRequest, Job, JobStatus, JobStore, JobSummary, JobUpdate, ListFilter, Stage,
    StageOutput,
};
use crate::serp::SerpSource;

use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::error::StageError;
use super::progress::{ProgressEvent, ProgressReporter};
use super::retry::RetryPolicy;
use super::stages::StageRunner;

/// Drives jobs through the pipeline and owns every job state transition.
pub struct Orchestrator {
    store: JobStore,
    stages: StageRunner,
    retry: RetryPolicy,
}

impl Orchestrator {
    /// Production constructor: builds stages and retry policy from config.
    pub fn from_config(
        db: Database,
        config: &Config,
        serp: Arc<dyn SerpSource>,
        generator: Arc<dyn ContentGenerator>,
    ) -> Self {
        let pipeline = PipelineConfig::from_config(config);
        Self::new(
            JobStore::new(db),
            StageRunner::new(&pipeline, serp, generator),
            pipeline.retry,
        )
    }

    pub fn new(store: JobStore, stages: StageRunner, retry: RetryPolicy) -> Self {
        Self {
            store,
            stages,
            retry,
        }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// Creates a job for the request and runs it to completion or first failure.
    pub fn start(
        &self,
        request: ArticleRequest,
        progress: &dyn ProgressReporter,
    ) -> Result<Job, JobError> {
        if request.topic.trim().is_empty() {
            return Err(JobError::InvalidRequest("topic must not be empty".to_string()));
        }
        if request.target_word_count == 0 {
            return Err(JobError::InvalidRequest(
                "target word count must be positive".to_string(),
            ));
        }

        let request = ArticleRequest {
            topic: request.topic.trim().to_string(),
            ..request
        };
        let job = self.store.create(request)?;
        info!(job_id = %job.id, topic = %job.topic(), "Job created");
        self.drive(job, progress)
    }

    /// Re-enters a job at its current stage, reusing earlier checkpoints.
    ///
    /// An unknown id is [`JobError::NotFound`]. A completed job, or one whose
    /// earlier checkpoints are gone, is [`JobError::InvalidState`] and no stage
    /// runs.
    pub fn resume(&self, job_id: &str, progress: &dyn ProgressReporter) -> Result<Job, JobError> {
        let job = self.store.get(job_id)?;

        if job.is_finished() {
            return Err(JobError::InvalidState {
                job_id: job.id,
                reason: "job is already completed".to_string(),
            });
        }
        if let Some(missing) = Stage::PIPELINE
            .into_iter()
            .filter(|s| *s < job.current_stage)
            .find(|s| !job.stage_outputs.contains(*s))
        {
            return Err(JobError::InvalidState {
                job_id: job.id,
                reason: format!("checkpoint for {} is missing", missing),
            });
        }

        info!(
            job_id = %job.id,
            stage = %job.current_stage,
            previous_status = %job.status,
            "Resuming job"
        );
        self.drive(job, progress)
    }

    pub fn status(&self, job_id: &str) -> Result<Job, JobError> {
        self.store.get(job_id)
    }

    pub fn list(&self, filter: &ListFilter) -> Result<Vec<JobSummary>, JobError> {
        self.store.list(filter)
    }

    pub fn delete(&self, job_id: &str) -> Result<(), JobError> {
        self.store.delete(job_id)
    }

    fn drive(&self, job: Job, progress: &dyn ProgressReporter) -> Result<Job, JobError> {
        let _job_span = info_span!("job", job_id = %job.id, topic = %job.topic()).entered();

        let mut job = self.store.update(
            &job.id,
            JobUpdate::new().status(JobStatus::Running).begin_attempt(),
        )?;

        while job.current_stage != Stage::Done {
            let stage = job.current_stage;
            let _stage_span = info_span!("stage", name = stage.as_str()).entered();
            progress.report(ProgressEvent::StageStarted { stage });

            let started = Instant::now();
            let result = self.run_with_retry(stage, &PipelineContext::new(&job), progress);

            match result {
                Ok(output) => {
                    let next = stage.next();
                    let mut update = JobUpdate::new().output(output).stage(next).clear_error();
                    if next == Stage::Done {
                        update = update.status(JobStatus::Completed);
                    }
                    job = self.store.update(&job.id, update)?;

                    let elapsed = started.elapsed();
                    info!(elapsed_ms = elapsed.as_millis() as u64, "Stage completed");
                    progress.report(ProgressEvent::StageCompleted { stage, elapsed });
                }
                Err(err) => {
                    let message = err.to_string();
                    error!(error = %message, "Stage failed");
                    self.store.update(
                        &job.id,
                        JobUpdate::new()
                            .status(JobStatus::Failed)
                            .error(message.clone()),
                    )?;
                    progress.report(ProgressEvent::Failed {
                        stage,
                        error: message,
                    });
                    return Err(JobError::StageFailed {
                        job_id: job.id,
                        stage,
                        source: err,
                    });
                }
            }
        }

        // A record left at Done without the final status still holds every output.
        if !job.is_finished() {
            job = self
                .store
                .update(&job.id, JobUpdate::new().status(JobStatus::Completed))?;
        }

        let word_count = job.article().map(|a| a.word_count).unwrap_or_default();
        info!(word_count, attempts = job.attempts, "Job completed");
        progress.report(ProgressEvent::Completed {
            job_id: job.id.clone(),
            word_count,
        });
        Ok(job)
    }

    /// Runs a stage, retrying retryable failures with backoff.
    fn run_with_retry(
        &self,
        stage: Stage,
        ctx: &PipelineContext<'_>,
        progress: &dyn ProgressReporter,
    ) -> Result<StageOutput, StageError> {
        let mut attempt = 1;
        loop {
            match self.stages.run(stage, ctx) {
                Ok(output) => return Ok(output),
                Err(err) if err.is_retryable() && self.retry.should_retry(attempt) => {
                    let delay = err
                        .retry_after()
                        .map(|d| d.min(self.retry.max_delay))
                        .unwrap_or_else(|| self.retry.next_delay(attempt));
                    warn!(
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retryable stage failure"
                    );
                    progress.report(ProgressEvent::RetryScheduled {
                        stage,
                        attempt,
                        delay,
                        error: err.to_string(),
                    });
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_retryable() {
                        warn!(attempts = attempt, "Retries exhausted");
                    }
                    return Err(err);
                }
            }
        }
    }
}
