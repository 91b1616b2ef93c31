//! Job record, lifecycle enums and partial updates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::JobError;
use crate::generator::ContentDraft;
use crate::seo::article::GeneratedArticle;
use crate::serp::analysis::SerpAnalysis;

pub const DEFAULT_WORD_COUNT: u32 = 1500;
pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status '{}'", other)),
        }
    }
}

/// Pipeline position. Ordering follows execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SerpAnalysis,
    ContentGeneration,
    SeoValidation,
    Done,
}

impl Stage {
    /// The three executable stages, in order.
    pub const PIPELINE: [Stage; 3] = [
        Stage::SerpAnalysis,
        Stage::ContentGeneration,
        Stage::SeoValidation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::SerpAnalysis => "serp_analysis",
            Stage::ContentGeneration => "content_generation",
            Stage::SeoValidation => "seo_validation",
            Stage::Done => "done",
        }
    }

    pub fn next(&self) -> Stage {
        match self {
            Stage::SerpAnalysis => Stage::ContentGeneration,
            Stage::ContentGeneration => Stage::SeoValidation,
            Stage::SeoValidation | Stage::Done => Stage::Done,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serp_analysis" => Ok(Stage::SerpAnalysis),
            "content_generation" => Ok(Stage::ContentGeneration),
            "seo_validation" => Ok(Stage::SeoValidation),
            "done" => Ok(Stage::Done),
            other => Err(format!("unknown stage '{}'", other)),
        }
    }
}

/// What to generate. Immutable once the job exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRequest {
    pub topic: String,
    pub target_word_count: u32,
    pub language: String,
}

impl ArticleRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            target_word_count: DEFAULT_WORD_COUNT,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_word_count(mut self, words: u32) -> Self {
        self.target_word_count = words;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Result of one stage run.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    SerpAnalysis(SerpAnalysis),
    ContentGeneration(ContentDraft),
    SeoValidation(GeneratedArticle),
}

impl StageOutput {
    pub fn stage(&self) -> Stage {
        match self {
            StageOutput::SerpAnalysis(_) => Stage::SerpAnalysis,
            StageOutput::ContentGeneration(_) => Stage::ContentGeneration,
            StageOutput::SeoValidation(_) => Stage::SeoValidation,
        }
    }
}

/// Checkpointed outputs, persisted as one JSON object keyed by stage name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageOutputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serp_analysis: Option<SerpAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_generation: Option<ContentDraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_validation: Option<GeneratedArticle>,
}

impl StageOutputs {
    /// Stores an output, replacing any earlier output of the same stage.
    pub fn insert(&mut self, output: StageOutput) {
        match output {
            StageOutput::SerpAnalysis(o) => self.serp_analysis = Some(o),
            StageOutput::ContentGeneration(o) => self.content_generation = Some(o),
            StageOutput::SeoValidation(o) => self.seo_validation = Some(o),
        }
    }

    pub fn contains(&self, stage: Stage) -> bool {
        match stage {
            Stage::SerpAnalysis => self.serp_analysis.is_some(),
            Stage::ContentGeneration => self.content_generation.is_some(),
            Stage::SeoValidation => self.seo_validation.is_some(),
            Stage::Done => false,
        }
    }

    pub fn completed_stages(&self) -> Vec<Stage> {
        Stage::PIPELINE
            .into_iter()
            .filter(|s| self.contains(*s))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    pub request: ArticleRequest,
    pub status: JobStatus,
    pub current_stage: Stage,
    pub stage_outputs: StageOutputs,
    pub error: Option<String>,
    /// Runs that entered the pipeline: the first start plus each resume.
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(request: ArticleRequest) -> Self {
        // Truncated to what the store keeps, so a loaded job equals the created one.
        let now = Utc::now().trunc_subsecs(6);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            request,
            status: JobStatus::Pending,
            current_stage: Stage::SerpAnalysis,
            stage_outputs: StageOutputs::default(),
            error: None,
            attempts: 0,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn topic(&self) -> &str {
        &self.request.topic
    }

    /// The finished article, present once the job has completed.
    pub fn article(&self) -> Option<&GeneratedArticle> {
        self.stage_outputs.seo_validation.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.status == JobStatus::Completed
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id.clone(),
            topic: self.request.topic.clone(),
            status: self.status,
            current_stage: self.current_stage,
            error: self.error.clone(),
            attempts: self.attempts,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Listing view of a job, without stage outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    pub topic: String,
    pub status: JobStatus,
    pub current_stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A set of field changes applied to a job in one atomic write.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    status: Option<JobStatus>,
    stage: Option<Stage>,
    output: Option<StageOutput>,
    error: Option<Option<String>>,
    begin_attempt: bool,
}

impl JobUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn output(mut self, output: StageOutput) -> Self {
        self.output = Some(output);
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(Some(message.into()));
        self
    }

    pub fn clear_error(mut self) -> Self {
        self.error = Some(None);
        self
    }

    /// Counts a new run of the job.
    pub fn begin_attempt(mut self) -> Self {
        self.begin_attempt = true;
        self
    }

    /// Applies the changes, refusing any that would break the job invariants.
    pub fn apply(self, job: &mut Job, now: DateTime<Utc>) -> Result<(), JobError> {
        let invalid = |reason: String| JobError::InvalidState {
            job_id: job.id.clone(),
            reason,
        };

        if let Some(stage) = self.stage {
            if stage < job.current_stage {
                return Err(invalid(format!(
                    "stage cannot move back from {} to {}",
                    job.current_stage, stage
                )));
            }
        }

        let mut next = job.clone();
        if let Some(output) = self.output {
            next.stage_outputs.insert(output);
        }
        if let Some(stage) = self.stage {
            next.current_stage = stage;
        }
        if let Some(error) = self.error {
            next.error = error;
        }
        if let Some(status) = self.status {
            next.status = status;
            if status == JobStatus::Completed {
                next.completed_at = Some(now);
            }
        }
        if self.begin_attempt {
            next.attempts += 1;
        }

        match next.status {
            JobStatus::Completed => {
                if next.current_stage != Stage::Done
                    || next.stage_outputs.completed_stages().len() != Stage::PIPELINE.len()
                {
                    return Err(invalid(
                        "completed job must be at done with every stage output".to_string(),
                    ));
                }
            }
            JobStatus::Failed => {
                if next.error.is_none() {
                    return Err(invalid("failed job must carry an error".to_string()));
                }
            }
            JobStatus::Pending | JobStatus::Running => {}
        }

        next.updated_at = now;
        *job = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serp::{DensityRange, MockSerpSource, SerpAnalyzer, SerpSource};

    fn job() -> Job {
        Job::new(ArticleRequest::new("remote work"))
    }

    fn serp_output() -> StageOutput {
        let data = MockSerpSource::new(2).fetch("remote work").unwrap();
        StageOutput::SerpAnalysis(SerpAnalyzer::new(DensityRange::default()).analyze(data))
    }

    #[test]
    fn test_new_job_defaults() {
        let job = job();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.current_stage, Stage::SerpAnalysis);
        assert_eq!(job.request.target_word_count, 1500);
        assert_eq!(job.request.language, "en");
        assert_eq!(job.attempts, 0);
        assert!(job.article().is_none());
        assert_eq!(job.id.len(), 36);
    }

    #[test]
    fn test_stage_order_and_names() {
        assert!(Stage::SerpAnalysis < Stage::ContentGeneration);
        assert!(Stage::SeoValidation < Stage::Done);
        assert_eq!(Stage::SeoValidation.next(), Stage::Done);
        assert_eq!(Stage::Done.next(), Stage::Done);
        for stage in Stage::PIPELINE.into_iter().chain([Stage::Done]) {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), stage);
        }
        assert_eq!(
            serde_json::to_string(&Stage::ContentGeneration).unwrap(),
            "\"content_generation\""
        );
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Failed".parse::<JobStatus>().unwrap(), JobStatus::Failed);
        assert!("paused".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_update_advances_and_clears_error() {
        let mut job = job();
        job.error = Some("earlier failure".into());
        let now = Utc::now();

        JobUpdate::new()
            .status(JobStatus::Running)
            .output(serp_output())
            .stage(Stage::ContentGeneration)
            .clear_error()
            .begin_attempt()
            .apply(&mut job, now)
            .unwrap();

        assert_eq!(job.current_stage, Stage::ContentGeneration);
        assert!(job.stage_outputs.contains(Stage::SerpAnalysis));
        assert!(job.error.is_none());
        assert_eq!(job.attempts, 1);
        assert_eq!(job.updated_at, now);
    }

    #[test]
    fn test_update_rejects_stage_regression() {
        let mut job = job();
        job.current_stage = Stage::SeoValidation;
        let before = job.clone();

        let err = JobUpdate::new()
            .stage(Stage::SerpAnalysis)
            .apply(&mut job, Utc::now())
            .unwrap_err();

        assert!(matches!(err, JobError::InvalidState { .. }));
        assert_eq!(job, before);
    }

    #[test]
    fn test_failed_requires_error() {
        let mut job = job();
        assert!(JobUpdate::new()
            .status(JobStatus::Failed)
            .apply(&mut job, Utc::now())
            .is_err());
        assert!(JobUpdate::new()
            .status(JobStatus::Failed)
            .error("boom")
            .apply(&mut job, Utc::now())
            .is_ok());
        assert_eq!(job.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_completed_requires_all_outputs() {
        let mut job = job();
        let err = JobUpdate::new()
            .status(JobStatus::Completed)
            .stage(Stage::Done)
            .output(serp_output())
            .apply(&mut job, Utc::now())
            .unwrap_err();
        assert!(matches!(err, JobError::InvalidState { .. }));
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn test_stage_outputs_json_keys() {
        let mut outputs = StageOutputs::default();
        assert_eq!(serde_json::to_string(&outputs).unwrap(), "{}");

        outputs.insert(serp_output());
        let value: serde_json::Value = serde_json::to_value(&outputs).unwrap();
        assert!(value.get("serp_analysis").is_some());
        assert!(value.get("content_generation").is_none());
        assert_eq!(outputs.completed_stages(), vec![Stage::SerpAnalysis]);
    }
}
