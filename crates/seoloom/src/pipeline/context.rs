use crate::generator::ContentDraft;
use crate::jobs::{ArticleRequest, Job, Stage, StageOutputs};
use crate::serp::SerpAnalysis;

use super::error::StageError;

/// Read-only view of a job handed to a stage.
pub struct PipelineContext<'a> {
    pub request: &'a ArticleRequest,
    // Checkpoints from earlier stages, present once those stages succeeded.
    pub outputs: &'a StageOutputs,
}

impl<'a> PipelineContext<'a> {
    pub fn new(job: &'a Job) -> Self {
        Self {
            request: &job.request,
            outputs: &job.stage_outputs,
        }
    }

    pub fn topic(&self) -> &str {
        &self.request.topic
    }

    pub fn serp_analysis(&self) -> Result<&'a SerpAnalysis, StageError> {
        self.outputs
            .serp_analysis
            .as_ref()
            .ok_or(StageError::MissingCheckpoint(Stage::SerpAnalysis))
    }

    pub fn draft(&self) -> Result<&'a ContentDraft, StageError> {
        self.outputs
            .content_generation
            .as_ref()
            .ok_or(StageError::MissingCheckpoint(Stage::ContentGeneration))
    }
}
