//! The three executable stages behind one dispatch point.

use std::sync::Arc;

use tracing::debug;

use crate::generator::{build_prompt, parse_draft, ContentGenerator};
use crate::jobs::{Stage, StageOutput};
use crate::seo::SeoValidator;
use crate::serp::{SerpAnalyzer, SerpError, SerpSource};

use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::error::StageError;

pub struct StageRunner {
    serp: Arc<dyn SerpSource>,
    analyzer: SerpAnalyzer,
    generator: Arc<dyn ContentGenerator>,
    validator: SeoValidator,
}

impl StageRunner {
    pub fn new(
        config: &PipelineConfig,
        serp: Arc<dyn SerpSource>,
        generator: Arc<dyn ContentGenerator>,
    ) -> Self {
        Self {
            serp,
            analyzer: SerpAnalyzer::new(config.target_density),
            generator,
            validator: SeoValidator::new(config.seo_rules.clone()),
        }
    }

    /// Runs one stage against the job's checkpoints.
    ///
    /// Reads only the request and earlier outputs, so re-running a stage with
    /// the same checkpoints and deterministic collaborators yields the same
    /// output.
    pub fn run(&self, stage: Stage, ctx: &PipelineContext<'_>) -> Result<StageOutput, StageError> {
        match stage {
            Stage::SerpAnalysis => self.serp_analysis(ctx),
            Stage::ContentGeneration => self.content_generation(ctx),
            Stage::SeoValidation => self.seo_validation(ctx),
            Stage::Done => Err(StageError::NotExecutable(stage)),
        }
    }

    fn serp_analysis(&self, ctx: &PipelineContext<'_>) -> Result<StageOutput, StageError> {
        let data = self.serp.fetch(ctx.topic())?;
        if data.results.is_empty() {
            return Err(SerpError::NoResults {
                query: ctx.topic().to_string(),
            }
            .into());
        }
        debug!(results = data.results.len(), "SERP results fetched");

        Ok(StageOutput::SerpAnalysis(self.analyzer.analyze(data)))
    }

    fn content_generation(&self, ctx: &PipelineContext<'_>) -> Result<StageOutput, StageError> {
        let analysis = ctx.serp_analysis()?;
        let prompt = build_prompt(
            ctx.topic(),
            &ctx.request.language,
            ctx.request.target_word_count,
            analysis,
        );

        let response = self.generator.generate(&prompt)?;
        let draft = parse_draft(&response, ctx.topic())?;
        debug!(
            generator = self.generator.name(),
            words = draft.word_count,
            input_tokens = draft.usage.map(|u| u.input_tokens),
            output_tokens = draft.usage.map(|u| u.output_tokens),
            "Draft generated"
        );

        Ok(StageOutput::ContentGeneration(draft))
    }

    fn seo_validation(&self, ctx: &PipelineContext<'_>) -> Result<StageOutput, StageError> {
        let analysis = ctx.serp_analysis()?;
        let draft = ctx.draft()?;
        let article = self.validator.validate(
            draft,
            &analysis.keywords,
            &analysis.outline,
            ctx.request.target_word_count,
        )?;

        Ok(StageOutput::SeoValidation(article))
    }
}
