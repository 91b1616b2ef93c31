use crate::config::Config;
use crate::seo::SeoRules;
use crate::serp::DensityRange;

use super::retry::RetryPolicy;

/// The parts of [`Config`] the pipeline needs, resolved once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub target_density: DensityRange,
    pub seo_rules: SeoRules,
    pub retry: RetryPolicy,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            target_density: config.seo.density_range(),
            seo_rules: config.seo.rules(config.generation.word_count_tolerance),
            retry: RetryPolicy::from_config(&config.retry),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
