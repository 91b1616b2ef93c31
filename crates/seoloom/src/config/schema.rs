use serde::{Deserialize, Serialize};

use crate::seo::SeoRules;
use crate::serp::DensityRange;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    /// Overrides the default `~/.seoloom/data/jobs.db`.
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub seo: SeoConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub serp: SerpConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            database_path: None,
            generation: GenerationConfig::default(),
            seo: SeoConfig::default(),
            retry: RetryConfig::default(),
            llm: LlmConfig::default(),
            serp: SerpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub default_word_count: u32,
    pub language: String,
    /// Allowed relative deviation of the final word count, e.g. 0.05 for ±5%.
    pub word_count_tolerance: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_word_count: 1500,
            language: "en".to_string(),
            word_count_tolerance: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoConfig {
    pub density_min: f64,
    pub density_max: f64,
    pub title_tag_max: usize,
    pub meta_description_max: usize,
    pub internal_links_min: usize,
    pub internal_links_max: usize,
    pub external_links_min: usize,
    pub external_links_max: usize,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            density_min: 1.0,
            density_max: 3.0,
            title_tag_max: 60,
            meta_description_max: 160,
            internal_links_min: 3,
            internal_links_max: 5,
            external_links_min: 2,
            external_links_max: 4,
        }
    }
}

impl SeoConfig {
    pub fn density_range(&self) -> DensityRange {
        DensityRange::new(self.density_min, self.density_max)
    }

    pub fn rules(&self, word_count_tolerance: f64) -> SeoRules {
        SeoRules {
            word_count_tolerance,
            title_tag_max: self.title_tag_max,
            meta_description_max: self.meta_description_max,
            internal_links_min: self.internal_links_min,
            internal_links_max: self.internal_links_max,
            external_links_min: self.external_links_min,
            external_links_max: self.external_links_max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            multiplier: 2.0,
            max_delay_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Anthropic,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub max_tokens: u32,
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Direct key value. Prefer `api_key_file` or `api_key_env`.
    pub api_key: Option<String>,
    pub api_key_file: Option<String>,
    pub api_key_env: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Anthropic,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4000,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 120,
            api_key: None,
            api_key_file: None,
            api_key_env: Some(DEFAULT_API_KEY_ENV.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpConfig {
    pub result_count: usize,
}

impl Default for SerpConfig {
    fn default() -> Self {
        Self { result_count: 10 }
    }
}
