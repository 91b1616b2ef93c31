//! Content generation: the model-call contract and its implementations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::schema::{LlmConfig, LlmProvider};
use crate::secrets::{resolve_secret_optional, SecretError};
use crate::seo::article::{ExternalReference, FaqEntry, InternalLink};
use crate::serp::analysis::{ArticleOutline, KeywordSignals};

pub mod anthropic;
pub mod offline;
pub mod parse;
pub mod prompts;

pub use anthropic::AnthropicGenerator;
pub use offline::OfflineGenerator;
pub use parse::parse_draft;
pub use prompts::build_prompt;

/// Everything a generator needs to write one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationPrompt {
    pub topic: String,
    pub language: String,
    pub target_word_count: u32,
    pub outline: ArticleOutline,
    pub questions: Vec<String>,
    pub keywords: KeywordSignals,
    pub system: String,
    /// Rendered user message.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorResponse {
    pub text: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("rate limited by generator{}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("transient generator failure: {0}")]
    Transient(String),

    #[error("malformed generator output: {0}")]
    Malformed(String),

    #[error("generator returned no text")]
    Empty,

    #[error("generator API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("generator client setup failed: {0}")]
    Client(String),
}

fn retry_hint(secs: &Option<u64>) -> String {
    match secs {
        Some(s) => format!(" (retry after {}s)", s),
        None => String::new(),
    }
}

/// A language-model call, or anything standing in for one.
pub trait ContentGenerator: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, prompt: &GenerationPrompt) -> Result<GeneratorResponse, GeneratorError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSection {
    pub heading: String,
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(default)]
    pub paragraphs: Vec<String>,
}

fn default_level() -> u8 {
    2
}

/// Structured article draft, the output of the content generation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDraft {
    pub title: String,
    pub introduction: Vec<String>,
    pub sections: Vec<DraftSection>,
    pub title_tag: String,
    pub meta_description: String,
    pub primary_keyword: String,
    pub secondary_keywords: Vec<String>,
    pub internal_links: Vec<InternalLink>,
    pub external_references: Vec<ExternalReference>,
    pub faq: Vec<FaqEntry>,
    pub word_count: usize,
    pub usage: Option<Usage>,
}

impl ContentDraft {
    /// Visible article text: title, body and FAQ, one block per line pair.
    pub fn plain_text(&self) -> String {
        let mut blocks: Vec<&str> = vec![self.title.as_str()];
        blocks.extend(self.introduction.iter().map(String::as_str));
        for section in &self.sections {
            blocks.push(&section.heading);
            blocks.extend(section.paragraphs.iter().map(String::as_str));
        }
        for entry in &self.faq {
            blocks.push(&entry.question);
            blocks.push(&entry.answer);
        }
        blocks.join("\n\n")
    }
}

/// Picks the generator for this run.
///
/// `offline` forces the template generator. Otherwise the configured provider
/// is used, falling back to offline when the Anthropic key is not available.
pub fn build_generator(
    config: &LlmConfig,
    offline: bool,
) -> Result<Box<dyn ContentGenerator>, SecretError> {
    if offline || config.provider == LlmProvider::Offline {
        return Ok(Box::new(OfflineGenerator::new()));
    }

    let key = resolve_secret_optional(
        config.api_key.as_deref(),
        config.api_key_file.as_deref(),
        config.api_key_env.as_deref(),
    )?;

    match key {
        Some(key) => match AnthropicGenerator::new(key, config) {
            Ok(generator) => Ok(Box::new(generator)),
            Err(e) => {
                tracing::warn!(error = %e, "Anthropic client unavailable, using offline generator");
                Ok(Box::new(OfflineGenerator::new()))
            }
        },
        None => {
            tracing::warn!("No API key configured, using offline generator");
            Ok(Box::new(OfflineGenerator::new()))
        }
    }
}
