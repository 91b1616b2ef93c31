//! Search results: the source contract and the analysis built on top of it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod analysis;
pub mod mock;

pub use analysis::{
    ArticleOutline, DensityRange, KeywordSignals, OutlineSection, SerpAnalysis, SerpAnalyzer,
    ThemeTerm,
};
pub use mock::MockSerpSource;

/// Individual search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerpResult {
    /// 1-based position on the results page.
    pub rank: u32,
    pub url: String,
    pub title: String,
    pub snippet: String,
}

/// Ranked results for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerpData {
    pub query: String,
    pub results: Vec<SerpResult>,
}

#[derive(Debug, Error)]
pub enum SerpError {
    #[error("SERP source unavailable: {0}")]
    Unavailable(String),

    #[error("SERP source returned no results for '{query}'")]
    NoResults { query: String },
}

/// Anything that can return ranked results for a query.
pub trait SerpSource: Send + Sync {
    fn fetch(&self, query: &str) -> Result<SerpData, SerpError>;
}
