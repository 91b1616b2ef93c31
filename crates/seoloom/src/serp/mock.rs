//! Deterministic SERP source used when no search API is wired in.

use super::{SerpData, SerpError, SerpResult, SerpSource};

pub const DEFAULT_RESULT_COUNT: usize = 10;

/// Returns the same shaped page of results for every query.
#[derive(Debug, Clone)]
pub struct MockSerpSource {
    result_count: usize,
}

impl MockSerpSource {
    pub fn new(result_count: usize) -> Self {
        Self { result_count }
    }
}

impl Default for MockSerpSource {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_COUNT)
    }
}

impl SerpSource for MockSerpSource {
    fn fetch(&self, query: &str) -> Result<SerpData, SerpError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SerpError::NoResults {
                query: query.to_string(),
            });
        }

        let results = (0..self.result_count)
            .map(|i| SerpResult {
                rank: i as u32 + 1,
                url: format!("https://example{}.com/article", i),
                title: format!("Top {} {} - Complete Guide 2025", 10 + i, query),
                snippet: format!(
                    "Discover the best practices for {}. \
                     Learn about tools, strategies, and tips...",
                    query
                ),
            })
            .collect();

        Ok(SerpData {
            query: query.to_string(),
            results,
        })
    }
}
