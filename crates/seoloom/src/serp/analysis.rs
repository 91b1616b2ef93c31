//! Turns raw results into themes, an outline, FAQ questions and keyword targets.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{SerpData, SerpResult};
use crate::seo::text::title_case;

const STOP_WORDS: &[&str] = &[
    "this", "that", "with", "from", "have", "they", "will", "your", "about", "their", "which",
    "these", "best", "guide",
];

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{4,}\b").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeTerm {
    pub term: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSection {
    pub h2: String,
    pub h3: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleOutline {
    pub h1: String,
    pub sections: Vec<OutlineSection>,
}

/// Inclusive keyword density bounds, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityRange {
    pub min: f64,
    pub max: f64,
}

impl DensityRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, density: f64) -> bool {
        density >= self.min && density <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

impl Default for DensityRange {
    fn default() -> Self {
        Self::new(1.0, 3.0)
    }
}

impl std::fmt::Display for DensityRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%-{:.1}%", self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSignals {
    pub primary: String,
    pub secondary: Vec<String>,
    pub target_density: DensityRange,
}

/// Output of the SERP analysis stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerpAnalysis {
    pub query: String,
    pub results: Vec<SerpResult>,
    pub themes: Vec<ThemeTerm>,
    pub outline: ArticleOutline,
    pub questions: Vec<String>,
    pub keywords: KeywordSignals,
}

#[derive(Debug, Clone)]
pub struct SerpAnalyzer {
    target_density: DensityRange,
    max_themes: usize,
    max_secondary_keywords: usize,
}

impl SerpAnalyzer {
    pub fn new(target_density: DensityRange) -> Self {
        Self {
            target_density,
            max_themes: 20,
            max_secondary_keywords: 5,
        }
    }

    pub fn with_max_themes(mut self, max_themes: usize) -> Self {
        self.max_themes = max_themes;
        self
    }

    /// Pure function of the fetched results: the same input always yields
    /// the same analysis.
    pub fn analyze(&self, data: SerpData) -> SerpAnalysis {
        let themes = self.extract_themes(&data);
        let outline = generate_outline(&data.query);
        let questions = extract_questions(&data.query);
        let keywords = self.derive_keywords(&data.query, &themes);

        SerpAnalysis {
            query: data.query,
            results: data.results,
            themes,
            outline,
            questions,
            keywords,
        }
    }

    /// Most frequent words of four or more letters across titles and snippets.
    ///
    /// Ties keep first-seen order.
    pub fn extract_themes(&self, data: &SerpData) -> Vec<ThemeTerm> {
        let text = data
            .results
            .iter()
            .map(|r| format!("{} {}", r.title, r.snippet))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let mut counts: HashMap<&str, (u32, usize)> = HashMap::new();
        for (position, m) in RE_WORD.find_iter(&text).enumerate() {
            let word = m.as_str();
            if STOP_WORDS.contains(&word) {
                continue;
            }
            counts.entry(word).or_insert((0, position)).0 += 1;
        }

        let mut ranked: Vec<(&str, u32, usize)> = counts
            .into_iter()
            .map(|(term, (count, first))| (term, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        ranked
            .into_iter()
            .take(self.max_themes)
            .map(|(term, count, _)| ThemeTerm {
                term: term.to_string(),
                count,
            })
            .collect()
    }

    fn derive_keywords(&self, query: &str, themes: &[ThemeTerm]) -> KeywordSignals {
        let query_words: Vec<String> = query
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();

        let secondary = themes
            .iter()
            .filter(|t| !query_words.contains(&t.term))
            .take(self.max_secondary_keywords)
            .map(|t| t.term.clone())
            .collect();

        KeywordSignals {
            primary: query.to_string(),
            secondary,
            target_density: self.target_density,
        }
    }
}

pub fn generate_outline(query: &str) -> ArticleOutline {
    let title = title_case(query);
    let section = |h2: String, h3: [&str; 3]| OutlineSection {
        h2,
        h3: h3.iter().map(|s| s.to_string()).collect(),
    };

    ArticleOutline {
        h1: format!("The Complete Guide to {}", title),
        sections: vec![
            section(
                format!("What is {}?", title),
                ["Definition and Overview", "Why It Matters", "Key Benefits"],
            ),
            section(
                format!("Top Strategies for {}", title),
                [
                    "Strategy #1: Foundation",
                    "Strategy #2: Implementation",
                    "Strategy #3: Optimization",
                ],
            ),
            section(
                "Best Practices and Tips".to_string(),
                [
                    "Common Mistakes to Avoid",
                    "Expert Recommendations",
                    "Tools and Resources",
                ],
            ),
            section(
                format!("Getting Started with {}", title),
                ["Step-by-Step Guide", "Measuring Success", "Next Steps"],
            ),
        ],
    }
}

pub fn extract_questions(query: &str) -> Vec<String> {
    vec![
        format!("What is {}?", query),
        format!("How do I get started with {}?", query),
        format!("What are the benefits of {}?", query),
        format!("What tools are best for {}?", query),
    ]
}
