//! SEO checks and final formatting of a draft.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generator::ContentDraft;
use crate::serp::analysis::{ArticleOutline, DensityRange, KeywordSignals};

use super::article::{GeneratedArticle, KeywordAnalysis, SeoMetadata};
use super::html::{render_article, render_faq};
use super::text::{count_words, keyword_density, truncate_at_word};

/// Limits the validator enforces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoRules {
    /// Allowed relative deviation from the target word count.
    pub word_count_tolerance: f64,
    pub title_tag_max: usize,
    pub meta_description_max: usize,
    pub internal_links_min: usize,
    pub internal_links_max: usize,
    pub external_links_min: usize,
    pub external_links_max: usize,
}

impl Default for SeoRules {
    fn default() -> Self {
        Self {
            word_count_tolerance: 0.05,
            title_tag_max: 60,
            meta_description_max: 160,
            internal_links_min: 3,
            internal_links_max: 5,
            external_links_min: 2,
            external_links_max: 4,
        }
    }
}

impl SeoRules {
    /// Inclusive word count bounds for a target.
    pub fn word_count_bounds(&self, target: u32) -> (usize, usize) {
        let target = f64::from(target);
        let min = (target * (1.0 - self.word_count_tolerance)).round() as usize;
        let max = (target * (1.0 + self.word_count_tolerance)).round() as usize;
        (min, max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeoViolation {
    WordCount { actual: usize, min: usize, max: usize },
    KeywordDensity { keyword: String, density: f64, range: DensityRange },
    TooFewInternalLinks { found: usize, min: usize },
    TooFewExternalReferences { found: usize, min: usize },
    MissingFaq,
    MissingMetaDescription,
}

impl fmt::Display for SeoViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WordCount { actual, min, max } => {
                write!(f, "word count {} outside {}-{}", actual, min, max)
            }
            Self::KeywordDensity {
                keyword,
                density,
                range,
            } => write!(
                f,
                "keyword density of '{}' is {:.2}%, expected {}",
                keyword, density, range
            ),
            Self::TooFewInternalLinks { found, min } => {
                write!(f, "{} internal links, need at least {}", found, min)
            }
            Self::TooFewExternalReferences { found, min } => {
                write!(f, "{} external references, need at least {}", found, min)
            }
            Self::MissingFaq => write!(f, "FAQ section is empty"),
            Self::MissingMetaDescription => write!(f, "meta description is empty"),
        }
    }
}

/// Every rule the draft broke, in check order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeoViolations(pub Vec<SeoViolation>);

impl fmt::Display for SeoViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for SeoViolations {}

#[derive(Debug, Clone, Default)]
pub struct SeoValidator {
    rules: SeoRules,
}

impl SeoValidator {
    pub fn new(rules: SeoRules) -> Self {
        Self { rules }
    }

    /// Checks the draft and, if it passes, formats the final article.
    ///
    /// Link lists longer than the maxima are cut down; shorter than the minima
    /// is a violation. Density is measured for the primary keyword of
    /// `signals` over title, body and FAQ text.
    pub fn validate(
        &self,
        draft: &ContentDraft,
        signals: &KeywordSignals,
        outline: &ArticleOutline,
        target_word_count: u32,
    ) -> Result<GeneratedArticle, SeoViolations> {
        let rules = &self.rules;
        let mut violations = Vec::new();

        let text = draft.plain_text();
        let word_count = count_words(&text);
        let (min, max) = rules.word_count_bounds(target_word_count);
        if word_count < min || word_count > max {
            violations.push(SeoViolation::WordCount {
                actual: word_count,
                min,
                max,
            });
        }

        let density = keyword_density(&text, &signals.primary);
        if !signals.target_density.contains(density) {
            violations.push(SeoViolation::KeywordDensity {
                keyword: signals.primary.clone(),
                density,
                range: signals.target_density,
            });
        }

        if draft.internal_links.len() < rules.internal_links_min {
            violations.push(SeoViolation::TooFewInternalLinks {
                found: draft.internal_links.len(),
                min: rules.internal_links_min,
            });
        }
        if draft.external_references.len() < rules.external_links_min {
            violations.push(SeoViolation::TooFewExternalReferences {
                found: draft.external_references.len(),
                min: rules.external_links_min,
            });
        }
        if draft.faq.is_empty() {
            violations.push(SeoViolation::MissingFaq);
        }
        if draft.meta_description.trim().is_empty() {
            violations.push(SeoViolation::MissingMetaDescription);
        }

        debug!(
            word_count,
            density,
            violations = violations.len(),
            "SEO validation checked"
        );

        if !violations.is_empty() {
            return Err(SeoViolations(violations));
        }

        let title_tag = if draft.title_tag.trim().is_empty() {
            &draft.title
        } else {
            &draft.title_tag
        };

        let secondary_keywords = if draft.secondary_keywords.is_empty() {
            signals.secondary.clone()
        } else {
            draft.secondary_keywords.clone()
        };

        Ok(GeneratedArticle {
            title: draft.title.clone(),
            content: render_article(draft),
            outline: outline.clone(),
            seo_metadata: SeoMetadata {
                title_tag: truncate_at_word(title_tag, rules.title_tag_max),
                meta_description: truncate_at_word(
                    &draft.meta_description,
                    rules.meta_description_max,
                ),
            },
            keyword_analysis: KeywordAnalysis {
                primary_keyword: signals.primary.clone(),
                secondary_keywords,
                keyword_density: density,
            },
            internal_links: draft
                .internal_links
                .iter()
                .take(rules.internal_links_max)
                .cloned()
                .collect(),
            external_references: draft
                .external_references
                .iter()
                .take(rules.external_links_max)
                .cloned()
                .collect(),
            faq: draft.faq.clone(),
            faq_html: render_faq(&draft.faq),
            word_count,
        })
    }
}
