//! The finished article and the link/FAQ types shared with the draft.

use serde::{Deserialize, Serialize};

use crate::serp::analysis::ArticleOutline;

/// Suggested link to another page on the same site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalLink {
    pub anchor_text: String,
    /// Slug or topic of the page to link to.
    pub target_page: String,
    /// Where in the article the link fits.
    #[serde(default)]
    pub context: String,
}

/// Authoritative source worth citing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalReference {
    pub source_name: String,
    pub url: String,
    /// What to cite and where.
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMetadata {
    pub title_tag: String,
    pub meta_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordAnalysis {
    pub primary_keyword: String,
    pub secondary_keywords: Vec<String>,
    /// Primary keyword occurrences per 100 words, rounded to two decimals.
    pub keyword_density: f64,
}

/// Final artifact of a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArticle {
    pub title: String,
    /// Full HTML body, FAQ section included.
    pub content: String,
    pub outline: ArticleOutline,
    pub seo_metadata: SeoMetadata,
    pub keyword_analysis: KeywordAnalysis,
    pub internal_links: Vec<InternalLink>,
    pub external_references: Vec<ExternalReference>,
    pub faq: Vec<FaqEntry>,
    pub faq_html: String,
    pub word_count: usize,
}
