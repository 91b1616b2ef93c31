//! SEO validation and formatting of generated drafts.

pub mod article;
pub mod html;
pub mod text;
pub mod validator;

pub use article::{
    ExternalReference, FaqEntry, GeneratedArticle, InternalLink, KeywordAnalysis, SeoMetadata,
};
pub use validator::{SeoRules, SeoValidator, SeoViolation, SeoViolations};
