pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod generator;
pub mod jobs;
pub mod logging;
pub mod pipeline;
pub mod secrets;
pub mod seo;
pub mod serp;

pub use config::{load_config, resolve_config, Config};
pub use db::{Database, DatabaseError};
pub use error::{ConfigError, ExportError, JobError, Result, SeoloomError};
pub use export::export_article;
pub use generator::{build_generator, ContentGenerator, GenerationPrompt, GeneratorError};
pub use jobs::{ArticleRequest, Job, JobStatus, JobStore, JobSummary, ListFilter, Stage};
pub use pipeline::{NoopProgress, Orchestrator, ProgressEvent, ProgressReporter, StageError};
pub use secrets::{resolve_secret, resolve_secret_optional, SecretError};
pub use seo::GeneratedArticle;
pub use serp::{MockSerpSource, SerpData, SerpError, SerpSource};
