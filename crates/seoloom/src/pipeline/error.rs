use thiserror::Error;

use crate::generator::GeneratorError;
use crate::jobs::Stage;
use crate::seo::SeoViolations;
use crate::serp::SerpError;

/// Why a single stage run failed.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("SERP source unavailable: {0}")]
    SourceUnavailable(#[from] SerpError),

    #[error("content generation failed: {0}")]
    Generation(String),

    #[error("generator rate limited")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("transient generator failure: {0}")]
    Transient(String),

    #[error("SEO validation failed: {0}")]
    Validation(#[from] SeoViolations),

    /// The output of an earlier stage is missing from the job record.
    #[error("no checkpointed output for {0}")]
    MissingCheckpoint(Stage),

    #[error("{0} is not an executable stage")]
    NotExecutable(Stage),
}

impl StageError {
    /// Only upstream throttling and transient failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StageError::RateLimited { .. } | StageError::Transient(_))
    }

    /// Server-requested wait before the next attempt.
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            StageError::RateLimited {
                retry_after_secs: Some(secs),
            } => Some(std::time::Duration::from_secs(*secs)),
            _ => None,
        }
    }
}

impl From<GeneratorError> for StageError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::RateLimited { retry_after_secs } => {
                StageError::RateLimited { retry_after_secs }
            }
            GeneratorError::Transient(msg) => StageError::Transient(msg),
            other => StageError::Generation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(StageError::Transient("502".into()).is_retryable());
        assert!(StageError::RateLimited {
            retry_after_secs: None
        }
        .is_retryable());
        assert!(!StageError::Generation("bad json".into()).is_retryable());
        assert!(!StageError::Validation(SeoViolations(vec![])).is_retryable());
        let down = SerpError::Unavailable("down".into());
        assert!(!StageError::SourceUnavailable(down).is_retryable());
        assert!(!StageError::MissingCheckpoint(Stage::SerpAnalysis).is_retryable());
    }

    #[test]
    fn test_from_generator_error() {
        let rate: StageError = GeneratorError::RateLimited {
            retry_after_secs: Some(5),
        }
        .into();
        assert_eq!(rate.retry_after(), Some(std::time::Duration::from_secs(5)));

        let malformed: StageError = GeneratorError::Malformed("eof".into()).into();
        assert!(matches!(malformed, StageError::Generation(ref m) if m.contains("eof")));

        let api: StageError = GeneratorError::Api {
            status: 401,
            message: "bad key".into(),
        }
        .into();
        assert!(!api.is_retryable());
    }
}
