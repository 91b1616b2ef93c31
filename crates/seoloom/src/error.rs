use std::path::PathBuf;
use thiserror::Error;

use crate::jobs::Stage;
use crate::pipeline::StageError;

#[derive(Error, Debug)]
pub enum SeoloomError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Job error: {0}")]
    Job(#[from] JobError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Secret error: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Failures of job operations.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Job '{0}' not found")]
    NotFound(String),

    #[error("Invalid article request: {0}")]
    InvalidRequest(String),

    #[error("Job storage failed: {0}")]
    Storage(#[from] crate::db::DatabaseError),

    #[error("Job '{job_id}' cannot do that: {reason}")]
    InvalidState { job_id: String, reason: String },

    #[error("Job '{job_id}' failed at {stage}: {source}")]
    StageFailed {
        job_id: String,
        stage: Stage,
        #[source]
        source: StageError,
    },

    /// A stored record that can no longer be decoded.
    #[error("Job '{job_id}' record is corrupt: {reason}")]
    Corrupt { job_id: String, reason: String },
}

impl JobError {
    /// Id of the job the error is about, when there is one.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            JobError::NotFound(id) => Some(id),
            JobError::InvalidState { job_id, .. }
            | JobError::StageFailed { job_id, .. }
            | JobError::Corrupt { job_id, .. } => Some(job_id),
            JobError::Storage(_) | JobError::InvalidRequest(_) => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Job '{0}' has no finished article")]
    NotCompleted(String),

    #[error("Failed to serialize article: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write '{}': {source}", .path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SeoloomError>;
