pub mod config;
pub mod context;
pub mod error;
pub mod progress;
pub mod retry;
pub mod runner;
pub mod stages;

pub use config::PipelineConfig;
pub use context::PipelineContext;
pub use error::StageError;
pub use progress::{NoopProgress, ProgressEvent, ProgressReporter, RecordingProgress};
pub use retry::RetryPolicy;
pub use runner::Orchestrator;
pub use stages::StageRunner;
