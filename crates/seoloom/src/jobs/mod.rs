//! Jobs: the persisted unit of work and its store.

pub mod model;
pub mod store;

pub use model::{
    ArticleRequest, Job, JobStatus, JobSummary, JobUpdate, Stage, StageOutput, StageOutputs,
};
pub use store::{JobStore, ListFilter};
