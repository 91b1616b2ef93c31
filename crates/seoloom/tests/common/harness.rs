//! Isolated job database for integration tests.
//!
//! Each harness owns a temp directory holding one SQLite file. Orchestrators
//! built from the same harness share that file, so a second orchestrator acts
//! like a fresh process resuming work left by the first.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use seoloom::config::Config;
use seoloom::db::Database;
use seoloom::generator::ContentGenerator;
use seoloom::jobs::JobStore;
use seoloom::pipeline::{Orchestrator, PipelineConfig, RetryPolicy, StageRunner};
use seoloom::serp::SerpSource;

pub struct TestHarness {
    temp_dir: TempDir,
    pub db_path: PathBuf,
    retry: RetryPolicy,
}

impl TestHarness {
    /// Harness whose orchestrators retry up to three times without sleeping.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("data").join("jobs.db");
        Self {
            temp_dir,
            db_path,
            retry: RetryPolicy::immediate(3),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Opens a new connection to the harness database.
    pub fn database(&self) -> Database {
        Database::open(&self.db_path).expect("Failed to open test database")
    }

    pub fn store(&self) -> JobStore {
        JobStore::new(self.database())
    }

    /// Orchestrator over default pipeline settings and the given collaborators.
    pub fn orchestrator(
        &self,
        serp: Arc<dyn SerpSource>,
        generator: Arc<dyn ContentGenerator>,
    ) -> Orchestrator {
        self.orchestrator_with(&Config::default(), serp, generator)
    }

    pub fn orchestrator_with(
        &self,
        config: &Config,
        serp: Arc<dyn SerpSource>,
        generator: Arc<dyn ContentGenerator>,
    ) -> Orchestrator {
        let pipeline = PipelineConfig::from_config(config);
        Orchestrator::new(
            self.store(),
            StageRunner::new(&pipeline, serp, generator),
            self.retry.clone(),
        )
    }
}
