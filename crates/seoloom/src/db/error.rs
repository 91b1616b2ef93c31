//! Database error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the SQLite layer.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database directory could not be created.
    #[error("IO error for path '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    #[error("Job database has schema v{found}, this build supports up to v{supported}")]
    SchemaTooNew { found: u32, supported: u32 },

    #[error("Database lock poisoned")]
    LockPoisoned,
}
