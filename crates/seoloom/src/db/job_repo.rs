//! Row-level access to the `jobs` table.
//!
//! Every function takes a bare connection, so the store decides whether a
//! call runs under [`Database::with_conn`](super::Database::with_conn) or
//! inside a transaction.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::DatabaseError;

const COLUMNS: &str = "id, topic, target_word_count, language, status, current_stage, \
                       stage_outputs, error, attempts, created_at, updated_at, completed_at";

/// A job exactly as stored: enums as their snake_case names, stage outputs as
/// a JSON object and timestamps as RFC 3339 text.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub id: String,
    pub topic: String,
    pub target_word_count: i64,
    pub language: String,
    pub status: String,
    pub current_stage: String,
    pub stage_outputs: String,
    pub error: Option<String>,
    pub attempts: i64,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

impl JobRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            topic: row.get(1)?,
            target_word_count: row.get(2)?,
            language: row.get(3)?,
            status: row.get(4)?,
            current_stage: row.get(5)?,
            stage_outputs: row.get(6)?,
            error: row.get(7)?,
            attempts: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
            completed_at: row.get(11)?,
        })
    }
}

pub fn insert(conn: &Connection, job: &JobRow) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO jobs ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            COLUMNS
        ),
        params![
            job.id,
            job.topic,
            job.target_word_count,
            job.language,
            job.status,
            job.current_stage,
            job.stage_outputs,
            job.error,
            job.attempts,
            job.created_at,
            job.updated_at,
            job.completed_at,
        ],
    )?;
    Ok(())
}

pub fn find(conn: &Connection, id: &str) -> Result<Option<JobRow>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM jobs WHERE id = ?1", COLUMNS),
            params![id],
            JobRow::read,
        )
        .optional()?;
    Ok(row)
}

/// Writes the lifecycle columns of `job`. The request columns and
/// `created_at` are fixed at insert and left alone.
///
/// Returns `false` when no row has that id.
pub fn update(conn: &Connection, job: &JobRow) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE jobs
         SET status = ?2, current_stage = ?3, stage_outputs = ?4, error = ?5,
             attempts = ?6, updated_at = ?7, completed_at = ?8
         WHERE id = ?1",
        params![
            job.id,
            job.status,
            job.current_stage,
            job.stage_outputs,
            job.error,
            job.attempts,
            job.updated_at,
            job.completed_at,
        ],
    )?;
    Ok(changed == 1)
}

/// Newest first, optionally only one status. Rows sharing a `created_at`
/// come back in reverse insertion order.
pub fn list(
    conn: &Connection,
    status: Option<&str>,
    limit: Option<u64>,
) -> Result<Vec<JobRow>, DatabaseError> {
    let limit = limit.and_then(|l| i64::try_from(l).ok()).unwrap_or(-1);
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM jobs
         WHERE ?1 IS NULL OR status = ?1
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?2",
        COLUMNS
    ))?;
    let rows = stmt
        .query_map(params![status, limit], JobRow::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Returns `false` when no row has that id.
pub fn delete(conn: &Connection, id: &str) -> Result<bool, DatabaseError> {
    let changed = conn.execute("DELETE FROM jobs WHERE id = ?1", params![id])?;
    Ok(changed == 1)
}
