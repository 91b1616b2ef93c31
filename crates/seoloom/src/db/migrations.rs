//! Schema versioning.
//!
//! The applied version lives in SQLite's `user_version` header field. Each
//! pending step runs in its own transaction together with the version bump,
//! so an interrupted upgrade leaves the file at the last completed step.

use rusqlite::Connection;

use super::error::DatabaseError;

struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[
    Step {
        version: 1,
        name: "jobs table",
        sql: include_str!("sql/001_create_jobs.sql"),
    },
    Step {
        version: 2,
        name: "jobs listing indexes",
        sql: include_str!("sql/002_create_job_indexes.sql"),
    },
];

/// Version a fully migrated file reports.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

pub fn schema_version(conn: &Connection) -> Result<u32, DatabaseError> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings the schema up to [`latest_version`].
///
/// A file written by a newer seoloom is refused rather than modified.
pub fn migrate(conn: &Connection) -> Result<(), DatabaseError> {
    apply(conn, STEPS)
}

fn apply(conn: &Connection, steps: &[Step]) -> Result<(), DatabaseError> {
    let found = schema_version(conn)?;
    let supported = steps.last().map_or(0, |step| step.version);
    if found > supported {
        return Err(DatabaseError::SchemaTooNew { found, supported });
    }

    for step in steps.iter().filter(|step| step.version > found) {
        log::info!("Applying schema v{} ({})", step.version, step.name);
        let failed = |e: rusqlite::Error| DatabaseError::Migration {
            version: step.version,
            reason: e.to_string(),
        };

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(step.sql).map_err(failed)?;
        tx.pragma_update(None, "user_version", step.version)
            .map_err(failed)?;
        tx.commit()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("SELECT name FROM pragma_table_info('{}')", table))
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_fresh_file_reaches_latest_version() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);

        migrate(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
        assert_eq!(latest_version(), 2);
    }

    #[test]
    fn test_migrate_twice_is_a_no_op() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn test_jobs_table_carries_lifecycle_columns() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let cols = columns(&conn, "jobs");
        for column in [
            "stage_outputs",
            "current_stage",
            "error",
            "attempts",
            "completed_at",
        ] {
            assert!(cols.iter().any(|c| c == column), "missing {}", column);
        }
    }

    #[test]
    fn test_newer_file_is_refused() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", 99).unwrap();

        let err = migrate(&conn).unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::SchemaTooNew {
                found: 99,
                supported: 2
            }
        ));
    }

    #[test]
    fn test_failed_step_keeps_previous_version() {
        let conn = Connection::open_in_memory().unwrap();
        let steps = [
            Step {
                version: 1,
                name: "ok",
                sql: "CREATE TABLE a (id INTEGER);",
            },
            Step {
                version: 2,
                name: "broken",
                sql: "CREATE TABLE b (id INTEGER); CREATE TABLE a (id INTEGER);",
            },
        ];

        let err = apply(&conn, &steps).unwrap_err();
        assert!(matches!(err, DatabaseError::Migration { version: 2, .. }));
        assert_eq!(schema_version(&conn).unwrap(), 1);
        assert!(columns(&conn, "b").is_empty());
    }
}
