//! On-disk persistent task queue, grounded on
//! `original_source/assembler_tools/huey_config.py`'s `SqliteHuey`: this
//! crate persists the queue in a SQLite database via `rusqlite` (bundled,
//! since the teacher carries no embedded-database dependency) rather than
//! shelling out to an external broker.
//!
//! One task type: `process_assembly(sample_id, sample_dir)`. Enqueueing is
//! non-blocking; a worker pool of separate OS processes (see
//! [`worker_pool::run_worker_pool`]) drains the queue. Status is also
//! readable by inspecting marker files in a sample's work directory, so a
//! caller never strictly needs to query the queue itself.

pub mod worker_pool;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

/// One queued unit of work: process one sample.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: i64,
    pub sample_id: String,
    pub sample_dir: PathBuf,
}

/// Default queue database path when `HUEY_DB_PATH` is unset.
pub const DEFAULT_DB_PATH: &str = "queue.sqlite3";

#[must_use]
pub fn default_db_path() -> PathBuf {
    std::env::var("HUEY_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH))
}

/// A persistent FIFO queue of [`Task`]s backed by a SQLite database.
pub struct TaskQueue {
    conn: Connection,
}

impl TaskQueue {
    /// Open (creating if necessary) the queue database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be created.
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sample_id TEXT NOT NULL,
                sample_dir TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'queued'
            );",
        )?;
        Ok(TaskQueue { conn })
    }

    /// Push a new `process_assembly` task onto the queue. Returns immediately;
    /// does not block on a worker picking it up.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn enqueue(&self, sample_id: &str, sample_dir: &Path) -> rusqlite::Result<i64> {
        self.conn.execute(
            "INSERT INTO tasks (sample_id, sample_dir, status) VALUES (?1, ?2, 'queued')",
            rusqlite::params![sample_id, sample_dir.to_string_lossy()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Atomically claim the oldest queued task, marking it `claimed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn claim_next(&self) -> rusqlite::Result<Option<Task>> {
        let row = self.conn.query_row(
            "SELECT id, sample_id, sample_dir FROM tasks WHERE status = 'queued' ORDER BY id LIMIT 1",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        );

        let (id, sample_id, sample_dir) = match row {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e),
        };

        self.conn
            .execute("UPDATE tasks SET status = 'claimed' WHERE id = ?1", [id])?;

        Ok(Some(Task {
            id,
            sample_id,
            sample_dir: PathBuf::from(sample_dir),
        }))
    }

    /// Mark a claimed task as completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn mark_done(&self, id: i64) -> rusqlite::Result<()> {
        self.conn
            .execute("UPDATE tasks SET status = 'done' WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Mark a claimed task as failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn mark_failed(&self, id: i64) -> rusqlite::Result<()> {
        self.conn
            .execute("UPDATE tasks SET status = 'failed' WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Count tasks by status, for `queue status` diagnostics.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn status_counts(&self) -> rusqlite::Result<Vec<(String, i64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM tasks GROUP BY status")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        rows.collect()
    }
}
