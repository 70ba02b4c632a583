//! SQLite storage for the task outputs of the latest kickoff.
//!
//! Every kickoff clears the table and records each task output with its
//! position and the inputs it ran with; `replay` reads them back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use crate::tasks::task_output::TaskOutput;
use crate::utilities::errors::ExecutionError;

/// Database file name inside the storage directory.
pub const KICKOFF_DB_FILE: &str = "latest_kickoff_task_outputs.db";

/// One stored task output.
#[derive(Debug, Clone, PartialEq)]
pub struct KickoffTaskOutput {
    pub task_id: String,
    pub expected_output: String,
    pub output: TaskOutput,
    pub task_index: usize,
    pub inputs: HashMap<String, String>,
    pub was_replayed: bool,
    pub timestamp: String,
}

/// SQLite storage for kickoff task outputs.
#[derive(Debug, Clone)]
pub struct KickoffTaskOutputsSQLiteStorage {
    db_path: PathBuf,
}

impl KickoffTaskOutputsSQLiteStorage {
    /// Open (and create if needed) the database at `db_path`.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self, ExecutionError> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ExecutionError::DataFile {
                    path: parent.to_path_buf(),
                    message: e.to_string(),
                })?;
            }
        }
        let storage = Self { db_path };
        storage.initialize_db()?;
        Ok(storage)
    }

    /// Open the database in `storage_dir`.
    pub fn in_dir(storage_dir: &Path) -> Result<Self, ExecutionError> {
        Self::new(storage_dir.join(KICKOFF_DB_FILE))
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn initialize_db(&self) -> Result<(), ExecutionError> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS latest_kickoff_task_outputs (
                task_id TEXT PRIMARY KEY,
                expected_output TEXT,
                output JSON,
                task_index INTEGER,
                inputs JSON,
                was_replayed BOOLEAN,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        Ok(())
    }

    /// Insert or replace the record of a task.
    pub fn add(
        &self,
        task_id: &str,
        expected_output: &str,
        output: &TaskOutput,
        task_index: usize,
        was_replayed: bool,
        inputs: &HashMap<String, String>,
    ) -> Result<(), ExecutionError> {
        let output_json = serde_json::to_string(output)?;
        let inputs_json = serde_json::to_string(inputs)?;

        let mut conn = Connection::open(&self.db_path)?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO latest_kickoff_task_outputs
             (task_id, expected_output, output, task_index, inputs, was_replayed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                task_id,
                expected_output,
                output_json,
                task_index as i64,
                inputs_json,
                was_replayed
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Load all records ordered by task index.
    pub fn load(&self) -> Result<Vec<KickoffTaskOutput>, ExecutionError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT task_id, expected_output, output, task_index, inputs, was_replayed, timestamp
             FROM latest_kickoff_task_outputs ORDER BY task_index",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, bool>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (task_id, expected_output, output, task_index, inputs, was_replayed, timestamp) =
                row?;
            results.push(KickoffTaskOutput {
                task_id,
                expected_output,
                output: serde_json::from_str(&output)?,
                task_index: usize::try_from(task_index).unwrap_or_default(),
                inputs: serde_json::from_str(&inputs)?,
                was_replayed,
                timestamp,
            });
        }
        Ok(results)
    }

    /// Delete all records.
    pub fn delete_all(&self) -> Result<(), ExecutionError> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute("DELETE FROM latest_kickoff_task_outputs", [])?;
        Ok(())
    }
}
