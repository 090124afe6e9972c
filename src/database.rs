use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::PathBuf;
use thiserror::Error;

use crate::filters::{self, Filter};
use crate::models::Task;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        // Open or create the database
        let conn = Connection::open(&db_path)?;

        let db = Database { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Initialize the database schema (table and indexes)
    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                description     TEXT NOT NULL,
                important       INTEGER NOT NULL DEFAULT 0,
                private         INTEGER NOT NULL DEFAULT 0,
                deadline        TEXT,
                project         TEXT
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_deadline ON tasks(deadline)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project)",
            [],
        )?;

        Ok(())
    }

    /// Helper function to map a row to a Task
    fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
        let deadline: Option<String> = row.get(4)?;
        let deadline = deadline
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            4,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })
            })
            .transpose()?;

        Ok(Task {
            id: Some(row.get(0)?),
            description: row.get(1)?,
            important: row.get::<_, i64>(2)? != 0,
            private: row.get::<_, i64>(3)? != 0,
            deadline,
            project: row.get(5)?,
        })
    }

    fn deadline_to_text(task: &Task) -> Option<String> {
        task.deadline
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    /// Insert a task into the database and return its ID
    pub fn insert_task(&self, task: &Task) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO tasks (description, important, private, deadline, project)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                task.description,
                if task.important { 1 } else { 0 },
                if task.private { 1 } else { 0 },
                Self::deadline_to_text(task),
                task.project
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get all tasks ordered by id, optionally narrowed by a named filter.
    ///
    /// Flag and project filters run in SQL; the deadline windows reuse the
    /// filter engine over rows that carry a deadline. `None` returns everything.
    pub fn get_tasks(&self, filter: Option<&Filter>) -> Result<Vec<Task>, DatabaseError> {
        match filter {
            None => self.select_tasks(
                "SELECT id, description, important, private, deadline, project
                 FROM tasks ORDER BY id ASC",
            ),
            Some(Filter::Important) => self.select_tasks(
                "SELECT id, description, important, private, deadline, project
                 FROM tasks WHERE important = 1 ORDER BY id ASC",
            ),
            Some(Filter::Private) => self.select_tasks(
                "SELECT id, description, important, private, deadline, project
                 FROM tasks WHERE private = 1 ORDER BY id ASC",
            ),
            Some(Filter::Shared) => self.select_tasks(
                "SELECT id, description, important, private, deadline, project
                 FROM tasks WHERE private = 0 ORDER BY id ASC",
            ),
            Some(Filter::Project(name)) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, description, important, private, deadline, project
                     FROM tasks WHERE project = ?1 ORDER BY id ASC",
                )?;
                let tasks = stmt
                    .query_map(rusqlite::params![name], Self::row_to_task)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(tasks)
            }
            Some(window @ (Filter::Today | Filter::NextWeek)) => {
                let candidates = self.select_tasks(
                    "SELECT id, description, important, private, deadline, project
                     FROM tasks WHERE deadline IS NOT NULL ORDER BY id ASC",
                )?;
                Ok(filters::apply(&candidates, window, Utc::now()))
            }
        }
    }

    fn select_tasks(&self, sql: &str) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(sql)?;
        let tasks = stmt
            .query_map([], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Get a single task by ID. `None` means the id does not exist;
    /// callers distinguish that from a real store error.
    pub fn get_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, description, important, private, deadline, project
             FROM tasks WHERE id = ?1",
        )?;

        match stmt.query_row(rusqlite::params![id], Self::row_to_task) {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::from(e)),
        }
    }

    /// Replace the fields of an existing task. Returns false if the id
    /// does not exist. The id itself is never changed.
    pub fn update_task(&self, id: i64, task: &Task) -> Result<bool, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE tasks SET description = ?1, important = ?2, private = ?3,
             deadline = ?4, project = ?5 WHERE id = ?6",
            rusqlite::params![
                task.description,
                if task.important { 1 } else { 0 },
                if task.private { 1 } else { 0 },
                Self::deadline_to_text(task),
                task.project,
                id
            ],
        )?;
        tx.commit()?;
        Ok(changed > 0)
    }

    /// Delete a task by ID. Returns false if the id does not exist.
    pub fn delete_task(&self, id: i64) -> Result<bool, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute("DELETE FROM tasks WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(changed > 0)
    }
}
