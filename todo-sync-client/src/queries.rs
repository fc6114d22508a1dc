use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use todo_sync_core::{models::Task, StoreResult};

/// Type alias for task parameters tuple
pub type TaskParams = (
    i64,    // id
    String, // description
    bool,   // completed
    i64,    // user_id
    String, // created_at
);

/// SQL queries for the local task store
pub struct Queries;

impl Queries {
    /// Create the local schema. `seq` records insertion order so tasks sharing a
    /// creation timestamp keep the order they were written in.
    pub const SCHEMA: &'static str = r#"
        CREATE TABLE IF NOT EXISTS tasks (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id INTEGER NOT NULL UNIQUE,
            description TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at, seq);
    "#;

    pub const SCAN_TASKS: &'static str = r#"
        SELECT id, description, completed, user_id, created_at
        FROM tasks
        ORDER BY created_at ASC, seq ASC
    "#;

    pub const GET_TASK: &'static str = r#"
        SELECT id, description, completed, user_id, created_at
        FROM tasks
        WHERE id = ?1
    "#;

    pub const TASK_EXISTS: &'static str = "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1)";

    pub const INSERT_TASK: &'static str = r#"
        INSERT INTO tasks (id, description, completed, user_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
    "#;

    pub const UPDATE_TASK: &'static str = r#"
        UPDATE tasks
        SET description = ?2,
            completed = ?3,
            user_id = ?4,
            created_at = ?5
        WHERE id = ?1
    "#;

    pub const DELETE_TASK: &'static str = "DELETE FROM tasks WHERE id = ?1";

    pub const DELETE_ALL_TASKS: &'static str = "DELETE FROM tasks";

    pub const COUNT_TASKS: &'static str = "SELECT COUNT(*) FROM tasks";
}

/// Helper functions for common database operations
pub struct DbHelpers;

impl DbHelpers {
    /// Initialize the database schema
    pub async fn init_schema(pool: &SqlitePool) -> StoreResult<()> {
        sqlx::query(Queries::SCHEMA).execute(pool).await?;
        Ok(())
    }

    /// Parse a task from a database row
    pub fn parse_task(row: &SqliteRow) -> StoreResult<Task> {
        let created_at: String = row.try_get("created_at")?;
        let completed: i64 = row.try_get("completed")?;

        Ok(Task {
            id: row.try_get("id")?,
            description: row.try_get("description")?,
            completed: completed != 0,
            user_id: row.try_get("user_id")?,
            created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
        })
    }

    /// Prepare task values for database insertion
    pub fn task_to_params(task: &Task) -> TaskParams {
        (
            task.id,
            task.description.clone(),
            task.completed,
            task.user_id,
            Self::format_timestamp(&task.created_at),
        )
    }

    /// Fixed-width RFC 3339 so that text ordering matches time ordering.
    pub fn format_timestamp(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}
