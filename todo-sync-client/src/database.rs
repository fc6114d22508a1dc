use crate::queries::{DbHelpers, Queries};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqliteConnection, SqlitePool,
};
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use todo_sync_core::{
    models::{Task, TaskId},
    StoreError, StoreResult,
};
use tokio::sync::Mutex;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Durable task storage backed by SQLite.
///
/// Writes are serialized through a fair lock taken at submission time, so they
/// commit in the order they were requested. Each write runs on its own spawned
/// task: a caller that stops waiting does not abort a write already submitted.
/// Readers only ever observe committed state.
#[derive(Clone)]
pub struct TaskStore {
    pub pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl TaskStore {
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        Self::with_max_connections(database_url, DEFAULT_MAX_CONNECTIONS).await
    }

    pub async fn with_max_connections(
        database_url: &str,
        max_connections: u32,
    ) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        DbHelpers::init_schema(&pool).await?;
        tracing::info!("STORE: Opened task store at {}", database_url);

        Ok(Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Discard every stored task and write `tasks` in their place, atomically.
    pub async fn replace_all(&self, tasks: &[Task]) -> StoreResult<()> {
        let tasks = tasks.to_vec();
        let count = tasks.len();

        self.run_write(move |pool| async move {
            let mut tx = pool.begin().await?;

            sqlx::query(Queries::DELETE_ALL_TASKS)
                .execute(&mut *tx)
                .await?;

            for task in &tasks {
                Self::insert_row(&mut *tx, task).await?;
            }

            tx.commit().await?;
            Ok(())
        })
        .await?;

        tracing::info!("STORE: Replaced all tasks with {} records", count);
        Ok(())
    }

    /// Add one task. Fails with `DuplicateKey` if its id is already stored.
    pub async fn insert(&self, task: &Task) -> StoreResult<()> {
        let task = task.clone();
        let id = task.id;

        self.run_write(move |pool| async move {
            let mut conn = pool.acquire().await?;
            Self::insert_row(&mut *conn, &task).await
        })
        .await?;

        tracing::debug!("STORE: Inserted task {}", id);
        Ok(())
    }

    /// Replace the stored record carrying `task.id`.
    pub async fn update(&self, task: &Task) -> StoreResult<()> {
        let (id, description, completed, user_id, created_at) = DbHelpers::task_to_params(task);

        let result = self
            .run_write(move |pool| async move {
                Ok(sqlx::query(Queries::UPDATE_TASK)
                    .bind(id)
                    .bind(description)
                    .bind(completed)
                    .bind(user_id)
                    .bind(created_at)
                    .execute(&pool)
                    .await?)
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        tracing::debug!("STORE: Updated task {}", id);
        Ok(())
    }

    pub async fn delete(&self, id: TaskId) -> StoreResult<()> {
        let result = self
            .run_write(move |pool| async move {
                Ok(sqlx::query(Queries::DELETE_TASK)
                    .bind(id)
                    .execute(&pool)
                    .await?)
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        tracing::debug!("STORE: Deleted task {}", id);
        Ok(())
    }

    /// Every stored task, oldest first. Ties keep write order.
    pub async fn scan_all(&self) -> StoreResult<Vec<Task>> {
        let rows = sqlx::query(Queries::SCAN_TASKS)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(DbHelpers::parse_task).collect()
    }

    pub async fn get(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let row = sqlx::query(Queries::GET_TASK)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(DbHelpers::parse_task).transpose()
    }

    pub async fn contains(&self, id: TaskId) -> StoreResult<bool> {
        let exists: i64 = sqlx::query_scalar(Queries::TASK_EXISTS)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists != 0)
    }

    pub async fn count(&self) -> StoreResult<usize> {
        let count: i64 = sqlx::query_scalar(Queries::COUNT_TASKS)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    /// Remove every task. The next load will bootstrap from the remote source.
    pub async fn clear(&self) -> StoreResult<u64> {
        let result = self
            .run_write(|pool| async move {
                Ok(sqlx::query(Queries::DELETE_ALL_TASKS)
                    .execute(&pool)
                    .await?)
            })
            .await?;

        tracing::info!("STORE: Cleared {} tasks", result.rows_affected());
        Ok(result.rows_affected())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn insert_row(conn: &mut SqliteConnection, task: &Task) -> StoreResult<()> {
        let (id, description, completed, user_id, created_at) = DbHelpers::task_to_params(task);

        sqlx::query(Queries::INSERT_TASK)
            .bind(id)
            .bind(description)
            .bind(completed)
            .bind(user_id)
            .bind(created_at)
            .execute(conn)
            .await
            .map_err(|err| match &err {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::DuplicateKey(id)
                }
                _ => StoreError::from(err),
            })?;

        Ok(())
    }

    async fn run_write<T, F, Fut>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(SqlitePool) -> Fut + Send + 'static,
        Fut: Future<Output = StoreResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.write_lock.clone().lock_owned().await;
        let pool = self.pool.clone();

        let handle = tokio::spawn(async move {
            let _guard = guard;
            op(pool).await
        });

        handle
            .await
            .map_err(|e| StoreError::Persistence(format!("write task failed: {e}")))?
    }
}
