use crate::{cache::TaskListCache, database::TaskStore};
use std::sync::Arc;
use todo_sync_core::{
    models::{Task, TaskId},
    ClientError, ClientResult, IndexError, ViewUpdate,
};

/// Result of a mutation that reached both the store and the working set.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub task: Task,
    pub update: ViewUpdate,
}

/// Applies user edits: store first, then the working set, then a view signal.
///
/// A failed store write leaves the working set untouched, so nothing has to be
/// rolled back. Each method borrows the cache mutably for its whole duration,
/// which keeps the working set single-writer.
pub struct MutationPipeline {
    store: Arc<TaskStore>,
    default_owner: i64,
}

impl MutationPipeline {
    pub fn new(store: Arc<TaskStore>, default_owner: i64) -> Self {
        Self {
            store,
            default_owner,
        }
    }

    pub async fn toggle_completion(
        &self,
        cache: &mut TaskListCache,
        index: usize,
    ) -> ClientResult<MutationOutcome> {
        let updated = visible_at(cache, index)?.toggled();

        self.store.update(&updated).await?;
        cache.apply_replace(updated.clone());

        // Re-locate by id in the recomputed view instead of trusting `index`.
        let update = match cache.visible_index_of(updated.id) {
            Some(position) => ViewUpdate::CellChanged(position),
            None => ViewUpdate::ListChanged,
        };

        tracing::info!(
            "MUTATION: Task {} marked {}",
            updated.id,
            if updated.completed { "done" } else { "open" }
        );

        Ok(MutationOutcome {
            task: updated,
            update,
        })
    }

    pub async fn delete(
        &self,
        cache: &mut TaskListCache,
        index: usize,
    ) -> ClientResult<MutationOutcome> {
        let id = visible_at(cache, index)?.id;

        self.store.delete(id).await?;
        let removed = cache.apply_remove(id).ok_or(ClientError::UnknownTask(id))?;

        tracing::info!("MUTATION: Deleted task {}", id);

        Ok(MutationOutcome {
            task: removed,
            update: ViewUpdate::CellRemoved(index),
        })
    }

    pub async fn create(
        &self,
        cache: &mut TaskListCache,
        description: &str,
    ) -> ClientResult<MutationOutcome> {
        let description = validate_description(description)?;
        let id = cache
            .allocate_identifier()
            .ok_or(ClientError::IdentifiersExhausted)?;
        let task = Task::new(id, description, self.default_owner);

        self.store.insert(&task).await?;
        cache.apply_insert_at_front(task.clone());

        // A new task that does not match the active search is not on screen.
        let update = match cache.visible_index_of(task.id) {
            Some(0) => ViewUpdate::CellInserted(0),
            _ => ViewUpdate::ListChanged,
        };

        tracing::info!("MUTATION: Created task {}", task.id);

        Ok(MutationOutcome { task, update })
    }

    pub async fn update_description(
        &self,
        cache: &mut TaskListCache,
        id: TaskId,
        text: &str,
    ) -> ClientResult<MutationOutcome> {
        let description = validate_description(text)?;
        let updated = cache
            .task(id)
            .ok_or(ClientError::UnknownTask(id))?
            .with_description(description);

        self.store.update(&updated).await?;
        cache.apply_replace(updated.clone());

        tracing::info!("MUTATION: Updated description of task {}", id);

        Ok(MutationOutcome {
            task: updated,
            update: ViewUpdate::ListChanged,
        })
    }
}

fn visible_at(cache: &TaskListCache, index: usize) -> Result<&Task, IndexError> {
    cache.visible_task_at(index).ok_or(IndexError {
        index,
        len: cache.visible_count(),
    })
}

fn validate_description(text: &str) -> ClientResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(
            "task description must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
