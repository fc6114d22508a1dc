use crate::{
    cache::TaskListCache,
    config::ClientConfig,
    database::TaskStore,
    events::EventDispatcher,
    mutations::{MutationOutcome, MutationPipeline},
    remote::{HttpRemoteSource, RemoteSource},
    sync::SyncCoordinator,
};
use std::sync::Arc;
use todo_sync_core::{
    format_task_count,
    models::{Task, TaskId},
    ClientError, ClientResult, SyncError, ViewUpdate,
};

/// Everything the presentation layer talks to.
///
/// Owns the working set, so it must be driven from a single task. Store and
/// remote calls are awaited in place; view signals are queued on the event
/// dispatcher for the presentation thread to pick up.
pub struct TaskListClient<R> {
    store: Arc<TaskStore>,
    coordinator: SyncCoordinator<R>,
    pipeline: MutationPipeline,
    cache: TaskListCache,
    event_dispatcher: Arc<EventDispatcher>,
}

impl TaskListClient<HttpRemoteSource> {
    /// Open the store named in `config` and bootstrap from its HTTP endpoint.
    pub async fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let store =
            TaskStore::with_max_connections(&config.database_url, config.max_connections).await?;

        let remote = match config.request_timeout {
            Some(timeout) => HttpRemoteSource::with_timeout(&config.endpoint, timeout)
                .map_err(SyncError::from)?,
            None => HttpRemoteSource::new(&config.endpoint),
        };

        Ok(Self::new(Arc::new(store), remote, config))
    }
}

impl<R: RemoteSource> TaskListClient<R> {
    pub fn new(store: Arc<TaskStore>, remote: R, config: &ClientConfig) -> Self {
        Self {
            coordinator: SyncCoordinator::new(store.clone(), remote),
            pipeline: MutationPipeline::new(store.clone(), config.default_owner),
            cache: TaskListCache::with_id_floor(config.id_floor),
            event_dispatcher: Arc::new(EventDispatcher::new()),
            store,
        }
    }

    pub fn event_dispatcher(&self) -> Arc<EventDispatcher> {
        self.event_dispatcher.clone()
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    /// Populate the working set, from the local store or the one-time bootstrap.
    pub async fn load(&mut self) -> ClientResult<usize> {
        match self.coordinator.load().await {
            Ok(tasks) => {
                self.cache.initialize(tasks);
                self.event_dispatcher.emit_update(ViewUpdate::ListChanged);
                tracing::info!("CLIENT: Loaded {} tasks", self.cache.len());
                Ok(self.cache.len())
            }
            Err(e) => {
                tracing::error!("CLIENT: Load failed: {}", e);
                self.event_dispatcher.emit_load_failed(e.to_string());
                Err(e.into())
            }
        }
    }

    pub fn visible_count(&self) -> usize {
        self.cache.visible_count()
    }

    pub fn visible_task_at(&self, index: usize) -> Option<&Task> {
        self.cache.visible_task_at(index)
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.cache.visible()
    }

    /// Current version of a task, for the edit screen.
    pub fn task_by_id(&self, id: TaskId) -> Option<&Task> {
        self.cache.task(id)
    }

    pub fn search_text(&self) -> &str {
        self.cache.search_text()
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.cache.set_search_text(text);
        self.event_dispatcher.emit_update(ViewUpdate::ListChanged);
    }

    pub fn task_count_label(&self) -> String {
        format_task_count(self.visible_count())
    }

    pub fn share_text(&self, index: usize) -> Option<String> {
        self.visible_task_at(index).map(Task::share_text)
    }

    pub async fn toggle_completion(&mut self, index: usize) -> ClientResult<MutationOutcome> {
        let result = self
            .pipeline
            .toggle_completion(&mut self.cache, index)
            .await;
        self.publish("toggle", result)
    }

    pub async fn delete(&mut self, index: usize) -> ClientResult<MutationOutcome> {
        let result = self.pipeline.delete(&mut self.cache, index).await;
        self.publish("delete", result)
    }

    pub async fn create(&mut self, description: &str) -> ClientResult<MutationOutcome> {
        let result = self.pipeline.create(&mut self.cache, description).await;
        self.publish("create", result)
    }

    pub async fn update_description(
        &mut self,
        id: TaskId,
        text: &str,
    ) -> ClientResult<MutationOutcome> {
        let result = self
            .pipeline
            .update_description(&mut self.cache, id, text)
            .await;
        self.publish("update", result)
    }

    /// Wipe local data. The next `load()` bootstraps from the remote source again.
    pub async fn clear_local_data(&mut self) -> ClientResult<u64> {
        let removed = self.store.clear().await?;
        self.cache.initialize(Vec::new());
        self.event_dispatcher.emit_update(ViewUpdate::ListChanged);
        Ok(removed)
    }

    fn publish(
        &self,
        operation: &str,
        result: ClientResult<MutationOutcome>,
    ) -> ClientResult<MutationOutcome> {
        match result {
            Ok(outcome) => {
                self.event_dispatcher.emit_update(outcome.update);
                Ok(outcome)
            }
            Err(ClientError::Index(e)) => {
                tracing::debug!("CLIENT: Ignoring {} at stale index: {}", operation, e);
                Err(ClientError::Index(e))
            }
            Err(e) => {
                tracing::warn!("CLIENT: {} failed: {}", operation, e);
                Err(e)
            }
        }
    }
}
