use crate::{database::TaskStore, remote::RemoteSource};
use std::sync::Arc;
use todo_sync_core::{models::Task, SyncError};

/// Decides where the session's tasks come from.
///
/// A populated local store always wins. The remote source is only asked when
/// the store is empty, and whatever it returns is persisted before it is handed
/// out. There is no refresh: once seeded, the remote is never consulted again
/// until local data is cleared.
pub struct SyncCoordinator<R> {
    store: Arc<TaskStore>,
    remote: R,
}

impl<R: RemoteSource> SyncCoordinator<R> {
    pub fn new(store: Arc<TaskStore>, remote: R) -> Self {
        Self { store, remote }
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    pub async fn load(&self) -> Result<Vec<Task>, SyncError> {
        let local = self.store.scan_all().await?;
        if !local.is_empty() {
            tracing::info!("SYNC: Serving {} tasks from local store", local.len());
            return Ok(local);
        }

        tracing::info!("SYNC: Local store is empty, bootstrapping from remote source");

        let fetched = self.remote.fetch_tasks().await.map_err(|e| {
            tracing::error!("SYNC: Bootstrap fetch failed: {}", e);
            e
        })?;

        self.store.replace_all(&fetched).await.map_err(|e| {
            tracing::error!("SYNC: Failed to persist {} fetched tasks: {}", fetched.len(), e);
            e
        })?;

        // Hand out what is now durable rather than what was fetched.
        let persisted = self.store.scan_all().await?;
        tracing::info!("SYNC: Bootstrapped {} tasks", persisted.len());

        Ok(persisted)
    }
}
