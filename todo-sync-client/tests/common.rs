use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};
use todo_sync_client::{ClientConfig, StaticRemoteSource, TaskListClient, TaskStore};
use todo_sync_core::{
    models::{self, Task, TaskId, DEFAULT_OWNER},
    ListEvent,
};

pub type TestClient = TaskListClient<Arc<StaticRemoteSource>>;

/// Creates a fresh in-memory task store with its schema in place.
#[allow(dead_code)]
pub async fn setup_test_store() -> Arc<TaskStore> {
    Arc::new(TaskStore::new("sqlite::memory:").await.unwrap())
}

#[allow(dead_code)]
pub fn make_task(id: TaskId, description: &str) -> Task {
    Task::new(id, description, DEFAULT_OWNER)
}

#[allow(dead_code)]
pub fn make_task_at(id: TaskId, description: &str, created_at: DateTime<Utc>) -> Task {
    Task {
        created_at,
        ..make_task(id, description)
    }
}

/// Tasks created one second apart, in the order given.
#[allow(dead_code)]
pub fn make_timeline(entries: &[(TaskId, &str)]) -> Vec<Task> {
    let start = models::now() - Duration::hours(1);
    entries
        .iter()
        .enumerate()
        .map(|(offset, (id, description))| {
            make_task_at(*id, description, start + Duration::seconds(offset as i64))
        })
        .collect()
}

/// A client whose store has been bootstrapped with `tasks` and loaded.
#[allow(dead_code)]
pub async fn setup_loaded_client(tasks: Vec<Task>) -> (TestClient, Arc<StaticRemoteSource>) {
    let store = setup_test_store().await;
    let remote = Arc::new(StaticRemoteSource::with_tasks(tasks));
    let mut client = TaskListClient::new(store, remote.clone(), &ClientConfig::default());
    client.load().await.unwrap();
    (client, remote)
}

/// Registers a callback that records every event delivered from now on.
///
/// Events already queued (such as the one from the initial load) are flushed
/// and discarded.
#[allow(dead_code)]
pub fn record_events(client: &TestClient) -> Arc<Mutex<Vec<ListEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let dispatcher = client.event_dispatcher();
    dispatcher
        .register_callback(move |event| sink.lock().unwrap().push(event.clone()))
        .unwrap();
    dispatcher.process_events().unwrap();
    seen.lock().unwrap().clear();
    seen
}

/// Delivers queued events and returns everything recorded so far, clearing the record.
#[allow(dead_code)]
pub fn drain_events(client: &TestClient, seen: &Arc<Mutex<Vec<ListEvent>>>) -> Vec<ListEvent> {
    client.event_dispatcher().process_events().unwrap();
    std::mem::take(&mut *seen.lock().unwrap())
}
