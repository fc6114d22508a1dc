mod common;

use common::{make_task, make_task_at, make_timeline, setup_test_store};
use todo_sync_client::TaskStore;
use todo_sync_core::{models, StoreError, Task, TaskId};

#[tokio::test]
async fn test_scan_orders_by_creation_time() {
    let store = setup_test_store().await;
    let timeline = make_timeline(&[(10, "oldest"), (4, "middle"), (7, "newest")]);

    // Insert out of chronological order.
    store.insert(&timeline[2]).await.unwrap();
    store.insert(&timeline[0]).await.unwrap();
    store.insert(&timeline[1]).await.unwrap();

    let ids: Vec<i64> = store.scan_all().await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![10, 4, 7]);
}

#[tokio::test]
async fn test_equal_timestamps_keep_batch_order() {
    let store = setup_test_store().await;
    let at = models::now();
    let batch = vec![
        make_task_at(5, "five", at),
        make_task_at(2, "two", at),
        make_task_at(9, "nine", at),
    ];

    store.replace_all(&batch).await.unwrap();

    let scanned = store.scan_all().await.unwrap();
    assert_eq!(scanned, batch);
}

#[tokio::test]
async fn test_insert_duplicate_fails() {
    let store = setup_test_store().await;
    store.insert(&make_task(1, "original")).await.unwrap();

    let err = store.insert(&make_task(1, "impostor")).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey(1)));

    let stored = store.get(1).await.unwrap().unwrap();
    assert_eq!(stored.description, "original");
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_update_replaces_whole_record() {
    let store = setup_test_store().await;
    let task = make_task(3, "draft");
    store.insert(&task).await.unwrap();

    let edited = task.with_description("final").toggled();
    store.update(&edited).await.unwrap();

    assert_eq!(store.get(3).await.unwrap(), Some(edited));
}

#[tokio::test]
async fn test_update_and_delete_missing_fail() {
    let store = setup_test_store().await;

    let err = store.update(&make_task(42, "ghost")).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(42)));

    let err = store.delete(42).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(42)));
}

#[tokio::test]
async fn test_delete_removes_record() {
    let store = setup_test_store().await;
    store.insert(&make_task(1, "keep")).await.unwrap();
    store.insert(&make_task(2, "drop")).await.unwrap();

    store.delete(2).await.unwrap();

    assert!(store.contains(1).await.unwrap());
    assert!(!store.contains(2).await.unwrap());
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_replace_all_discards_existing() {
    let store = setup_test_store().await;
    store.insert(&make_task(1, "old")).await.unwrap();

    let fresh = make_timeline(&[(100, "a"), (101, "b")]);
    store.replace_all(&fresh).await.unwrap();

    assert_eq!(store.scan_all().await.unwrap(), fresh);
}

#[tokio::test]
async fn test_failed_replace_all_leaves_store_untouched() {
    let store = setup_test_store().await;
    let existing = make_timeline(&[(1, "existing")]);
    store.replace_all(&existing).await.unwrap();

    let broken = vec![make_task(7, "first"), make_task(7, "again")];
    let err = store.replace_all(&broken).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey(7)));

    assert_eq!(store.scan_all().await.unwrap(), existing);
}

#[tokio::test]
async fn test_concurrent_writes_all_commit() {
    let store = setup_test_store().await;

    let handles: Vec<_> = (1..=20)
        .map(|id| {
            let store = store.clone();
            tokio::spawn(async move { store.insert(&make_task(id, "parallel")).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.count().await.unwrap(), 20);
}

#[tokio::test]
async fn test_writes_apply_in_submission_order() {
    let store = setup_test_store().await;
    let task = make_task(1, "draft");
    let edited = task.with_description("edited");

    // The update is queued behind the insert it depends on.
    let (inserted, updated) = tokio::join!(store.insert(&task), store.update(&edited));
    inserted.unwrap();
    updated.unwrap();
    assert_eq!(store.get(1).await.unwrap(), Some(edited.clone()));

    let (updated, deleted) = tokio::join!(store.update(&task), store.delete(1));
    updated.unwrap();
    deleted.unwrap();
    assert!(store.get(1).await.unwrap().is_none());

    store.insert(&task).await.unwrap();
    let (deleted, updated) = tokio::join!(store.delete(1), store.update(&edited));
    deleted.unwrap();
    assert!(matches!(updated, Err(StoreError::NotFound(1))));
    assert!(store.get(1).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_scan_never_observes_partial_replace() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("tasks.db").display());
    let store = TaskStore::new(&url).await.unwrap();

    let ids = |tasks: &[Task]| tasks.iter().map(|t| t.id).collect::<Vec<TaskId>>();
    let old: Vec<Task> = (1..=50).map(|id| make_task(id, "old")).collect();
    let new: Vec<Task> = (1001..=3000).map(|id| make_task(id, "new")).collect();
    let (old_ids, new_ids) = (ids(&old), ids(&new));
    store.replace_all(&old).await.unwrap();

    let writer = {
        let store = store.clone();
        tokio::spawn(async move { store.replace_all(&new).await })
    };

    let mut snapshots = Vec::new();
    while !writer.is_finished() {
        snapshots.push(ids(&store.scan_all().await.unwrap()));
    }
    writer.await.unwrap().unwrap();
    snapshots.push(ids(&store.scan_all().await.unwrap()));

    for snapshot in &snapshots {
        assert!(
            *snapshot == old_ids || *snapshot == new_ids,
            "scan returned a mixed set of {} tasks",
            snapshot.len()
        );
    }
    assert_eq!(snapshots.last(), Some(&new_ids));
}

#[tokio::test]
async fn test_clear_empties_store() {
    let store = setup_test_store().await;
    store
        .replace_all(&make_timeline(&[(1, "a"), (2, "b"), (3, "c")]))
        .await
        .unwrap();

    assert_eq!(store.clear().await.unwrap(), 3);
    assert!(store.scan_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_writes_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("tasks.db").display());

    let tasks = make_timeline(&[(1, "persisted"), (2, "also persisted")]);
    {
        let store = TaskStore::new(&url).await.unwrap();
        store.replace_all(&tasks).await.unwrap();
        store.delete(2).await.unwrap();
        store.close().await;
    }

    let reopened = TaskStore::new(&url).await.unwrap();
    assert_eq!(reopened.scan_all().await.unwrap(), vec![tasks[0].clone()]);
}

#[tokio::test]
async fn test_closed_store_reports_persistence_error() {
    let store = setup_test_store().await;
    store.close().await;

    let err = store.insert(&make_task(1, "late")).await.unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
}
