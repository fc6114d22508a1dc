//! todo-sync: a local-first task list
//!
//! Tasks live in a local SQLite store. The remote endpoint is only consulted
//! once, to seed an empty store; after that every read and write is local.
//!
//! # Example
//!
//! ```ignore
//! use todo_sync::{ClientConfig, TaskListClient};
//!
//! let mut client = TaskListClient::from_config(&ClientConfig::from_env()).await?;
//! client.load().await?;
//! client.create("Water the plants").await?;
//! ```

// Re-export client types
pub use todo_sync_client::{
    ClientConfig, EventDispatcher, HttpRemoteSource, MutationOutcome, RemoteSource,
    StaticRemoteSource, TaskListClient, TaskStore,
};

// Re-export core types that presentation layers need
pub use todo_sync_core::errors::{
    ClientError, FetchError, IndexError, StoreError, SyncError,
};
pub use todo_sync_core::models::{Task, TaskId};
pub use todo_sync_core::view::{format_task_count, ListEvent, ViewUpdate};
pub use todo_sync_core::ClientResult;
