use crate::models::TaskId;
use thiserror::Error;

/// Failure while fetching the bootstrap batch from the remote endpoint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Server responded with HTTP {0}")]
    HttpStatus(u16),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Failure reported by the local task store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Task {0} already exists")]
    DuplicateKey(TaskId),

    #[error("Task {0} not found")]
    NotFound(TaskId),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Persistence(err.to_string())
    }
}

impl From<chrono::ParseError> for StoreError {
    fn from(err: chrono::ParseError) -> Self {
        StoreError::CorruptRecord(err.to_string())
    }
}

/// Initial load failed and there is no local data to fall back on.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to fetch tasks: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to persist tasks: {0}")]
    Persistence(#[from] StoreError),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Index {index} out of range for {len} visible tasks")]
pub struct IndexError {
    pub index: usize,
    pub len: usize,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Unknown task: {0}")]
    UnknownTask(TaskId),

    #[error("No task identifiers left to allocate")]
    IdentifiersExhausted,

    #[error("Failed to acquire lock: {0}")]
    LockError(String),

    #[error("Thread safety violation: process_events() must be called on the registration thread")]
    ThreadSafetyViolation,

    #[error("No callbacks registered yet")]
    NoCallbacksRegistered,
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type ClientResult<T> = Result<T, ClientError>;
