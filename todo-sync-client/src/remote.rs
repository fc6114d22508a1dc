//! Read-only source of the bootstrap batch.
//!
//! The remote endpoint is consulted at most once per install: its only job is
//! to seed an empty local store. Transport timeouts are whatever the underlying
//! HTTP client applies; nothing here retries.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use todo_sync_core::{
    models::{self, Task, TaskListResponse},
    FetchError,
};

pub trait RemoteSource: Send + Sync {
    /// Fetch the full task batch, in the order the endpoint lists it.
    fn fetch_tasks(&self) -> impl Future<Output = Result<Vec<Task>, FetchError>> + Send;
}

impl<T: RemoteSource> RemoteSource for Arc<T> {
    fn fetch_tasks(&self) -> impl Future<Output = Result<Vec<Task>, FetchError>> + Send {
        (**self).fetch_tasks()
    }
}

/// Fetches tasks from a fixed HTTP endpoint.
pub struct HttpRemoteSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRemoteSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Same as [`HttpRemoteSource::new`], with a whole-request timeout on the transport.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RemoteSource for HttpRemoteSource {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, FetchError> {
        tracing::info!("REMOTE: Fetching tasks from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("REMOTE: {} responded with {}", self.endpoint, status);
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        decode_tasks(&body)
    }
}

/// Decode a response body, stamping every record with the current time.
pub fn decode_tasks(body: &[u8]) -> Result<Vec<Task>, FetchError> {
    let response: TaskListResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    tracing::info!(
        "REMOTE: Decoded {} tasks (total={}, skip={}, limit={})",
        response.todos.len(),
        response.total,
        response.skip,
        response.limit
    );

    Ok(response.into_tasks(models::now()))
}

/// Remote source answering every fetch with the same canned result.
///
/// Counts how often it was asked, which makes it handy for offline runs and tests.
pub struct StaticRemoteSource {
    result: Result<Vec<Task>, FetchError>,
    calls: AtomicUsize,
}

impl StaticRemoteSource {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            result: Ok(tasks),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_error(error: FetchError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RemoteSource for StaticRemoteSource {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
