use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a task, unique within the local store.
pub type TaskId = i64;

/// Owner assigned to tasks created on this device.
pub const DEFAULT_OWNER: i64 = 1;

/// Current time at the precision the local store keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub completed: bool,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a fresh, not yet completed task stamped with the current time.
    pub fn new(id: TaskId, description: impl Into<String>, user_id: i64) -> Self {
        Self {
            id,
            description: description.into(),
            completed: false,
            user_id,
            created_at: now(),
        }
    }

    /// Display title derived from the identifier.
    pub fn title(&self) -> String {
        format!("Task #{}", self.id)
    }

    /// Copy of this task with the completion flag flipped.
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// Copy of this task with a new description. Identity and creation time are kept.
    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self.clone()
        }
    }

    /// Case-insensitive match against the title or the description.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title().to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }

    /// Text handed to the share sheet.
    pub fn share_text(&self) -> String {
        format!("{}\n\n{}", self.title(), self.description)
    }
}

/// A single record as served by the remote endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireTask {
    pub id: TaskId,
    pub todo: String,
    pub completed: bool,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

impl WireTask {
    pub fn into_task(self, created_at: DateTime<Utc>) -> Task {
        Task {
            id: self.id,
            description: self.todo,
            completed: self.completed,
            user_id: self.user_id,
            created_at,
        }
    }
}

/// Envelope returned by the remote endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub todos: Vec<WireTask>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

impl TaskListResponse {
    /// Convert every wire record into a task.
    ///
    /// The wire format carries no creation time, so the whole batch is stamped
    /// with the same instant. Batch order is the only ordering information left.
    pub fn into_tasks(self, fetched_at: DateTime<Utc>) -> Vec<Task> {
        self.todos
            .into_iter()
            .map(|wire| wire.into_task(fetched_at))
            .collect()
    }
}
