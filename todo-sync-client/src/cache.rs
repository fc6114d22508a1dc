//! Session-local mirror of the task store plus the search-filtered view.
//!
//! The working set is only mutated after the matching store write succeeded.
//! The visible set is never stored; it is derived from the working set and the
//! current search text every time it is asked for.

use todo_sync_core::models::{Task, TaskId};

/// Identifier handed out first when the working set is empty.
pub const DEFAULT_ID_FLOOR: TaskId = 1;

pub struct TaskListCache {
    tasks: Vec<Task>,
    search_text: String,
    /// `None` once the identifier space is used up.
    next_id: Option<TaskId>,
    id_floor: TaskId,
}

impl TaskListCache {
    pub fn new() -> Self {
        Self::with_id_floor(DEFAULT_ID_FLOOR)
    }

    pub fn with_id_floor(id_floor: TaskId) -> Self {
        Self {
            tasks: Vec::new(),
            search_text: String::new(),
            next_id: Some(id_floor),
            id_floor,
        }
    }

    /// Replace the working set and reseed the identifier counter from it.
    pub fn initialize(&mut self, tasks: Vec<Task>) {
        self.next_id = match tasks.iter().map(|t| t.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(self.id_floor),
        };
        self.tasks = tasks;

        tracing::debug!(
            "CACHE: Initialized with {} tasks, next id {:?}",
            self.tasks.len(),
            self.next_id
        );
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The full working set in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Empty text clears the filter.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    pub fn visible(&self) -> Vec<&Task> {
        visible_tasks(&self.tasks, &self.search_text)
    }

    pub fn visible_count(&self) -> usize {
        if self.search_text.is_empty() {
            return self.tasks.len();
        }
        self.visible().len()
    }

    /// Absent when `index` is out of range; during a resize that is routine.
    pub fn visible_task_at(&self, index: usize) -> Option<&Task> {
        self.visible().get(index).copied()
    }

    pub fn visible_index_of(&self, id: TaskId) -> Option<usize> {
        self.visible().iter().position(|t| t.id == id)
    }

    /// Hand out the next identifier. Identifiers are never reused within a session.
    ///
    /// Returns `None` when every identifier up to `TaskId::MAX` has been handed out.
    pub fn allocate_identifier(&mut self) -> Option<TaskId> {
        let id = self.next_id?;
        self.next_id = id.checked_add(1);
        Some(id)
    }

    /// Swap in a new version of an existing task. Returns false if it is unknown.
    pub fn apply_replace(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    pub fn apply_insert_at_front(&mut self, task: Task) {
        if self.next_id.is_some_and(|next| task.id >= next) {
            self.next_id = task.id.checked_add(1);
        }
        self.tasks.insert(0, task);
    }

    pub fn apply_remove(&mut self, id: TaskId) -> Option<Task> {
        let position = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(position))
    }
}

impl Default for TaskListCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Tasks whose title or description contains `search_text`, ignoring case,
/// in working-set order. Empty text selects everything.
pub fn visible_tasks<'a>(tasks: &'a [Task], search_text: &str) -> Vec<&'a Task> {
    if search_text.is_empty() {
        return tasks.iter().collect();
    }

    let needle = search_text.to_lowercase();
    tasks.iter().filter(|t| t.matches(&needle)).collect()
}
