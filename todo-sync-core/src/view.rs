//! Change descriptors handed to the presentation layer.

/// Minimal description of how the visible list changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewUpdate {
    /// Anything may have changed; redraw the whole list.
    ListChanged,
    CellChanged(usize),
    CellInserted(usize),
    CellRemoved(usize),
}

/// Everything the presentation layer can be notified about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    ListChanged,
    CellChanged { index: usize },
    CellInserted { index: usize },
    CellRemoved { index: usize },
    LoadFailed { message: String },
}

impl From<ViewUpdate> for ListEvent {
    fn from(update: ViewUpdate) -> Self {
        match update {
            ViewUpdate::ListChanged => ListEvent::ListChanged,
            ViewUpdate::CellChanged(index) => ListEvent::CellChanged { index },
            ViewUpdate::CellInserted(index) => ListEvent::CellInserted { index },
            ViewUpdate::CellRemoved(index) => ListEvent::CellRemoved { index },
        }
    }
}

/// Human readable size of a task list, e.g. `"1 task"` or `"12 tasks"`.
pub fn format_task_count(count: usize) -> String {
    if count == 1 {
        "1 task".to_string()
    } else {
        format!("{count} tasks")
    }
}
