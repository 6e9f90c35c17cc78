//! Filter selection holder and the derived list/statistics pair it drives.

use taskdeck_core::{FilterSelection, Task, TaskStats};
use time::Date;

use crate::filter_util::{FilterBuildError, FilterBuildResult, parse_category_token, parse_priority_token, parse_status_token};

/// Output of [`TaskBoard::derive`], recomputed from scratch on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    /// Tasks passing the selection, in collection order.
    pub filtered: Vec<Task>,
    /// Counters over the full collection, independent of the selection.
    pub stats: TaskStats,
}

/// Session-scoped filter selection.
#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    selection: FilterSelection,
}

impl TaskBoard {
    /// Board with every filter set to `all` and no search text.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Board starting from an existing selection.
    #[must_use]
    pub const fn with_selection(selection: FilterSelection) -> Self {
        Self { selection }
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Change one filter by its user-facing key (`status`, `priority`, `category`).
    ///
    /// The selection is unchanged when the key or value is rejected.
    ///
    /// # Errors
    /// Returns an error when `key` is unknown or `value` is not valid for it.
    pub fn update_filter(&mut self, key: &str, value: &str) -> FilterBuildResult<()> {
        match key.trim().to_ascii_lowercase().as_str() {
            "status" => self.selection.status = parse_status_token(value)?,
            "priority" => self.selection.priority = parse_priority_token(value)?,
            "category" => self.selection.category = parse_category_token(value)?,
            "search" => self.set_search(value),
            _ => {
                return Err(FilterBuildError::UnknownFilter { key: key.to_string() });
            }
        }
        Ok(())
    }

    /// Replace the search text.
    pub fn set_search(&mut self, query: &str) {
        query.clone_into(&mut self.selection.search);
    }

    /// Reset every filter and the search text.
    pub fn clear_filters(&mut self) {
        self.selection = FilterSelection::default();
    }

    /// Filtered list plus full-collection statistics.
    #[must_use]
    pub fn derive(&self, tasks: &[Task], today: Date) -> BoardView {
        BoardView {
            filtered: self.selection.apply(tasks).into_iter().cloned().collect(),
            stats: TaskStats::compute(tasks, today),
        }
    }
}
