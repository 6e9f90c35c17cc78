//! Ad-hoc filter selection applied to the displayed task list.

use crate::id::CategoryId;
use crate::model::{Priority, Task};
use crate::predicate::TaskQuery;
use crate::text_matcher::TextMatcher;

/// Completion-state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    /// Every task.
    #[default]
    All,
    /// Not yet completed.
    Pending,
    /// Completed.
    Completed,
}

impl StatusFilter {
    /// Token used by front ends.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    const fn query(self) -> Option<TaskQuery> {
        match self {
            Self::All => None,
            Self::Pending => Some(TaskQuery::Pending),
            Self::Completed => Some(TaskQuery::Completed),
        }
    }
}

/// Priority filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PriorityFilter {
    /// Every priority.
    #[default]
    All,
    /// Exactly this priority.
    Only(Priority),
}

/// Category filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    /// Every category.
    #[default]
    All,
    /// Exactly this category.
    Only(CategoryId),
}

/// Session-scoped combination of status, priority, category, and search text.
///
/// Every active clause is ANDed; clauses commute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FilterSelection {
    /// Completion filter.
    pub status: StatusFilter,
    /// Priority filter.
    pub priority: PriorityFilter,
    /// Category filter.
    pub category: CategoryFilter,
    /// Free-text search over title and description.
    pub search: String,
}

impl FilterSelection {
    /// Returns true when every clause passes everything.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.status == StatusFilter::All
            && self.priority == PriorityFilter::All
            && self.category == CategoryFilter::All
            && self.search.trim().is_empty()
    }

    /// Compile the selection into a reusable predicate.
    #[must_use]
    pub fn compile(&self) -> CompiledFilter {
        CompiledFilter {
            status: self.status.query(),
            priority: match self.priority {
                PriorityFilter::All => None,
                PriorityFilter::Only(priority) => Some(priority),
            },
            category: match self.category {
                CategoryFilter::All => None,
                CategoryFilter::Only(category) => Some(TaskQuery::ByCategory(category)),
            },
            text: TextMatcher::new(&self.search),
        }
    }

    /// Whether a single task passes every clause.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.compile().matches(task)
    }

    /// Filter `tasks`, preserving their order. Never fabricates or duplicates entries.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        if self.is_default() {
            return tasks.iter().collect();
        }
        let compiled = self.compile();
        tasks.iter().filter(|task| compiled.matches(task)).collect()
    }
}

/// A [`FilterSelection`] with its search text normalized once.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    status: Option<TaskQuery>,
    priority: Option<Priority>,
    category: Option<TaskQuery>,
    text: Option<TextMatcher>,
}

impl CompiledFilter {
    /// Whether `task` passes every active clause.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|query| query.matches(task))
            && self.priority.is_none_or(|priority| task.priority == priority)
            && self.category.is_none_or(|query| query.matches(task))
            && self.text.as_ref().is_none_or(|matcher| matcher.matches(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TaskId;
    use crate::model::TaskDraft;
    use time::macros::datetime;

    fn task(id: u64, title: &str, category: u64, priority: Priority, completed: bool) -> Task {
        let mut task = Task::from_draft(
            TaskId(id),
            TaskDraft::new(title, CategoryId(category)).with_priority(priority),
            datetime!(2024-01-01 0:00 UTC),
        );
        task.completed = completed;
        task
    }

    fn ids(tasks: &[&Task]) -> Vec<u64> {
        tasks.iter().map(|task| task.id.0).collect()
    }

    fn fixture() -> Vec<Task> {
        vec![
            task(1, "Buy groceries", 1, Priority::High, false),
            task(2, "Call mom", 2, Priority::Low, true),
            task(3, "Write report", 1, Priority::Medium, true),
            task(4, "Groom the dog", 2, Priority::High, false),
        ]
    }

    #[test]
    fn default_selection_returns_everything_in_order() {
        let tasks = fixture();
        let selection = FilterSelection::default();
        assert!(selection.is_default());
        assert_eq!(ids(&selection.apply(&tasks)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn search_matches_substring_case_insensitively() {
        let tasks = fixture();
        let selection = FilterSelection {
            search: "GROC".into(),
            ..FilterSelection::default()
        };
        assert_eq!(ids(&selection.apply(&tasks)), vec![1]);
    }

    #[test]
    fn whitespace_search_is_ignored() {
        let tasks = fixture();
        let selection = FilterSelection {
            search: "   ".into(),
            ..FilterSelection::default()
        };
        assert!(selection.is_default());
        assert_eq!(selection.apply(&tasks).len(), 4);
    }

    #[test]
    fn clauses_are_anded_together() {
        let tasks = fixture();
        let selection = FilterSelection {
            status: StatusFilter::Pending,
            priority: PriorityFilter::Only(Priority::High),
            category: CategoryFilter::Only(CategoryId(2)),
            search: "g".into(),
        };
        assert_eq!(ids(&selection.apply(&tasks)), vec![4]);
    }

    #[test]
    fn status_filters_split_the_collection() {
        let tasks = fixture();
        let pending = FilterSelection {
            status: StatusFilter::Pending,
            ..FilterSelection::default()
        };
        let completed = FilterSelection {
            status: StatusFilter::Completed,
            ..FilterSelection::default()
        };
        assert_eq!(ids(&pending.apply(&tasks)), vec![1, 4]);
        assert_eq!(ids(&completed.apply(&tasks)), vec![2, 3]);
    }

    #[test]
    fn empty_collection_yields_empty_result() {
        let selection = FilterSelection {
            status: StatusFilter::Completed,
            ..FilterSelection::default()
        };
        assert!(selection.apply(&[]).is_empty());
    }
}
