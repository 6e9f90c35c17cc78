//! Task and category records as held in memory by every layer.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use time::{Date, OffsetDateTime};

use crate::error::TaskError;
use crate::id::{CategoryId, TaskId};

/// Task urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Regular work.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl Priority {
    /// Every priority, lowest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Wire and display representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a priority token is not one of `low`, `medium`, `high`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid priority: {0}")]
pub struct ParsePriorityError(pub String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParsePriorityError(s.to_string())),
        }
    }
}

/// A unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Non-empty title.
    pub title: String,
    /// Optional free-form notes.
    pub description: Option<String>,
    /// Owning category. May dangle; consumers treat that as "no category".
    pub category_id: CategoryId,
    /// Urgency.
    pub priority: Priority,
    /// Calendar day the task is due, if scheduled.
    pub due_date: Option<Date>,
    /// Completion flag.
    pub completed: bool,
    /// Set once at creation.
    pub created_at: OffsetDateTime,
    /// Present exactly when `completed` is true.
    pub completed_at: Option<OffsetDateTime>,
}

impl Task {
    /// Build the record a store persists for a freshly created task.
    #[must_use]
    pub fn from_draft(id: TaskId, draft: TaskDraft, now: OffsetDateTime) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description.filter(|text| !text.is_empty()),
            category_id: draft.category_id,
            priority: draft.priority,
            due_date: draft.due_date,
            completed: false,
            created_at: now,
            completed_at: None,
        }
    }

    /// Replace every editable field with `update`, keeping `completed_at` consistent.
    pub fn apply_update(&mut self, update: TaskUpdate, now: OffsetDateTime) {
        let TaskUpdate {
            title,
            description,
            category_id,
            priority,
            due_date,
            completed,
        } = update;
        self.title = title;
        self.description = description.filter(|text| !text.is_empty());
        self.category_id = category_id;
        self.priority = priority;
        self.due_date = due_date;
        self.set_completed(completed, now);
    }

    /// Copy of the task with its completion flag flipped.
    #[must_use]
    pub fn toggled(&self, now: OffsetDateTime) -> Self {
        let mut next = self.clone();
        next.set_completed(!self.completed, now);
        next
    }

    fn set_completed(&mut self, completed: bool, now: OffsetDateTime) {
        match (self.completed, completed) {
            (false, true) => self.completed_at = Some(now),
            (true, false) => self.completed_at = None,
            _ => {}
        }
        self.completed = completed;
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Title; must not be blank.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Category the task belongs to.
    pub category_id: CategoryId,
    /// Urgency, medium unless chosen.
    pub priority: Priority,
    /// Optional due day.
    pub due_date: Option<Date>,
}

impl TaskDraft {
    /// Draft with the required fields and defaults for the rest.
    pub fn new(title: impl Into<String>, category_id: CategoryId) -> Self {
        Self {
            title: title.into(),
            description: None,
            category_id,
            priority: Priority::default(),
            due_date: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the due day.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Date) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Form-level check used before submitting a draft.
    ///
    /// # Errors
    /// Returns [`TaskError::Validation`] when the title is blank.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.title.trim().is_empty() {
            return Err(TaskError::validation("title is required"));
        }
        Ok(())
    }
}

/// Full-record replacement payload; unchanged fields must be carried forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Category.
    pub category_id: CategoryId,
    /// Priority.
    pub priority: Priority,
    /// Due day.
    pub due_date: Option<Date>,
    /// Completion flag.
    pub completed: bool,
}

#[allow(clippy::missing_const_for_fn)]
impl TaskUpdate {
    /// Start from the current record so every field is carried forward.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            category_id: task.category_id,
            priority: task.priority,
            due_date: task.due_date,
            completed: task.completed,
        }
    }

    /// Change the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Change or clear the description.
    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Move the task to another category.
    #[must_use]
    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = category_id;
        self
    }

    /// Change the priority.
    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Reschedule or unschedule.
    #[must_use]
    pub fn due_date(mut self, due_date: Option<Date>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Mark done or not done.
    #[must_use]
    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// Named, ordered grouping that tasks reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Store-assigned identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Semantic color token.
    pub color: String,
    /// Symbolic icon name.
    pub icon: String,
    /// Ascending display order; unique per collection.
    pub order_index: i64,
}

/// Input for creating or replacing a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    /// Display name.
    pub name: String,
    /// Semantic color token.
    pub color: String,
    /// Symbolic icon name.
    pub icon: String,
    /// Explicit position; the store appends after the last category when absent.
    pub order_index: Option<i64>,
}

impl CategoryDraft {
    /// Draft with an explicit name, color, and icon.
    pub fn new(name: impl Into<String>, color: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            icon: icon.into(),
            order_index: None,
        }
    }

    /// Pin the display position.
    #[must_use]
    pub const fn at(mut self, order_index: i64) -> Self {
        self.order_index = Some(order_index);
        self
    }

    /// Form-level check used before submitting a draft.
    ///
    /// # Errors
    /// Returns [`TaskError::Validation`] when the name is blank.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.name.trim().is_empty() {
            return Err(TaskError::validation("category name is required"));
        }
        Ok(())
    }
}
