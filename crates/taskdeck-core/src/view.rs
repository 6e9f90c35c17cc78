//! Named, non-configurable slices of the full task collection.

use std::{fmt, str::FromStr};

use thiserror::Error;
use time::Date;

use crate::model::Task;
use crate::predicate::TaskQuery;
use crate::text_matcher::TextMatcher;

/// A time- or status-based view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedView {
    /// Due on the current calendar day.
    Today,
    /// Due within the current Monday-start week.
    Week,
    /// Completed.
    Completed,
    /// Pending and due before today.
    Overdue,
}

impl NamedView {
    /// Every view, in menu order.
    pub const ALL: [Self; 4] = [Self::Today, Self::Week, Self::Completed, Self::Overdue];

    /// Token used on the command line and in settings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }

    /// The shared predicate behind the view.
    #[must_use]
    pub const fn query(self, today: Date) -> TaskQuery {
        match self {
            Self::Today => TaskQuery::DueToday { today },
            Self::Week => TaskQuery::DueThisWeek { today },
            Self::Completed => TaskQuery::Completed,
            Self::Overdue => TaskQuery::Overdue { today },
        }
    }

    /// Restrict the full collection to the view, preserving order.
    pub fn select(self, tasks: &[Task], today: Date) -> Vec<&Task> {
        self.query(today).select(tasks)
    }

    /// Restrict to the view, then narrow by a search query.
    pub fn select_with_search<'a>(self, tasks: &'a [Task], today: Date, query: &str) -> Vec<&'a Task> {
        let view = self.query(today);
        let matcher = TextMatcher::new(query);
        tasks
            .iter()
            .filter(|task| view.matches(task))
            .filter(|task| matcher.as_ref().is_none_or(|matcher| matcher.matches(task)))
            .collect()
    }
}

impl fmt::Display for NamedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised for an unknown view name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown view '{0}' (expected today, week, completed, or overdue)")]
pub struct ParseViewError(pub String);

impl FromStr for NamedView {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "completed" | "done" => Ok(Self::Completed),
            "overdue" => Ok(Self::Overdue),
            _ => Err(ParseViewError(s.to_string())),
        }
    }
}
