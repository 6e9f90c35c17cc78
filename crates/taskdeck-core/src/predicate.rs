//! Calendar predicates shared by the view engine, the statistics, and every store.
//!
//! All comparisons are by calendar day. Weeks start on Monday.

use time::{Date, Duration, OffsetDateTime};

use crate::id::CategoryId;
use crate::model::Task;

/// Current calendar day in the caller's local timezone.
///
/// Falls back to UTC when the local offset cannot be determined
/// (e.g. in multi-threaded processes on some Unix platforms).
#[must_use]
pub fn local_today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// Monday and Sunday of the week containing `day`.
#[must_use]
pub fn week_bounds(day: Date) -> (Date, Date) {
    let offset = i64::from(day.weekday().number_days_from_monday());
    let monday = day.checked_sub(Duration::days(offset)).unwrap_or(day);
    let sunday = monday.checked_add(Duration::days(6)).unwrap_or(Date::MAX);
    (monday, sunday)
}

/// Due on `today`.
#[must_use]
pub fn is_due_today(task: &Task, today: Date) -> bool {
    task.due_date == Some(today)
}

/// Due anywhere in the Monday-start week containing `today`.
#[must_use]
pub fn is_due_this_week(task: &Task, today: Date) -> bool {
    let (monday, sunday) = week_bounds(today);
    task.due_date.is_some_and(|due| monday <= due && due <= sunday)
}

/// Pending and due strictly before `today`. A task due today is never overdue.
#[must_use]
pub fn is_overdue(task: &Task, today: Date) -> bool {
    !task.completed && task.due_date.is_some_and(|due| due < today)
}

/// Predicate queries a store may evaluate natively.
///
/// Stores without native filtering derive the same answer client-side via
/// [`TaskQuery::matches`], so both paths agree by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskQuery {
    /// Tasks in one category.
    ByCategory(CategoryId),
    /// Completed tasks.
    Completed,
    /// Pending tasks.
    Pending,
    /// Pending tasks due before the reference day.
    Overdue {
        /// Reference day.
        today: Date,
    },
    /// Tasks due on the reference day.
    DueToday {
        /// Reference day.
        today: Date,
    },
    /// Tasks due in the reference day's week.
    DueThisWeek {
        /// Reference day.
        today: Date,
    },
}

impl TaskQuery {
    /// Evaluate the query against one task.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        match *self {
            Self::ByCategory(category) => task.category_id == category,
            Self::Completed => task.completed,
            Self::Pending => !task.completed,
            Self::Overdue { today } => is_overdue(task, today),
            Self::DueToday { today } => is_due_today(task, today),
            Self::DueThisWeek { today } => is_due_this_week(task, today),
        }
    }

    /// Keep the tasks matching the query, preserving order.
    pub fn select<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}
