//! Aggregate counters over a task slice.

use time::Date;

use crate::model::Task;
use crate::predicate::is_overdue;

/// Totals shown in the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    /// Every task in the slice.
    pub total: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Pending tasks.
    pub pending: usize,
    /// Pending tasks due before `today`.
    pub overdue: usize,
}

impl TaskStats {
    /// Count over `tasks` using the same overdue predicate as the overdue view.
    #[must_use]
    pub fn compute<'a, I>(tasks: I, today: Date) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        tasks.into_iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            if task.completed {
                stats.completed += 1;
            } else {
                stats.pending += 1;
            }
            if is_overdue(task, today) {
                stats.overdue += 1;
            }
            stats
        })
    }

    /// Share of completed tasks, rounded down. Zero for an empty slice.
    #[must_use]
    pub const fn completion_percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.completed * 100 / self.total
        }
    }
}
