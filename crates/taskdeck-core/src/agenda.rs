use time::{Date, Duration, Weekday};

use crate::model::Task;
use crate::predicate::week_bounds;

/// One day of the weekly agenda.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaDay<'a> {
    /// Calendar day.
    pub date: Date,
    /// Tasks due on `date`, in collection order.
    pub tasks: Vec<&'a Task>,
}

impl AgendaDay<'_> {
    /// Day of the week.
    #[must_use]
    pub const fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    /// Whether every task due that day is completed. False for an empty day.
    #[must_use]
    pub fn all_done(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|task| task.completed)
    }
}

/// Monday through Sunday of the week containing `today`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekAgenda<'a> {
    /// Seven days, Monday first.
    pub days: Vec<AgendaDay<'a>>,
}

impl<'a> WeekAgenda<'a> {
    /// Group the tasks due this week by day.
    #[must_use]
    pub fn build(tasks: &'a [Task], today: Date) -> Self {
        let (monday, _) = week_bounds(today);
        let days = (0..7)
            .map_while(|offset| monday.checked_add(Duration::days(offset)))
            .map(|date| AgendaDay {
                date,
                tasks: tasks.iter().filter(|task| task.due_date == Some(date)).collect(),
            })
            .collect();
        Self { days }
    }

    /// Number of tasks scheduled in the week.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.days.iter().map(|day| day.tasks.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{CategoryId, TaskId};
    use crate::model::TaskDraft;
    use time::macros::{date, datetime};

    fn due(id: u64, day: Date) -> Task {
        Task::from_draft(
            TaskId(id),
            TaskDraft::new(format!("task {id}"), CategoryId(1)).with_due_date(day),
            datetime!(2024-05-01 0:00 UTC),
        )
    }

    #[test]
    fn agenda_covers_monday_to_sunday() {
        let agenda = WeekAgenda::build(&[], date!(2024 - 05 - 15));
        assert_eq!(agenda.days.len(), 7);
        assert_eq!(agenda.days[0].date, date!(2024 - 05 - 13));
        assert_eq!(agenda.days[0].weekday(), Weekday::Monday);
        assert_eq!(agenda.days[6].date, date!(2024 - 05 - 19));
        assert_eq!(agenda.task_count(), 0);
    }

    #[test]
    fn tasks_land_on_their_due_day_only() {
        let tasks = vec![
            due(1, date!(2024 - 05 - 13)),
            due(2, date!(2024 - 05 - 15)),
            due(3, date!(2024 - 05 - 15)),
            due(4, date!(2024 - 05 - 20)),
        ];
        let agenda = WeekAgenda::build(&tasks, date!(2024 - 05 - 15));
        let wednesday: Vec<u64> = agenda.days[2].tasks.iter().map(|task| task.id.0).collect();
        assert_eq!(wednesday, vec![2, 3]);
        assert_eq!(agenda.days[0].tasks.len(), 1);
        assert_eq!(agenda.task_count(), 3);
        assert!(!agenda.days[2].all_done());
        assert!(!agenda.days[1].all_done());
    }
}
