#![allow(missing_docs)]

use std::collections::HashSet;

use proptest::prelude::*;
use time::macros::{date, datetime};
use time::{Date, Duration};

use taskdeck_core::filter::{CategoryFilter, FilterSelection, PriorityFilter, StatusFilter};
use taskdeck_core::{CategoryId, NamedView, Priority, Task, TaskDraft, TaskId, TaskStats};

const TODAY: Date = date!(2024 - 05 - 15);

#[derive(Debug, Clone)]
struct Seed {
    title: &'static str,
    category: u64,
    priority: Priority,
    due_offset: Option<i64>,
    completed: bool,
}

fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::Low), Just(Priority::Medium), Just(Priority::High)]
}

fn status_strategy() -> impl Strategy<Value = StatusFilter> {
    prop_oneof![
        Just(StatusFilter::All),
        Just(StatusFilter::Pending),
        Just(StatusFilter::Completed),
    ]
}

fn seed_strategy() -> impl Strategy<Value = Seed> {
    (
        prop::sample::select(vec!["Buy groceries", "Call mom", "Write report", "Gym", "Pay rent"]),
        1u64..4,
        priority_strategy(),
        prop::option::of(-10i64..10),
        any::<bool>(),
    )
        .prop_map(|(title, category, priority, due_offset, completed)| Seed {
            title,
            category,
            priority,
            due_offset,
            completed,
        })
}

fn build(seeds: &[Seed]) -> Vec<Task> {
    seeds
        .iter()
        .enumerate()
        .map(|(idx, seed)| {
            let mut draft = TaskDraft::new(seed.title, CategoryId(seed.category)).with_priority(seed.priority);
            if let Some(offset) = seed.due_offset {
                draft = draft.with_due_date(TODAY + Duration::days(offset));
            }
            let task = Task::from_draft(TaskId(u64::try_from(idx).unwrap_or(u64::MAX - 1) + 1), draft, datetime!(2024-05-01 0:00 UTC));
            if seed.completed {
                task.toggled(datetime!(2024-05-02 0:00 UTC))
            } else {
                task
            }
        })
        .collect()
}

fn ids(tasks: &[&Task]) -> Vec<u64> {
    tasks.iter().map(|task| task.id.0).collect()
}

proptest! {
    #[test]
    fn filtered_list_is_an_ordered_subset(
        seeds in prop::collection::vec(seed_strategy(), 0..48),
        status in status_strategy(),
        search in prop::sample::select(vec!["", "groc", "MOM", "  ", "x"]),
    ) {
        let tasks = build(&seeds);
        let selection = FilterSelection { status, search: search.to_string(), ..FilterSelection::default() };
        let filtered = ids(&selection.apply(&tasks));

        let known: HashSet<u64> = tasks.iter().map(|task| task.id.0).collect();
        prop_assert!(filtered.iter().all(|id| known.contains(id)));
        let unique: HashSet<u64> = filtered.iter().copied().collect();
        prop_assert_eq!(unique.len(), filtered.len());
        let mut sorted = filtered.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, filtered);
    }

    #[test]
    fn default_selection_is_identity(seeds in prop::collection::vec(seed_strategy(), 0..48)) {
        let tasks = build(&seeds);
        let all: Vec<u64> = tasks.iter().map(|task| task.id.0).collect();
        prop_assert_eq!(ids(&FilterSelection::default().apply(&tasks)), all);
    }

    #[test]
    fn filters_commute(
        seeds in prop::collection::vec(seed_strategy(), 0..48),
        status in status_strategy(),
        priority in priority_strategy(),
        category in 1u64..4,
    ) {
        let tasks = build(&seeds);
        let only_status = FilterSelection { status, ..FilterSelection::default() };
        let only_priority = FilterSelection { priority: PriorityFilter::Only(priority), ..FilterSelection::default() };
        let only_category = FilterSelection { category: CategoryFilter::Only(CategoryId(category)), ..FilterSelection::default() };
        let combined = FilterSelection {
            status,
            priority: PriorityFilter::Only(priority),
            category: CategoryFilter::Only(CategoryId(category)),
            search: String::new(),
        };

        let chain = |order: [&FilterSelection; 3]| -> Vec<u64> {
            let mut current: Vec<Task> = tasks.clone();
            for step in order {
                current = step.apply(&current).into_iter().cloned().collect();
            }
            current.iter().map(|task| task.id.0).collect()
        };

        let expected = ids(&combined.apply(&tasks));
        prop_assert_eq!(chain([&only_status, &only_priority, &only_category]), expected.clone());
        prop_assert_eq!(chain([&only_category, &only_status, &only_priority]), expected.clone());
        prop_assert_eq!(chain([&only_priority, &only_category, &only_status]), expected);
    }

    #[test]
    fn overdue_count_matches_overdue_view(seeds in prop::collection::vec(seed_strategy(), 0..48)) {
        let tasks = build(&seeds);
        let stats = TaskStats::compute(&tasks, TODAY);
        prop_assert_eq!(stats.overdue, NamedView::Overdue.select(&tasks, TODAY).len());
        prop_assert_eq!(stats.completed + stats.pending, stats.total);
    }

    #[test]
    fn tasks_due_today_are_never_overdue(seeds in prop::collection::vec(seed_strategy(), 0..48)) {
        let tasks = build(&seeds);
        let today: HashSet<u64> = NamedView::Today.select(&tasks, TODAY).iter().map(|task| task.id.0).collect();
        let overdue = NamedView::Overdue.select(&tasks, TODAY);
        prop_assert!(overdue.iter().all(|task| !today.contains(&task.id.0)));
    }
}

#[test]
fn dashboard_scenario_counts() {
    let seeds = [
        Seed { title: "A", category: 1, priority: Priority::Medium, due_offset: Some(-1), completed: false },
        Seed { title: "B", category: 1, priority: Priority::Medium, due_offset: Some(0), completed: false },
        Seed { title: "C", category: 1, priority: Priority::Medium, due_offset: Some(0), completed: true },
        Seed { title: "D", category: 1, priority: Priority::Medium, due_offset: None, completed: false },
    ];
    let tasks = build(&seeds);

    assert_eq!(ids(&NamedView::Today.select(&tasks, TODAY)), vec![2, 3]);
    assert_eq!(ids(&NamedView::Overdue.select(&tasks, TODAY)), vec![1]);
    assert_eq!(
        TaskStats::compute(&tasks, TODAY),
        TaskStats { total: 4, completed: 1, pending: 3, overdue: 1 }
    );
}

#[test]
fn search_scenario_matches_groceries_only() {
    let seeds = [
        Seed { title: "Buy groceries", category: 1, priority: Priority::Low, due_offset: None, completed: false },
        Seed { title: "Call mom", category: 1, priority: Priority::Low, due_offset: None, completed: false },
    ];
    let tasks = build(&seeds);
    let selection = FilterSelection { search: "groc".into(), ..FilterSelection::default() };
    assert_eq!(ids(&selection.apply(&tasks)), vec![1]);
}
