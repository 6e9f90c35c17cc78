//! In-session task collection with an id index.

use std::collections::HashMap;

use taskdeck_core::{Task, TaskId};

/// Authoritative task list for the current session.
///
/// Order is the store's load order followed by creations in append order;
/// replacements keep their position.
#[derive(Debug, Default, Clone)]
pub struct TaskCache {
    tasks: Vec<Task>,
    task_index: HashMap<TaskId, usize>,
}

impl TaskCache {
    /// Build a cache from a freshly loaded collection.
    #[must_use]
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut cache = Self {
            tasks,
            task_index: HashMap::new(),
        };
        cache.rebuild_indexes();
        cache
    }

    fn rebuild_indexes(&mut self) {
        self.task_index.clear();
        for (idx, task) in self.tasks.iter().enumerate() {
            self.task_index.insert(task.id, idx);
        }
    }

    /// Tasks in display order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of cached tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up a task by id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.task_index.get(&id).and_then(|&idx| self.tasks.get(idx))
    }

    /// Append a new task, or replace it in place if the id is already cached.
    pub fn insert(&mut self, task: Task) {
        if let Some(&idx) = self.task_index.get(&task.id) {
            self.tasks[idx] = task;
        } else {
            self.task_index.insert(task.id, self.tasks.len());
            self.tasks.push(task);
        }
    }

    /// Replace the entry with the same id, keeping its position. Returns false if absent.
    pub fn replace(&mut self, task: Task) -> bool {
        match self.task_index.get(&task.id) {
            Some(&idx) => {
                self.tasks[idx] = task;
                true
            }
            None => false,
        }
    }

    /// Remove the entry with `id`.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let idx = self.task_index.get(&id).copied()?;
        let removed = self.tasks.remove(idx);
        self.rebuild_indexes();
        Some(removed)
    }
}
