//! Session-scoped owner of the task collection.
//!
//! Mutations are pessimistic: the local collection changes only after the store
//! confirms, and a failed call leaves it untouched. Responses for the same id are
//! applied in issue order; a response overtaken by a newer one is returned to its
//! caller but not applied locally. A load keeps local changes made while it was in
//! flight, and a load overtaken by a newer load is discarded.

use std::collections::{HashMap, HashSet};
use std::fmt;

use taskdeck_core::{Task, TaskDraft, TaskError, TaskId, TaskUpdate};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::async_store::AsyncTaskStore;
use crate::task_cache::TaskCache;

/// Where the session is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A load is in flight.
    Loading,
    /// The last load succeeded.
    Ready,
    /// The last load failed; previously loaded tasks are kept.
    Failed,
}

/// Operation a [`LifecycleError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `load`.
    Load,
    /// `create`.
    Create,
    /// `update`.
    Update,
    /// `delete`.
    Delete,
    /// `toggle_complete`.
    Toggle,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "load tasks",
            Self::Create => "create task",
            Self::Update => "update task",
            Self::Delete => "delete task",
            Self::Toggle => "toggle task completion",
        })
    }
}

/// A failed lifecycle operation with its cause.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to {operation}: {source}")]
pub struct LifecycleError {
    /// What was attempted.
    pub operation: Operation,
    /// Underlying store failure.
    #[source]
    pub source: TaskError,
}

impl LifecycleError {
    fn new(operation: Operation, source: impl Into<TaskError>) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }

    /// Taxonomy of the cause.
    #[must_use]
    pub const fn kind(&self) -> &TaskError {
        &self.source
    }
}

/// Read-only copy of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Load state.
    pub state: LoadState,
    /// Message from the last failed load, cleared when a new load starts.
    pub error: Option<String>,
    /// Tasks in display order.
    pub tasks: Vec<Task>,
    /// Increments on every local change.
    pub version: u64,
}

#[derive(Debug, Default)]
struct Session {
    state: LoadState,
    error: Option<String>,
    cache: TaskCache,
    version: u64,
    next_ticket: u64,
    /// Issue ticket of the latest response applied per id.
    applied: HashMap<TaskId, u64>,
    /// Ticket taken when a local change for the id was last applied.
    changed_at: HashMap<TaskId, u64>,
    /// Ticket of the most recent load whose result was applied.
    loaded: u64,
    deleted: HashSet<TaskId>,
}

impl Session {
    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// A response may be applied when no newer response for the id was applied and the id is not deleted.
    fn accepts(&self, id: TaskId, ticket: u64) -> bool {
        !self.deleted.contains(&id) && self.applied.get(&id).is_none_or(|&latest| latest < ticket)
    }

    fn apply_replacement(&mut self, task: Task, ticket: u64) -> bool {
        let id = task.id;
        if !self.accepts(id, ticket) {
            return false;
        }
        self.applied.insert(id, ticket);
        if self.cache.replace(task) {
            self.record_change(id);
            self.version += 1;
        }
        true
    }

    fn record_change(&mut self, id: TaskId) {
        let at = self.issue_ticket();
        self.changed_at.insert(id, at);
    }

    fn changed_since(&self, id: TaskId, ticket: u64) -> bool {
        self.changed_at.get(&id).is_some_and(|&at| at > ticket)
    }

    /// Replace the cache with a fetched collection taken under load `ticket`.
    ///
    /// Entries changed locally after the load started win over the fetched copy,
    /// and tasks created since then are appended. Deleted ids never come back.
    fn apply_load(&mut self, fetched: Vec<Task>, ticket: u64) -> usize {
        let mut seen = HashSet::with_capacity(fetched.len());
        let mut merged = Vec::with_capacity(fetched.len());
        for task in fetched {
            if self.deleted.contains(&task.id) || !seen.insert(task.id) {
                continue;
            }
            let local = if self.changed_since(task.id, ticket) {
                self.cache.get(task.id).cloned()
            } else {
                None
            };
            merged.push(local.unwrap_or(task));
        }
        let created_meanwhile: Vec<Task> = self
            .cache
            .tasks()
            .iter()
            .filter(|task| !seen.contains(&task.id) && self.changed_since(task.id, ticket))
            .cloned()
            .collect();
        merged.extend(created_meanwhile);

        let count = merged.len();
        self.cache = TaskCache::from_tasks(merged);
        self.loaded = ticket;
        self.version += 1;
        count
    }
}

/// Owns the authoritative task collection for one session.
pub struct TaskLifecycle<S> {
    store: S,
    session: Mutex<Session>,
}

impl<S: AsyncTaskStore> TaskLifecycle<S> {
    /// Wrap an explicitly constructed store client.
    pub fn new(store: S) -> Self {
        Self {
            store,
            session: Mutex::new(Session::default()),
        }
    }

    /// Underlying store client.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Replace the collection with the store's current contents.
    ///
    /// # Errors
    /// Returns a [`LifecycleError`] when the fetch fails; the previous collection is kept.
    pub async fn load(&self) -> Result<usize, LifecycleError> {
        let ticket = {
            let mut session = self.session.lock().await;
            session.state = LoadState::Loading;
            session.error = None;
            session.issue_ticket()
        };
        debug!(ticket, "Loading tasks");

        let result = self.store.fetch_all().await.map_err(Into::<TaskError>::into);

        let mut session = self.session.lock().await;
        if ticket < session.loaded {
            let count = session.cache.len();
            drop(session);
            debug!(ticket, "Ignored load overtaken by a newer one");
            return result.map(|_| count).map_err(|source| LifecycleError::new(Operation::Load, source));
        }
        match result {
            Ok(tasks) => {
                let count = session.apply_load(tasks, ticket);
                session.state = LoadState::Ready;
                drop(session);
                info!(count, "Loaded tasks");
                Ok(count)
            }
            Err(source) => {
                let err = LifecycleError::new(Operation::Load, source);
                session.state = LoadState::Failed;
                session.error = Some(err.to_string());
                drop(session);
                warn!(error = %err, "Load failed");
                Err(err)
            }
        }
    }

    /// Same as [`Self::load`]; moves a ready session back through `Loading`.
    ///
    /// # Errors
    /// See [`Self::load`].
    pub async fn reload(&self) -> Result<usize, LifecycleError> {
        self.load().await
    }

    /// Create a task and append the stored record.
    ///
    /// # Errors
    /// Returns a [`LifecycleError`] when the store rejects the draft; nothing is inserted.
    pub async fn create(&self, draft: TaskDraft) -> Result<Task, LifecycleError> {
        let task = self
            .store
            .create(draft)
            .await
            .map_err(|err| self.failed(Operation::Create, None, err))?;
        let mut session = self.session.lock().await;
        session.cache.insert(task.clone());
        session.record_change(task.id);
        session.version += 1;
        drop(session);
        info!(task = %task.id, "Created task");
        Ok(task)
    }

    /// Replace every editable field of task `id`.
    ///
    /// # Errors
    /// Returns a [`LifecycleError`] when the store call fails; the collection is unchanged.
    pub async fn update(&self, id: TaskId, update: TaskUpdate) -> Result<Task, LifecycleError> {
        let ticket = self.session.lock().await.issue_ticket();
        let task = self
            .store
            .update(id, update)
            .await
            .map_err(|err| self.failed(Operation::Update, Some(id), err))?;
        self.settle(Operation::Update, task.clone(), ticket).await;
        Ok(task)
    }

    /// Flip completion of task `id`.
    ///
    /// # Errors
    /// Returns a [`LifecycleError`] when the store call fails; the collection is unchanged.
    pub async fn toggle_complete(&self, id: TaskId) -> Result<Task, LifecycleError> {
        let ticket = self.session.lock().await.issue_ticket();
        let task = self
            .store
            .toggle_complete(id)
            .await
            .map_err(|err| self.failed(Operation::Toggle, Some(id), err))?;
        self.settle(Operation::Toggle, task.clone(), ticket).await;
        Ok(task)
    }

    /// Delete task `id`. A confirmed delete is final for the session.
    ///
    /// # Errors
    /// Returns a [`LifecycleError`] when the store call fails; the collection is unchanged.
    pub async fn delete(&self, id: TaskId) -> Result<(), LifecycleError> {
        let ticket = self.session.lock().await.issue_ticket();
        self.store
            .delete(id)
            .await
            .map_err(|err| self.failed(Operation::Delete, Some(id), err))?;
        let mut session = self.session.lock().await;
        session.applied.insert(id, ticket);
        session.deleted.insert(id);
        if session.cache.remove(id).is_some() {
            session.version += 1;
        }
        drop(session);
        info!(task = %id, "Deleted task");
        Ok(())
    }

    async fn settle(&self, operation: Operation, task: Task, ticket: u64) {
        let id = task.id;
        let applied = self.session.lock().await.apply_replacement(task, ticket);
        if applied {
            info!(task = %id, %operation, "Applied store response");
        } else {
            debug!(task = %id, %operation, ticket, "Ignored stale store response");
        }
    }

    fn failed(&self, operation: Operation, id: Option<TaskId>, err: S::Error) -> LifecycleError {
        let err = LifecycleError::new(operation, err);
        match id {
            Some(id) => warn!(task = %id, error = %err, "Store call failed"),
            None => warn!(error = %err, "Store call failed"),
        }
        err
    }

    /// Copy of the current session.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = self.session.lock().await;
        SessionSnapshot {
            state: session.state,
            error: session.error.clone(),
            tasks: session.cache.tasks().to_vec(),
            version: session.version,
        }
    }

    /// Current tasks in display order.
    pub async fn tasks(&self) -> Vec<Task> {
        self.session.lock().await.cache.tasks().to_vec()
    }

    /// Look up a cached task.
    pub async fn task(&self, id: TaskId) -> Option<Task> {
        self.session.lock().await.cache.get(id).cloned()
    }

    /// Current load state.
    pub async fn state(&self) -> LoadState {
        self.session.lock().await.state
    }
}
