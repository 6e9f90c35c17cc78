//! In-process record store for taskdeck, optionally persisted to a JSON file.
//!
//! Every mutation goes through the same envelope a remote record store answers with
//! ([`wire::MutationResponse`]), so callers see identical failure semantics whichever
//! backend sits behind the client.

pub mod error;
pub mod wire;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use taskdeck_core::{
    Category, CategoryDraft, CategoryId, Settings, Task, TaskDraft, TaskId, TaskQuery, TaskUpdate,
};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

pub use error::LocalStoreError;
use wire::{CategoryRecord, MutationResponse, RecordFailure, SettingsRecord, TaskRecord};

/// Result alias for local store operations.
pub type Result<T> = std::result::Result<T, LocalStoreError>;

/// Categories inserted by [`LocalStore::seed_default_categories`].
const DEFAULT_CATEGORIES: [(&str, &str, &str); 3] = [
    ("Work", "primary", "Briefcase"),
    ("Personal", "secondary", "User"),
    ("Health", "success", "Heart"),
];

const SETTINGS_RECORD_ID: u64 = 1;

/// Persisted document layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    next_task_id: u64,
    #[serde(default)]
    next_category_id: u64,
    #[serde(default)]
    tasks: Vec<TaskRecord>,
    #[serde(default)]
    categories: Vec<CategoryRecord>,
    #[serde(default)]
    settings: Option<SettingsRecord>,
}

impl StoreDocument {
    /// Bring ids into canonical numeric form and make sure counters never reuse an id.
    fn normalize(&mut self) -> Result<()> {
        let mut max_task = 0;
        for record in &mut self.tasks {
            let task = record.clone().into_task()?;
            max_task = max_task.max(task.id.get());
            *record = TaskRecord::from_task(&task)?;
        }
        let mut max_category = 0;
        for record in &mut self.categories {
            let category = record.clone().into_category()?;
            max_category = max_category.max(category.id.get());
            *record = CategoryRecord::from_category(&category);
        }
        self.next_task_id = self.next_task_id.max(max_task + 1);
        self.next_category_id = self.next_category_id.max(max_category + 1);
        Ok(())
    }

    fn task_position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|record| record.id.get() == Some(id.get()))
    }

    fn category_position(&self, id: CategoryId) -> Option<usize> {
        self.categories
            .iter()
            .position(|record| record.id.get() == Some(id.get()))
    }

    fn allocate_task_id(&mut self) -> TaskId {
        let id = TaskId(self.next_task_id.max(1));
        self.next_task_id = id.get() + 1;
        id
    }

    fn allocate_category_id(&mut self) -> CategoryId {
        let id = CategoryId(self.next_category_id.max(1));
        self.next_category_id = id.get() + 1;
        id
    }

    fn insert_task(&mut self, draft: TaskDraft, now: OffsetDateTime) -> Result<MutationResponse<TaskRecord>> {
        if let Err(err) = draft.validate() {
            return Ok(MutationResponse::failed(invalid(err)));
        }
        let id = self.allocate_task_id();
        let record = TaskRecord::from_task(&Task::from_draft(id, draft, now))?;
        self.tasks.push(record.clone());
        Ok(MutationResponse::applied(record))
    }

    fn replace_task(
        &mut self,
        id: TaskId,
        update: TaskUpdate,
        now: OffsetDateTime,
    ) -> Result<MutationResponse<TaskRecord>> {
        let Some(index) = self.task_position(id) else {
            return Ok(MutationResponse::failed(RecordFailure::TaskNotFound { id }));
        };
        if update.title.trim().is_empty() {
            return Ok(MutationResponse::failed(RecordFailure::Invalid {
                message: "title is required".into(),
            }));
        }
        let mut task = self.tasks[index].clone().into_task()?;
        task.apply_update(update, now);
        let record = TaskRecord::from_task(&task)?;
        self.tasks[index] = record.clone();
        Ok(MutationResponse::applied(record))
    }

    fn flip_task(&mut self, id: TaskId, now: OffsetDateTime) -> Result<MutationResponse<TaskRecord>> {
        let Some(index) = self.task_position(id) else {
            return Ok(MutationResponse::failed(RecordFailure::TaskNotFound { id }));
        };
        let toggled = self.tasks[index].clone().into_task()?.toggled(now);
        let record = TaskRecord::from_task(&toggled)?;
        self.tasks[index] = record.clone();
        Ok(MutationResponse::applied(record))
    }

    fn remove_task(&mut self, id: TaskId) -> MutationResponse<TaskId> {
        match self.task_position(id) {
            Some(index) => {
                self.tasks.remove(index);
                MutationResponse::applied(id)
            }
            None => MutationResponse::failed(RecordFailure::TaskNotFound { id }),
        }
    }

    fn next_order_index(&self) -> i64 {
        self.categories
            .iter()
            .map(|record| record.order_index)
            .max()
            .map_or(1, |max| max + 1)
    }

    fn order_index_taken(&self, order_index: i64, except: Option<CategoryId>) -> bool {
        self.categories.iter().any(|record| {
            record.order_index == order_index
                && except.is_none_or(|id| record.id.get() != Some(id.get()))
        })
    }

    fn insert_category(&mut self, draft: CategoryDraft) -> MutationResponse<CategoryRecord> {
        if let Err(err) = draft.validate() {
            return MutationResponse::failed(invalid(err));
        }
        let order_index = draft.order_index.unwrap_or_else(|| self.next_order_index());
        if self.order_index_taken(order_index, None) {
            return MutationResponse::failed(RecordFailure::Invalid {
                message: format!("order_index {order_index} is already used"),
            });
        }
        let category = Category {
            id: self.allocate_category_id(),
            name: draft.name,
            color: draft.color,
            icon: draft.icon,
            order_index,
        };
        let record = CategoryRecord::from_category(&category);
        self.categories.push(record.clone());
        MutationResponse::applied(record)
    }

    fn replace_category(&mut self, id: CategoryId, draft: CategoryDraft) -> MutationResponse<CategoryRecord> {
        let Some(index) = self.category_position(id) else {
            return MutationResponse::failed(RecordFailure::CategoryNotFound { id });
        };
        if let Err(err) = draft.validate() {
            return MutationResponse::failed(invalid(err));
        }
        let order_index = draft
            .order_index
            .unwrap_or(self.categories[index].order_index);
        if self.order_index_taken(order_index, Some(id)) {
            return MutationResponse::failed(RecordFailure::Invalid {
                message: format!("order_index {order_index} is already used"),
            });
        }
        let record = CategoryRecord {
            id: id.get().into(),
            name: draft.name,
            color: draft.color,
            icon: draft.icon,
            order_index,
        };
        self.categories[index] = record.clone();
        MutationResponse::applied(record)
    }

    fn remove_category(&mut self, id: CategoryId) -> MutationResponse<CategoryId> {
        match self.category_position(id) {
            Some(index) => {
                self.categories.remove(index);
                MutationResponse::applied(id)
            }
            None => MutationResponse::failed(RecordFailure::CategoryNotFound { id }),
        }
    }
}

fn invalid(err: taskdeck_core::TaskError) -> RecordFailure {
    RecordFailure::Invalid {
        message: match err {
            taskdeck_core::TaskError::Validation(message) => message,
            other => other.to_string(),
        },
    }
}

/// Record store shared by every clone of the handle.
#[derive(Clone, Debug)]
pub struct LocalStore {
    state: Arc<Mutex<StoreDocument>>,
    path: Option<Arc<PathBuf>>,
}

impl LocalStore {
    /// Empty store that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreDocument::default())),
            path: None,
        }
    }

    /// Open the store persisted at `path`. A missing file starts an empty store.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut document = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                StoreDocument::default()
            } else {
                serde_json::from_str::<StoreDocument>(&raw)?
            }
        } else {
            StoreDocument::default()
        };
        document.normalize()?;
        info!(
            path = %path.display(),
            tasks = document.tasks.len(),
            categories = document.categories.len(),
            "Opened local store"
        );
        Ok(Self {
            state: Arc::new(Mutex::new(document)),
            path: Some(Arc::new(path)),
        })
    }

    /// File backing the store, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreDocument>> {
        self.state.lock().map_err(|_| LocalStoreError::LockError)
    }

    /// Apply `change` to a copy of the document; commit and persist only when every record succeeded.
    ///
    /// A successful response without records is a no-op and leaves the file alone.
    fn mutate<T, F>(&self, change: F) -> Result<MutationResponse<T>>
    where
        F: FnOnce(&mut StoreDocument) -> Result<MutationResponse<T>>,
    {
        let mut guard = self.lock()?;
        let mut next = guard.clone();
        let response = change(&mut next)?;
        if response.is_success() && !response.results.is_empty() {
            if let Some(path) = &self.path {
                persist(path, &next)?;
            }
            *guard = next;
        }
        drop(guard);
        Ok(response)
    }

    /// Every task, newest first (ties broken by descending id).
    ///
    /// # Errors
    /// Returns an error if a stored record is malformed or the lock is poisoned.
    pub fn fetch_all(&self) -> Result<Vec<Task>> {
        let records = self.lock()?.tasks.clone();
        let mut tasks = records
            .into_iter()
            .map(TaskRecord::into_task)
            .collect::<Result<Vec<_>>>()?;
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        debug!(count = tasks.len(), "Fetched tasks");
        Ok(tasks)
    }

    /// Tasks matching `query`, evaluated in the store with the shared predicates.
    ///
    /// # Errors
    /// Same as [`Self::fetch_all`].
    pub fn fetch_matching(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let mut tasks = self.fetch_all()?;
        tasks.retain(|task| query.matches(task));
        debug!(?query, count = tasks.len(), "Fetched matching tasks");
        Ok(tasks)
    }

    /// Load a single task.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::TaskNotFound`] if the id is absent.
    pub fn fetch_by_id(&self, id: TaskId) -> Result<Task> {
        let guard = self.lock()?;
        let record = guard
            .task_position(id)
            .map(|index| guard.tasks[index].clone())
            .ok_or(LocalStoreError::TaskNotFound(id))?;
        drop(guard);
        record.into_task()
    }

    /// Create a task from `draft`.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::InvalidDraft`] for a blank title, or an I/O error if persisting fails.
    pub fn create(&self, draft: TaskDraft) -> Result<Task> {
        let now = OffsetDateTime::now_utc();
        let task = self
            .mutate(|doc| doc.insert_task(draft, now))?
            .into_single("create task")?
            .into_task()?;
        info!(task = %task.id, "Created task");
        Ok(task)
    }

    /// Replace every editable field of task `id`.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::TaskNotFound`] if the id is absent.
    pub fn update(&self, id: TaskId, update: TaskUpdate) -> Result<Task> {
        let now = OffsetDateTime::now_utc();
        let task = self
            .mutate(|doc| doc.replace_task(id, update, now))?
            .into_single("update task")?
            .into_task()?;
        info!(task = %id, "Updated task");
        Ok(task)
    }

    /// Flip completion of task `id` under a single lock.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::TaskNotFound`] if the id is absent.
    pub fn toggle_complete(&self, id: TaskId) -> Result<Task> {
        let now = OffsetDateTime::now_utc();
        let task = self
            .mutate(|doc| doc.flip_task(id, now))?
            .into_single("toggle task")?
            .into_task()?;
        info!(task = %id, completed = task.completed, "Toggled task");
        Ok(task)
    }

    /// Delete task `id`.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::TaskNotFound`] if the id is absent.
    pub fn delete(&self, id: TaskId) -> Result<()> {
        self.mutate(|doc| Ok(doc.remove_task(id)))?
            .into_single("delete task")?;
        info!(task = %id, "Deleted task");
        Ok(())
    }

    /// Categories ordered by ascending `order_index`.
    ///
    /// # Errors
    /// Returns an error if a stored record is malformed.
    pub fn categories(&self) -> Result<Vec<Category>> {
        let records = self.lock()?.categories.clone();
        let mut categories = records
            .into_iter()
            .map(CategoryRecord::into_category)
            .collect::<Result<Vec<_>>>()?;
        categories.sort_by_key(|category| (category.order_index, category.id));
        Ok(categories)
    }

    /// Load a single category.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::CategoryNotFound`] if the id is absent.
    pub fn category(&self, id: CategoryId) -> Result<Category> {
        let guard = self.lock()?;
        let record = guard
            .category_position(id)
            .map(|index| guard.categories[index].clone())
            .ok_or(LocalStoreError::CategoryNotFound(id))?;
        drop(guard);
        record.into_category()
    }

    /// Create a category, appending it after the last one unless a position is given.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::InvalidDraft`] for a blank name or a taken position.
    pub fn create_category(&self, draft: CategoryDraft) -> Result<Category> {
        let category = self
            .mutate(|doc| Ok(doc.insert_category(draft)))?
            .into_single("create category")?
            .into_category()?;
        info!(category = %category.id, name = %category.name, "Created category");
        Ok(category)
    }

    /// Replace category `id`; an absent position keeps the current one.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::CategoryNotFound`] if the id is absent.
    pub fn update_category(&self, id: CategoryId, draft: CategoryDraft) -> Result<Category> {
        let category = self
            .mutate(|doc| Ok(doc.replace_category(id, draft)))?
            .into_single("update category")?
            .into_category()?;
        info!(category = %id, "Updated category");
        Ok(category)
    }

    /// Delete category `id`. Tasks that reference it keep the dangling id.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::CategoryNotFound`] if the id is absent.
    pub fn delete_category(&self, id: CategoryId) -> Result<()> {
        self.mutate(|doc| Ok(doc.remove_category(id)))?
            .into_single("delete category")?;
        info!(category = %id, "Deleted category");
        Ok(())
    }

    /// Insert the starter categories when none exist. Returns how many were added.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub fn seed_default_categories(&self) -> Result<usize> {
        let response = self.mutate(|doc| {
            if !doc.categories.is_empty() {
                return Ok(MutationResponse {
                    success: true,
                    message: None,
                    results: Vec::new(),
                });
            }
            let results = DEFAULT_CATEGORIES
                .iter()
                .flat_map(|(name, color, icon)| doc.insert_category(CategoryDraft::new(*name, *color, *icon)).results)
                .collect();
            Ok(MutationResponse {
                success: true,
                message: None,
                results,
            })
        })?;
        let added = response.results.len();
        if added > 0 {
            info!(added, "Seeded default categories");
        }
        Ok(added)
    }

    /// Stored settings, or `None` when nothing has been saved.
    ///
    /// # Errors
    /// Returns an error if the lock is poisoned.
    pub fn settings(&self) -> Result<Option<Settings>> {
        Ok(self.lock()?.settings.clone().map(|record| record.settings))
    }

    /// Store `settings` as the single settings record.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub fn save_settings(&self, settings: Settings) -> Result<Settings> {
        let record = self
            .mutate(|doc| {
                let record = SettingsRecord {
                    id: Some(SETTINGS_RECORD_ID.into()),
                    settings,
                };
                doc.settings = Some(record.clone());
                Ok(MutationResponse::applied(record))
            })?
            .into_single("save settings")?;
        info!("Saved settings");
        Ok(record.settings)
    }

    /// Remove the stored settings record so readers fall back to defaults.
    ///
    /// # Errors
    /// Returns an error if persisting fails.
    pub fn clear_settings(&self) -> Result<()> {
        self.mutate(|doc| {
            doc.settings = None;
            Ok(MutationResponse::applied(()))
        })?
        .into_single("clear settings")?;
        info!("Cleared settings");
        Ok(())
    }
}

fn persist(path: &Path, document: &StoreDocument) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(document)
        .map_err(|err| LocalStoreError::Other(format!("failed to encode store: {err}")))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body)?;
    if let Err(err) = fs::rename(&tmp, path) {
        warn!(path = %path.display(), error = %err, "Failed to replace data file");
        return Err(err.into());
    }
    debug!(path = %path.display(), "Persisted store");
    Ok(())
}
