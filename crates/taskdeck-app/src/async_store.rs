//! Async store client contract used by the lifecycle manager and selectors.

use taskdeck_core::{
    Category, CategoryDraft, CategoryId, Settings, Task, TaskDraft, TaskError, TaskId, TaskQuery,
    TaskUpdate,
};
use taskdeck_store_local::{LocalStore, LocalStoreError};
use time::Date;

/// Async task storage.
///
/// Transport failures are reported through `Self::Error` and translated into the
/// shared [`TaskError`] taxonomy by callers.
#[allow(async_fn_in_trait)]
pub trait AsyncTaskStore: Send + Sync {
    /// Error type bubbled up from the backing store.
    type Error: Into<TaskError> + Send;

    /// Load every task, newest first.
    ///
    /// # Errors
    /// Returns a store-specific error on transport or backend failure.
    async fn fetch_all(&self) -> Result<Vec<Task>, Self::Error>;

    /// Load a single task.
    ///
    /// # Errors
    /// Returns a not-found error when the id is absent.
    async fn fetch_by_id(&self, id: TaskId) -> Result<Task, Self::Error>;

    /// Create a task and return the stored record.
    ///
    /// # Errors
    /// Returns a store-specific error when the record is rejected.
    async fn create(&self, draft: TaskDraft) -> Result<Task, Self::Error>;

    /// Replace every editable field of a task.
    ///
    /// # Errors
    /// Returns a not-found error when the id is absent.
    async fn update(&self, id: TaskId, update: TaskUpdate) -> Result<Task, Self::Error>;

    /// Delete a task.
    ///
    /// # Errors
    /// Returns a not-found error when the id is absent.
    async fn delete(&self, id: TaskId) -> Result<(), Self::Error>;

    /// Flip completion atomically from the store's perspective.
    ///
    /// # Errors
    /// Returns a not-found error when the id is absent.
    async fn toggle_complete(&self, id: TaskId) -> Result<Task, Self::Error>;

    /// Tasks matching `query`. Stores without native filtering use this client-side default.
    ///
    /// # Errors
    /// Same as [`Self::fetch_all`].
    async fn fetch_matching(&self, query: TaskQuery) -> Result<Vec<Task>, Self::Error> {
        let tasks = self.fetch_all().await?;
        Ok(tasks.into_iter().filter(|task| query.matches(task)).collect())
    }

    /// Tasks in one category.
    ///
    /// # Errors
    /// Same as [`Self::fetch_all`].
    async fn fetch_by_category(&self, category: CategoryId) -> Result<Vec<Task>, Self::Error> {
        self.fetch_matching(TaskQuery::ByCategory(category)).await
    }

    /// Completed tasks.
    ///
    /// # Errors
    /// Same as [`Self::fetch_all`].
    async fn fetch_completed(&self) -> Result<Vec<Task>, Self::Error> {
        self.fetch_matching(TaskQuery::Completed).await
    }

    /// Pending tasks.
    ///
    /// # Errors
    /// Same as [`Self::fetch_all`].
    async fn fetch_pending(&self) -> Result<Vec<Task>, Self::Error> {
        self.fetch_matching(TaskQuery::Pending).await
    }

    /// Pending tasks due before `today`.
    ///
    /// # Errors
    /// Same as [`Self::fetch_all`].
    async fn fetch_overdue(&self, today: Date) -> Result<Vec<Task>, Self::Error> {
        self.fetch_matching(TaskQuery::Overdue { today }).await
    }

    /// Tasks due on `today`.
    ///
    /// # Errors
    /// Same as [`Self::fetch_all`].
    async fn fetch_due_today(&self, today: Date) -> Result<Vec<Task>, Self::Error> {
        self.fetch_matching(TaskQuery::DueToday { today }).await
    }

    /// Tasks due in the Monday-start week containing `today`.
    ///
    /// # Errors
    /// Same as [`Self::fetch_all`].
    async fn fetch_due_this_week(&self, today: Date) -> Result<Vec<Task>, Self::Error> {
        self.fetch_matching(TaskQuery::DueThisWeek { today }).await
    }
}

/// Async category storage.
#[allow(async_fn_in_trait)]
pub trait AsyncCategoryStore: Send + Sync {
    /// Error type bubbled up from the backing store.
    type Error: Into<TaskError> + Send;

    /// Categories in ascending `order_index`.
    ///
    /// # Errors
    /// Returns a store-specific error on failure.
    async fn fetch_categories(&self) -> Result<Vec<Category>, Self::Error>;

    /// Load a single category.
    ///
    /// # Errors
    /// Returns a not-found error when the id is absent.
    async fn fetch_category(&self, id: CategoryId) -> Result<Category, Self::Error>;

    /// Create a category.
    ///
    /// # Errors
    /// Returns a store-specific error when the record is rejected.
    async fn create_category(&self, draft: CategoryDraft) -> Result<Category, Self::Error>;

    /// Replace a category.
    ///
    /// # Errors
    /// Returns a not-found error when the id is absent.
    async fn update_category(&self, id: CategoryId, draft: CategoryDraft) -> Result<Category, Self::Error>;

    /// Delete a category.
    ///
    /// # Errors
    /// Returns a not-found error when the id is absent.
    async fn delete_category(&self, id: CategoryId) -> Result<(), Self::Error>;
}

/// Async settings storage holding at most one record.
#[allow(async_fn_in_trait)]
pub trait AsyncSettingsStore: Send + Sync {
    /// Error type bubbled up from the backing store.
    type Error: Into<TaskError> + Send;

    /// The stored record, or `None` when nothing was saved.
    ///
    /// # Errors
    /// Returns a store-specific error on failure.
    async fn fetch_settings(&self) -> Result<Option<Settings>, Self::Error>;

    /// Store `settings` as the single record.
    ///
    /// # Errors
    /// Returns a store-specific error on failure.
    async fn save_settings(&self, settings: Settings) -> Result<Settings, Self::Error>;

    /// Remove the stored record.
    ///
    /// # Errors
    /// Returns a store-specific error on failure.
    async fn clear_settings(&self) -> Result<(), Self::Error>;
}

/// Run a blocking store call on the blocking pool with a cloned handle.
async fn blocking<T, F>(store: &LocalStore, call: F) -> Result<T, LocalStoreError>
where
    T: Send + 'static,
    F: FnOnce(LocalStore) -> Result<T, LocalStoreError> + Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || call(store))
        .await
        .map_err(|e| LocalStoreError::Other(format!("Task join error: {e}")))?
}

impl AsyncTaskStore for LocalStore {
    type Error = LocalStoreError;

    async fn fetch_all(&self) -> Result<Vec<Task>, Self::Error> {
        blocking(self, |store| store.fetch_all()).await
    }

    async fn fetch_by_id(&self, id: TaskId) -> Result<Task, Self::Error> {
        blocking(self, move |store| store.fetch_by_id(id)).await
    }

    async fn create(&self, draft: TaskDraft) -> Result<Task, Self::Error> {
        blocking(self, move |store| store.create(draft)).await
    }

    async fn update(&self, id: TaskId, update: TaskUpdate) -> Result<Task, Self::Error> {
        blocking(self, move |store| store.update(id, update)).await
    }

    async fn delete(&self, id: TaskId) -> Result<(), Self::Error> {
        blocking(self, move |store| store.delete(id)).await
    }

    async fn toggle_complete(&self, id: TaskId) -> Result<Task, Self::Error> {
        blocking(self, move |store| store.toggle_complete(id)).await
    }

    async fn fetch_matching(&self, query: TaskQuery) -> Result<Vec<Task>, Self::Error> {
        blocking(self, move |store| store.fetch_matching(&query)).await
    }
}

impl AsyncCategoryStore for LocalStore {
    type Error = LocalStoreError;

    async fn fetch_categories(&self) -> Result<Vec<Category>, Self::Error> {
        blocking(self, |store| store.categories()).await
    }

    async fn fetch_category(&self, id: CategoryId) -> Result<Category, Self::Error> {
        blocking(self, move |store| store.category(id)).await
    }

    async fn create_category(&self, draft: CategoryDraft) -> Result<Category, Self::Error> {
        blocking(self, move |store| store.create_category(draft)).await
    }

    async fn update_category(&self, id: CategoryId, draft: CategoryDraft) -> Result<Category, Self::Error> {
        blocking(self, move |store| store.update_category(id, draft)).await
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), Self::Error> {
        blocking(self, move |store| store.delete_category(id)).await
    }
}

impl AsyncSettingsStore for LocalStore {
    type Error = LocalStoreError;

    async fn fetch_settings(&self) -> Result<Option<Settings>, Self::Error> {
        blocking(self, |store| store.settings()).await
    }

    async fn save_settings(&self, settings: Settings) -> Result<Settings, Self::Error> {
        blocking(self, move |store| store.save_settings(settings)).await
    }

    async fn clear_settings(&self) -> Result<(), Self::Error> {
        blocking(self, |store| store.clear_settings()).await
    }
}
