//! Error types for local store operations.

use taskdeck_core::{CategoryId, TaskError, TaskId};
use thiserror::Error;

/// Errors that can occur during `LocalStore` operations.
#[derive(Error, Debug)]
pub enum LocalStoreError {
    /// Task was not found in the store.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// Category was not found in the store.
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// Submitted draft is missing required fields.
    #[error("Invalid record: {0}")]
    InvalidDraft(String),

    /// A stored record could not be normalized into the domain model.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// The store answered with `success: false` or a failed record entry.
    #[error("Store rejected {operation}: {message}")]
    Rejected {
        /// Operation name.
        operation: &'static str,
        /// Message reported by the store.
        message: String,
    },

    /// The data file could not be parsed.
    #[error("Failed to parse data file: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Failed to acquire the store lock.
    #[error("Store lock error")]
    LockError,

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Other unclassified error.
    #[error("Other error: {0}")]
    Other(String),
}

impl From<LocalStoreError> for TaskError {
    fn from(err: LocalStoreError) -> Self {
        match err {
            LocalStoreError::TaskNotFound(id) => Self::NotFound(id),
            LocalStoreError::CategoryNotFound(id) => Self::CategoryNotFound(id),
            LocalStoreError::InvalidDraft(message) => Self::Validation(message),
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<TaskError> for LocalStoreError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(id) => Self::TaskNotFound(id),
            TaskError::CategoryNotFound(id) => Self::CategoryNotFound(id),
            TaskError::Validation(message) => Self::InvalidDraft(message),
            TaskError::Store(message) => Self::Other(message),
        }
    }
}
