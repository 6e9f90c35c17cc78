//! Error taxonomy shared by the store client and the lifecycle manager.

use thiserror::Error;

use crate::id::{CategoryId, TaskId};

/// Failures a task store can report, independent of the transport behind it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// The referenced task does not exist at the store.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// The referenced category does not exist at the store.
    #[error("category {0} not found")]
    CategoryNotFound(CategoryId),

    /// A caller-supplied draft is missing required fields.
    #[error("validation error: {0}")]
    Validation(String),

    /// Transport or backend failure; the message is opaque.
    #[error("store error: {0}")]
    Store(String),
}

/// Result alias for store-facing operations.
pub type Result<T> = std::result::Result<T, TaskError>;

impl TaskError {
    /// Build a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Build an opaque store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Whether the error means the referenced record is absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::CategoryNotFound(_))
    }
}
