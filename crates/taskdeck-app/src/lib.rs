//! Application layer for taskdeck.
//!
//! This crate owns the session: the async store contract, the task lifecycle
//! manager and its cache, filter selection and board selectors, the category
//! catalog, settings access, and configuration loading.

pub mod async_store;
pub mod board;
pub mod categories;
pub mod config;
pub mod filter_util;
pub mod lifecycle;
pub mod settings;
pub mod task_cache;

// Re-exports for convenience
pub use async_store::{AsyncCategoryStore, AsyncSettingsStore, AsyncTaskStore};
pub use board::{BoardView, TaskBoard};
pub use categories::{CategoryCatalog, badge_color};
pub use config::{AppConfig, ConfigError, StoreConfig};
pub use filter_util::{FilterBuildError, FilterBuildResult, TaskFilterBuilder};
pub use lifecycle::{LifecycleError, LoadState, Operation, SessionSnapshot, TaskLifecycle};
pub use settings::SettingsService;
pub use task_cache::TaskCache;
