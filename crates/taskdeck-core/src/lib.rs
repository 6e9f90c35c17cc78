//! Domain types, shared predicates, and the pure filter/view/statistics engine for taskdeck.

/// Weekly agenda grouping.
pub mod agenda;
/// Error taxonomy.
pub mod error;
/// Ad-hoc filter selection.
pub mod filter;
/// Identifier types.
pub mod id;
/// Tasks, categories, and their inputs.
pub mod model;
/// Calendar predicates and store queries.
pub mod predicate;
/// User preferences.
pub mod settings;
/// Aggregate counters.
pub mod stats;
/// Free-text search.
pub mod text_matcher;
/// Named views.
pub mod view;

pub use agenda::{AgendaDay, WeekAgenda};
pub use error::{Result, TaskError};
pub use filter::{CategoryFilter, FilterSelection, PriorityFilter, StatusFilter};
pub use id::{CategoryId, TaskId};
pub use model::{Category, CategoryDraft, Priority, Task, TaskDraft, TaskUpdate};
pub use predicate::{TaskQuery, local_today};
pub use settings::{Settings, SettingsPatch};
pub use stats::TaskStats;
pub use view::NamedView;
