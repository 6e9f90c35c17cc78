use std::fmt::{self, Display};
use std::str::FromStr;

use taskdeck_core::{CategoryFilter, CategoryId, FilterSelection, Priority, PriorityFilter, StatusFilter};
use thiserror::Error;

/// Error type returned while building a [`FilterSelection`] from user-facing inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterBuildError {
    #[error("invalid status filter: {token}")]
    InvalidStatus { token: String },
    #[error("invalid priority filter: {token}")]
    InvalidPriority { token: String },
    #[error("invalid category filter: {token}")]
    InvalidCategory { token: String },
    #[error("unknown filter: {key}")]
    UnknownFilter { key: String },
}

/// Result alias for filter construction helpers.
pub type FilterBuildResult<T> = Result<T, FilterBuildError>;

/// Builder that accepts user-facing strings and normalizes them into a [`FilterSelection`].
#[derive(Debug, Clone, Default)]
pub struct TaskFilterBuilder {
    status: StatusFilter,
    priority: PriorityFilter,
    category: CategoryFilter,
    text: String,
}

impl TaskFilterBuilder {
    /// Create a builder that passes everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing selection.
    #[must_use]
    pub fn from_selection(selection: &FilterSelection) -> Self {
        Self {
            status: selection.status,
            priority: selection.priority,
            category: selection.category,
            text: selection.search.clone(),
        }
    }

    /// Set the completion filter (`all`, `pending`, `completed`).
    ///
    /// # Errors
    /// Returns an error if the token is not a known status.
    pub fn with_status(mut self, token: &str) -> FilterBuildResult<Self> {
        self.status = parse_status_token(token)?;
        Ok(self)
    }

    /// Set the priority filter (`all` or a priority name, case-insensitive).
    ///
    /// # Errors
    /// Returns an error if the token is not a known priority.
    pub fn with_priority(mut self, token: &str) -> FilterBuildResult<Self> {
        self.priority = parse_priority_token(token)?;
        Ok(self)
    }

    /// Set the category filter (`all` or a numeric id, optionally `#`-prefixed).
    ///
    /// # Errors
    /// Returns an error if the token is neither `all` nor an id.
    pub fn with_category(mut self, token: &str) -> FilterBuildResult<Self> {
        self.category = parse_category_token(token)?;
        Ok(self)
    }

    /// Configure the search text. Whitespace-only inputs become empty; other text is kept as typed.
    #[must_use]
    pub fn with_text(mut self, text: Option<String>) -> Self {
        self.text = text.filter(|raw| !raw.trim().is_empty()).unwrap_or_default();
        self
    }

    /// Build the final [`FilterSelection`].
    #[must_use]
    pub fn build(self) -> FilterSelection {
        FilterSelection {
            status: self.status,
            priority: self.priority,
            category: self.category,
            search: self.text,
        }
    }
}

fn is_all(token: &str) -> bool {
    token.is_empty() || token.eq_ignore_ascii_case("all")
}

/// Convert a status token into a [`StatusFilter`].
///
/// # Errors
/// Returns an error if the token does not name a status.
pub fn parse_status_token(token: &str) -> FilterBuildResult<StatusFilter> {
    let normalized = token.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "" | "all" => Ok(StatusFilter::All),
        "pending" | "open" | "todo" => Ok(StatusFilter::Pending),
        "completed" | "done" => Ok(StatusFilter::Completed),
        _ => Err(FilterBuildError::InvalidStatus {
            token: token.to_string(),
        }),
    }
}

/// Convert a priority token into a [`PriorityFilter`].
///
/// # Errors
/// Returns an error if the token does not name a priority.
pub fn parse_priority_token(token: &str) -> FilterBuildResult<PriorityFilter> {
    let trimmed = token.trim();
    if is_all(trimmed) {
        return Ok(PriorityFilter::All);
    }
    Priority::from_str(trimmed)
        .map(PriorityFilter::Only)
        .map_err(|_| FilterBuildError::InvalidPriority {
            token: token.to_string(),
        })
}

/// Convert a category token into a [`CategoryFilter`].
///
/// # Errors
/// Returns an error if the token is neither `all` nor a category id.
pub fn parse_category_token(token: &str) -> FilterBuildResult<CategoryFilter> {
    let trimmed = token.trim();
    if is_all(trimmed) {
        return Ok(CategoryFilter::All);
    }
    CategoryId::from_str(trimmed)
        .map(CategoryFilter::Only)
        .map_err(|_| FilterBuildError::InvalidCategory {
            token: token.to_string(),
        })
}

impl FilterBuildError {
    /// Convert the error into a message that is friendly for end-users.
    #[must_use]
    pub fn describe_user_facing(&self) -> String {
        match self {
            Self::InvalidStatus { token } => {
                format!("Unknown status \"{token}\" (expected all, pending, or completed)")
            }
            Self::InvalidPriority { token } => {
                format!("Unknown priority \"{token}\" (expected all, low, medium, or high)")
            }
            Self::InvalidCategory { token } => {
                format!("Unknown category \"{token}\" (expected all or a category id)")
            }
            Self::UnknownFilter { key } => {
                format!("Unknown filter \"{key}\" (expected status, priority, category, or search)")
            }
        }
    }
}

impl Display for TaskFilterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFilterBuilder")
            .field("status", &self.status)
            .field("priority", &self.priority)
            .field("category", &self.category)
            .field("text", &self.text)
            .finish()
    }
}
