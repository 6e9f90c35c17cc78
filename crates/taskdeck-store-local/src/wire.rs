//! Record shapes exchanged with the store and their normalization into the domain model.
//!
//! Records tolerate the spellings seen across backends: ids as integers or numeric
//! strings under `id` or `Id`, due dates as `YYYY-MM-DD` or full RFC 3339 timestamps,
//! and blank strings standing in for null.

use serde::{Deserialize, Serialize};
use taskdeck_core::{Category, CategoryId, Priority, Settings, Task, TaskId};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::LocalStoreError;

/// Identifier as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// Integer id.
    Number(u64),
    /// Numeric string id.
    Text(String),
}

impl RawId {
    /// Numeric value, if the id is well formed.
    #[must_use]
    pub fn get(&self) -> Option<u64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    fn require(&self, field: &str) -> Result<u64, LocalStoreError> {
        self.get()
            .ok_or_else(|| LocalStoreError::MalformedRecord(format!("{field} is not numeric: {self:?}")))
    }
}

impl From<u64> for RawId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

/// Task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Record id.
    #[serde(alias = "Id")]
    pub id: RawId,
    /// Title.
    pub title: String,
    /// Description; blank means none.
    #[serde(default)]
    pub description: Option<String>,
    /// `low`, `medium`, or `high`; blank means medium.
    #[serde(default)]
    pub priority: Option<String>,
    /// Date-only string or timestamp; blank means none.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Completion flag.
    #[serde(default)]
    pub completed: bool,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 completion timestamp.
    #[serde(default)]
    pub completed_at: Option<String>,
    /// Owning category.
    pub category_id: RawId,
}

impl TaskRecord {
    /// Render a domain task in wire form.
    ///
    /// # Errors
    /// Returns an error if a timestamp cannot be formatted.
    pub fn from_task(task: &Task) -> Result<Self, LocalStoreError> {
        Ok(Self {
            id: task.id.get().into(),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: Some(task.priority.as_str().to_string()),
            due_date: task.due_date.map(format_date).transpose()?,
            completed: task.completed,
            created_at: format_timestamp(task.created_at)?,
            completed_at: task.completed_at.map(format_timestamp).transpose()?,
            category_id: task.category_id.get().into(),
        })
    }

    /// Normalize into the domain model.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::MalformedRecord`] when a field cannot be interpreted.
    pub fn into_task(self) -> Result<Task, LocalStoreError> {
        let id = TaskId(self.id.require("task id")?);
        let priority = match non_blank(self.priority) {
            Some(token) => token
                .parse::<Priority>()
                .map_err(|err| LocalStoreError::MalformedRecord(format!("task {id}: {err}")))?,
            None => Priority::default(),
        };
        let completed_at = if self.completed {
            non_blank(self.completed_at)
                .as_deref()
                .map(parse_timestamp)
                .transpose()?
        } else {
            None
        };
        Ok(Task {
            id,
            title: self.title,
            description: non_blank(self.description),
            category_id: CategoryId(self.category_id.require("category_id")?),
            priority,
            due_date: non_blank(self.due_date).as_deref().map(parse_due_date).transpose()?,
            completed: self.completed,
            created_at: parse_timestamp(&self.created_at)?,
            completed_at,
        })
    }
}

/// Category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    /// Record id.
    #[serde(alias = "Id")]
    pub id: RawId,
    /// Display name.
    #[serde(alias = "Name")]
    pub name: String,
    /// Semantic color token.
    #[serde(default)]
    pub color: String,
    /// Symbolic icon name.
    #[serde(default)]
    pub icon: String,
    /// Ascending display order.
    #[serde(default = "first_position")]
    pub order_index: i64,
}

const fn first_position() -> i64 {
    1
}

impl CategoryRecord {
    /// Render a domain category in wire form.
    #[must_use]
    pub fn from_category(category: &Category) -> Self {
        Self {
            id: category.id.get().into(),
            name: category.name.clone(),
            color: category.color.clone(),
            icon: category.icon.clone(),
            order_index: category.order_index,
        }
    }

    /// Normalize into the domain model.
    ///
    /// # Errors
    /// Returns [`LocalStoreError::MalformedRecord`] when the id is not numeric.
    pub fn into_category(self) -> Result<Category, LocalStoreError> {
        Ok(Category {
            id: CategoryId(self.id.require("category id")?),
            name: self.name,
            color: self.color,
            icon: self.icon,
            order_index: self.order_index,
        })
    }
}

/// Single persisted settings row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    /// Record id.
    #[serde(alias = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RawId>,
    /// Preference values; missing keys fall back to defaults.
    #[serde(flatten)]
    pub settings: Settings,
}

/// Why one record in a mutation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordFailure {
    /// The task id is unknown.
    TaskNotFound {
        /// Requested id.
        id: TaskId,
    },
    /// The category id is unknown.
    CategoryNotFound {
        /// Requested id.
        id: CategoryId,
    },
    /// A required field is missing or invalid.
    Invalid {
        /// Explanation.
        message: String,
    },
}

/// Outcome for one record of a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordResult<T> {
    /// Whether this record was applied.
    pub success: bool,
    /// Resulting record when applied.
    pub data: Option<T>,
    /// Failure details when not applied.
    #[serde(default)]
    pub failure: Option<RecordFailure>,
}

/// Envelope returned by every mutation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse<T> {
    /// Overall success flag.
    pub success: bool,
    /// Message accompanying a failure.
    #[serde(default)]
    pub message: Option<String>,
    /// One entry per submitted record.
    #[serde(default = "Vec::new")]
    pub results: Vec<RecordResult<T>>,
}

impl<T> MutationResponse<T> {
    /// Successful single-record response.
    pub fn applied(data: T) -> Self {
        Self {
            success: true,
            message: None,
            results: vec![RecordResult {
                success: true,
                data: Some(data),
                failure: None,
            }],
        }
    }

    /// Response whose only record failed.
    #[must_use]
    pub fn failed(failure: RecordFailure) -> Self {
        Self {
            success: true,
            message: None,
            results: vec![RecordResult {
                success: false,
                data: None,
                failure: Some(failure),
            }],
        }
    }

    /// Whether the overall flag and every record entry report success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success && self.results.iter().all(|result| result.success)
    }

    /// Extract the single applied record.
    ///
    /// # Errors
    /// A false flag, a failed record entry, or an empty result set is an error.
    pub fn into_single(self, operation: &'static str) -> Result<T, LocalStoreError> {
        if let Some(failure) = self
            .results
            .iter()
            .find(|result| !result.success)
            .map(|result| result.failure.clone())
        {
            return Err(match failure {
                Some(RecordFailure::TaskNotFound { id }) => LocalStoreError::TaskNotFound(id),
                Some(RecordFailure::CategoryNotFound { id }) => LocalStoreError::CategoryNotFound(id),
                Some(RecordFailure::Invalid { message }) => LocalStoreError::InvalidDraft(message),
                None => LocalStoreError::Rejected {
                    operation,
                    message: "record failed without details".into(),
                },
            });
        }
        if !self.success {
            return Err(LocalStoreError::Rejected {
                operation,
                message: self.message.unwrap_or_else(|| "request failed".into()),
            });
        }
        self.results
            .into_iter()
            .find_map(|result| result.data)
            .ok_or_else(|| LocalStoreError::Rejected {
                operation,
                message: "empty result set".into(),
            })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, LocalStoreError> {
    OffsetDateTime::parse(raw.trim(), &Rfc3339)
        .map_err(|err| LocalStoreError::MalformedRecord(format!("invalid timestamp {raw:?}: {err}")))
}

fn format_timestamp(value: OffsetDateTime) -> Result<String, LocalStoreError> {
    value
        .format(&Rfc3339)
        .map_err(|err| LocalStoreError::Other(format!("failed to format timestamp: {err}")))
}

fn format_date(value: Date) -> Result<String, LocalStoreError> {
    value
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(|err| LocalStoreError::Other(format!("failed to format date: {err}")))
}

/// Accept a date-only string or a full timestamp reduced to its calendar day.
///
/// # Errors
/// Returns [`LocalStoreError::MalformedRecord`] when neither form parses.
pub fn parse_due_date(raw: &str) -> Result<Date, LocalStoreError> {
    let trimmed = raw.trim();
    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .or_else(|_| OffsetDateTime::parse(trimmed, &Rfc3339).map(OffsetDateTime::date))
        .map_err(|err| LocalStoreError::MalformedRecord(format!("invalid due date {raw:?}: {err}")))
}
