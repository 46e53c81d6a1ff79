//! Task domain model
//!
//! A task is one to-do item: a description, a completion flag, a priority and
//! the moment it was created. The creation stamp is fixed at construction and
//! survives every edit.
//!
//! The persisted form is [`TaskRecord`], whose field names (`descripcion`,
//! `completada`, `prioridad`, `fecha_creacion`) are the on-disk contract shared
//! with files written by earlier versions of the tool.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::TaskId;

/// Timestamp handling for `YYYY-MM-DD HH:MM:SS` local times
///
/// The format is fixed-width, so lexical order equals chronological order.
pub mod timestamp {
    use chrono::{Local, NaiveDateTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Current local time truncated to whole seconds
    pub fn now() -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }

    /// Formats a timestamp in the persisted format
    pub fn format(value: &NaiveDateTime) -> String {
        value.format(FORMAT).to_string()
    }

    /// Parses a timestamp in the persisted format
    pub fn parse(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(value.trim(), FORMAT)
    }

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(|e| {
            serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e))
        })
    }
}

/// Priority of a task
///
/// Canonical values are `alta`, `media` and `baja`. Input is case-insensitive
/// and also accepts `high`, `medium` and `low`. Anything else is kept as
/// typed (lowercased) and ranks like `media`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
    Other(String),
}

impl Priority {
    /// Normalizes free-form input into a priority
    pub fn parse(input: &str) -> Self {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            "alta" | "high" => Priority::High,
            "media" | "medium" => Priority::Medium,
            "baja" | "low" => Priority::Low,
            _ => Priority::Other(normalized),
        }
    }

    /// Sort rank: high 1, medium 2, low 3, unknown 2
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium | Priority::Other(_) => 2,
            Priority::Low => 3,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Priority::High => "alta",
            Priority::Medium => "media",
            Priority::Low => "baja",
            Priority::Other(s) => s,
        }
    }

    /// Returns true for one of the three canonical values
    pub fn is_canonical(&self) -> bool {
        !matches!(self, Priority::Other(_))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        Priority::parse(&value)
    }
}

impl From<&str> for Priority {
    fn from(value: &str) -> Self {
        Priority::parse(value)
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

/// A task owned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Store-assigned identifier
    pub id: TaskId,

    /// What needs doing
    pub description: String,

    /// Whether the task is done
    pub completed: bool,

    /// Priority
    pub priority: Priority,

    /// When the task was created (never modified)
    #[serde(with = "timestamp")]
    created_at: NaiveDateTime,
}

impl Task {
    /// Creates a pending task stamped with the current local time
    pub fn new(id: TaskId, description: impl Into<String>, priority: Priority) -> Self {
        Self {
            id,
            description: description.into(),
            completed: false,
            priority,
            created_at: timestamp::now(),
        }
    }

    /// Rebuilds a task from its persisted form under the given id
    pub fn from_record(record: TaskRecord, id: TaskId) -> Self {
        Self {
            id,
            description: record.description,
            completed: record.completed,
            priority: record.priority,
            created_at: record.created_at,
        }
    }

    /// Returns the persisted form, including the id
    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            id: Some(self.id),
            description: self.description.clone(),
            completed: self.completed,
            priority: self.priority.clone(),
            created_at: self.created_at,
        }
    }

    /// When the task was created
    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// Creation time in the persisted `YYYY-MM-DD HH:MM:SS` format
    pub fn created_at_str(&self) -> String {
        timestamp::format(&self.created_at)
    }

    /// Marks the task as done (idempotent)
    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    /// Returns true if the task is not done yet
    pub fn is_pending(&self) -> bool {
        !self.completed
    }

    /// Replaces the description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Replaces the priority
    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }
}

/// Persisted form of a task
///
/// Missing `prioridad`, `completada` and `fecha_creacion` fall back to
/// `media`, `false` and the current time. `id` is absent in files written by
/// older versions, where the id is implied by position or by an object key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,

    #[serde(rename = "descripcion")]
    pub description: String,

    #[serde(rename = "completada", default)]
    pub completed: bool,

    #[serde(rename = "prioridad", default)]
    pub priority: Priority,

    #[serde(rename = "fecha_creacion", default = "timestamp::now", with = "timestamp")]
    pub created_at: NaiveDateTime,
}
