//! On-disk schema versions of the task file
//!
//! Three shapes have existed:
//!
//! | Version | Shape | Ids |
//! |---------|-------|-----|
//! | [`Schema::Keyed`] | `{"3": {...}, "7": {...}}` | object keys |
//! | [`Schema::Positional`] | `[{...}, {...}]` | 1-based list position |
//! | [`Schema::Identified`] | `[{"id": 3, ...}, {"id": 7, ...}]` | `id` field |
//!
//! Every version is readable; only `Identified` is written.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{Task, TaskId, TaskRecord};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a list or an object of tasks, found {0}")]
    UnexpectedShape(&'static str),

    #[error("task key '{0}' is not a positive integer")]
    BadKey(String),

    #[error("task {at} is invalid: {source}")]
    BadRecord {
        at: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("task id {0} appears more than once")]
    DuplicateId(TaskId),

    #[error("task id {0} leaves no id for new tasks")]
    IdsExhausted(TaskId),
}

/// Detected on-disk schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// Legacy object keyed by string id
    Keyed,
    /// Legacy array, ids implied by position
    Positional,
    /// Current array with explicit ids
    Identified,
}

impl Schema {
    /// Identifies the schema of a parsed document
    ///
    /// An array where only some records carry an id is read as `Positional`.
    pub fn detect(value: &Value) -> Result<Self, SchemaError> {
        match value {
            Value::Object(_) => Ok(Schema::Keyed),
            Value::Array(items)
                if !items.is_empty()
                    && items
                        .iter()
                        .all(|item| item.get("id").is_some_and(|id| !id.is_null())) =>
            {
                Ok(Schema::Identified)
            }
            Value::Array(_) => Ok(Schema::Positional),
            other => Err(SchemaError::UnexpectedShape(kind_of(other))),
        }
    }
}

/// Tasks recovered from a file, ready for the store
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub tasks: BTreeMap<TaskId, Task>,
    pub next_id: TaskId,
    /// `None` when there was no file
    pub schema: Option<Schema>,
}

impl Loaded {
    /// State of a store with no file yet
    pub fn empty() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: TaskId::FIRST,
            schema: None,
        }
    }
}

/// Parses file content of any schema version
pub fn decode(content: &str) -> Result<Loaded, SchemaError> {
    let value: Value = serde_json::from_str(content)?;
    let schema = Schema::detect(&value)?;

    let (tasks, next_id) = match (schema, value) {
        (Schema::Keyed, Value::Object(map)) => migrate_keyed(map)?,
        (Schema::Positional, Value::Array(items)) => migrate_positional(items)?,
        (Schema::Identified, Value::Array(items)) => migrate_identified(items)?,
        (_, other) => return Err(SchemaError::UnexpectedShape(kind_of(&other))),
    };

    Ok(Loaded {
        tasks,
        next_id,
        schema: Some(schema),
    })
}

/// Serializes tasks in the `Identified` schema, ascending by id
pub fn encode(tasks: &BTreeMap<TaskId, Task>) -> Result<Vec<u8>, serde_json::Error> {
    let records: Vec<TaskRecord> = tasks.values().map(Task::to_record).collect();
    to_pretty_json(&records)
}

/// Pretty-prints JSON with four-space indentation
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

type Migrated = (BTreeMap<TaskId, Task>, TaskId);

fn migrate_keyed(map: Map<String, Value>) -> Result<Migrated, SchemaError> {
    let mut tasks = BTreeMap::new();

    for (key, value) in map {
        let id: TaskId = key.parse().map_err(|_| SchemaError::BadKey(key.clone()))?;
        let record: TaskRecord = serde_json::from_value(value).map_err(|source| {
            SchemaError::BadRecord {
                at: format!("'{}'", key),
                source,
            }
        })?;

        if tasks.insert(id, Task::from_record(record, id)).is_some() {
            return Err(SchemaError::DuplicateId(id));
        }
    }

    let next_id = next_after(&tasks)?;
    Ok((tasks, next_id))
}

fn migrate_positional(items: Vec<Value>) -> Result<Migrated, SchemaError> {
    let mut tasks = BTreeMap::new();
    let mut id = TaskId::FIRST;

    for (index, value) in items.into_iter().enumerate() {
        let mut record: TaskRecord =
            serde_json::from_value(value).map_err(|source| SchemaError::BadRecord {
                at: format!("at position {}", index + 1),
                source,
            })?;
        // position wins over any stray id in a mixed file
        record.id = None;
        tasks.insert(id, Task::from_record(record, id));
        id = id.next().ok_or(SchemaError::IdsExhausted(id))?;
    }

    Ok((tasks, id))
}

fn migrate_identified(items: Vec<Value>) -> Result<Migrated, SchemaError> {
    let mut tasks = BTreeMap::new();

    for (index, value) in items.into_iter().enumerate() {
        let record: TaskRecord =
            serde_json::from_value(value).map_err(|source| SchemaError::BadRecord {
                at: format!("at position {}", index + 1),
                source,
            })?;
        let Some(id) = record.id else {
            return Err(SchemaError::UnexpectedShape("a task without id"));
        };

        if tasks.insert(id, Task::from_record(record, id)).is_some() {
            return Err(SchemaError::DuplicateId(id));
        }
    }

    let next_id = next_after(&tasks)?;
    Ok((tasks, next_id))
}

fn next_after(tasks: &BTreeMap<TaskId, Task>) -> Result<TaskId, SchemaError> {
    match tasks.keys().next_back() {
        None => Ok(TaskId::FIRST),
        Some(&last) => last.next().ok_or(SchemaError::IdsExhausted(last)),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
