//! # Storage Layer
//!
//! Persistence for todo-pro. Everything lives in plain files in the
//! workspace directory.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSON array, 4-space indent | `tareas.json` |
//! | Audit log | Append-only text | `acciones.log` |
//! | Config | TOML | `todo.toml`, `~/.config/todo-pro/config.toml` |
//!
//! ## Safety
//!
//! - [`TaskFile`] rewrites the whole file through a temp file + rename,
//!   holding an `fs2` lock only while reading or writing
//! - Older task file shapes are migrated on load (see [`Schema`])
//! - A malformed task file is an error, never silently replaced
//!
//! ## Key Types
//!
//! - [`TaskFile`] - Read/write the task collection
//! - [`AuditLog`] - Append audit entries
//! - [`Config`] - Workspace and global configuration

mod audit;
mod config;
mod file;
mod schema;

pub use audit::AuditLog;
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, WorkspaceConfig, WORKSPACE_CONFIG};
pub use file::{StorageError, TaskFile};
pub use schema::{decode, encode, to_pretty_json, Loaded, Schema, SchemaError};
