//! # Command-Line Interface
//!
//! User-facing commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `add`, `done`, `delete`, `edit` | Change tasks |
//! | `list`, `search`, `stats` | Inspect tasks |
//! | `export` | Write tasks to json, txt, csv or xlsx |
//! | `shell` | Interactive session; adds `undo` and `redo` |
//! | `init` | Write a default `todo.toml` |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! todo --verbose list
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] with parsed arguments to execute a command.

mod app;
mod output;
mod prompt;
mod shell;
mod task;

pub use app::{run, Cli, Commands};
pub use crate::storage::OutputFormat;
pub use output::Output;
pub use prompt::{is_yes, AssumeYes, Confirm, LinePrompt};
pub use shell::{split_line, SplitError};
pub use task::{Session, TaskCommand};
