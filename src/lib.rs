//! todo-pro - A task manager with priorities, undo/redo, search and export
//!
//! Tasks live in a JSON file and are changed through a [`store::TaskStore`],
//! which snapshots the collection before every change so it can be undone.
//! Exports write JSON, plain text, CSV or an Excel workbook.

pub mod domain;
pub mod storage;
pub mod export;
pub mod store;
pub mod cli;

pub use domain::{Priority, Task, TaskId};
pub use store::{StoreError, TaskStore};
