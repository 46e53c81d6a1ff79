//! Domain models for todo-pro
//!
//! Contains the task entity and read-only views over task collections,
//! without any I/O concerns.

mod id;
mod task;
mod view;

pub use id::{IdError, TaskId};
pub use task::{timestamp, Priority, Task, TaskRecord};
pub use view::{search, select, sort_tasks, SearchHit, SortKey, Stats, StatusFilter, ViewError};
