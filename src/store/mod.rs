//! # Task Store
//!
//! The in-memory task collection with undo/redo and write-through
//! persistence.
//!
//! ## Mutations
//!
//! `add`, `complete`, `confirm_delete` and `edit` each run as one unit:
//!
//! 1. take a snapshot of the whole collection
//! 2. apply the change
//! 3. rewrite the task file
//!
//! If step 2 or 3 fails, the collection and id counter are restored and no
//! history entry is recorded. On success the snapshot goes onto the undo
//! stack and the redo stack is cleared.
//!
//! ## Ids
//!
//! Ids come from a counter that only moves forward. Deleting a task or undoing
//! an add never returns its id to the pool within one store instance.
//!
//! ## Deletion
//!
//! Deletion is two-phase so the store never waits on a prompt:
//! [`TaskStore::request_delete`] checks the id and returns a
//! [`DeleteRequest`]; [`TaskStore::confirm_delete`] applies or discards it.

mod error;
mod history;

use std::path::Path;

pub use error::StoreError;
pub use history::{History, Snapshot};

use crate::domain::{self, Priority, SearchHit, SortKey, Stats, StatusFilter, Task, TaskId};
use crate::export::{self, ExportFormat, ExportSummary};
use crate::storage::{AuditLog, TaskFile};

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// A pending deletion awaiting confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a delete request does nothing until passed to confirm_delete"]
pub struct DeleteRequest {
    id: TaskId,
}

impl DeleteRequest {
    pub fn id(&self) -> TaskId {
        self.id
    }
}

/// Task collection with history and persistence
#[derive(Debug)]
pub struct TaskStore {
    file: TaskFile,
    audit: Option<AuditLog>,
    tasks: Snapshot,
    next_id: TaskId,
    history: History,
}

impl TaskStore {
    /// Opens the store backed by `file`, migrating older file shapes
    ///
    /// A missing file gives an empty store. A malformed file is an error and
    /// is left untouched.
    pub fn open(file: TaskFile) -> Result<Self> {
        let loaded = file.load()?;
        Ok(Self {
            file,
            audit: None,
            tasks: loaded.tasks,
            next_id: loaded.next_id,
            history: History::new(),
        })
    }

    /// Enables the audit log
    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Caps the undo depth (`None` = unbounded)
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history = History::with_limit(limit);
        self
    }

    /// Path of the backing task file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// All tasks in ascending id order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The id the next `add` will use
    pub fn next_id(&self) -> TaskId {
        self.next_id
    }

    /// A value copy of the current collection
    pub fn snapshot(&self) -> Snapshot {
        self.tasks.clone()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.undo_depth() > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history.redo_depth() > 0
    }

    /// Adds a pending task; an empty priority means `media`
    pub fn add(&mut self, description: &str, priority: Option<&str>) -> Result<Task> {
        if description.trim().is_empty() {
            return Err(StoreError::Validation(
                "Task description must not be empty".to_string(),
            ));
        }

        let priority = priority
            .filter(|p| !p.trim().is_empty())
            .map(Priority::parse)
            .unwrap_or_default();

        let task = self.transact(|tasks, next_id| {
            let id = *next_id;
            let following = id.next().ok_or(StoreError::IdsExhausted(id))?;
            let task = Task::new(id, description, priority);
            tasks.insert(id, task.clone());
            *next_id = following;
            Ok(task)
        })?;

        self.audit(&format!("Task added: {} (ID {})", task.description, task.id));
        Ok(task)
    }

    /// Marks a task as completed
    pub fn complete(&mut self, id: TaskId) -> Result<Task> {
        let task = self.transact(|tasks, _| {
            let task = tasks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            task.mark_completed();
            Ok(task.clone())
        })?;

        self.audit(&format!("Task completed (ID {})", id));
        Ok(task)
    }

    /// First phase of a deletion: checks that the task exists
    pub fn request_delete(&self, id: TaskId) -> Result<DeleteRequest> {
        if !self.tasks.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        Ok(DeleteRequest { id })
    }

    /// Second phase of a deletion
    ///
    /// Declining returns [`StoreError::CancelledByUser`] and changes nothing,
    /// not even the history.
    pub fn confirm_delete(&mut self, request: DeleteRequest, confirmed: bool) -> Result<Task> {
        let id = request.id;
        if !confirmed {
            return Err(StoreError::CancelledByUser(id));
        }

        let removed = self.transact(|tasks, _| tasks.remove(&id).ok_or(StoreError::NotFound(id)))?;

        self.audit(&format!("Task deleted: {} (ID {})", removed.description, id));
        Ok(removed)
    }

    /// Edits description and/or priority; empty values are left unchanged
    ///
    /// A history entry is recorded whenever the task exists, even if nothing
    /// ends up changing.
    pub fn edit(
        &mut self,
        id: TaskId,
        description: Option<&str>,
        priority: Option<&str>,
    ) -> Result<Task> {
        let description = description.filter(|d| !d.trim().is_empty());
        let priority = priority.filter(|p| !p.trim().is_empty()).map(Priority::parse);

        let task = self.transact(|tasks, _| {
            let task = tasks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            if let Some(description) = description {
                task.set_description(description);
            }
            if let Some(priority) = priority {
                task.set_priority(priority);
            }
            Ok(task.clone())
        })?;

        self.audit(&format!("Task edited (ID {})", id));
        Ok(task)
    }

    /// Restores the state before the most recent mutation
    pub fn undo(&mut self) -> Result<()> {
        let previous = self.history.take_undo().ok_or(StoreError::NothingToUndo)?;
        let current = std::mem::replace(&mut self.tasks, previous);

        if let Err(err) = self.file.save(&self.tasks) {
            let previous = std::mem::replace(&mut self.tasks, current);
            self.history.push_undo(previous);
            return Err(err.into());
        }

        self.history.push_redo(current);
        log::debug!(
            "Undo: {} undo / {} redo entries left",
            self.history.undo_depth(),
            self.history.redo_depth()
        );
        Ok(())
    }

    /// Re-applies the most recently undone mutation
    pub fn redo(&mut self) -> Result<()> {
        let next = self.history.take_redo().ok_or(StoreError::NothingToRedo)?;
        let current = std::mem::replace(&mut self.tasks, next);

        if let Err(err) = self.file.save(&self.tasks) {
            let next = std::mem::replace(&mut self.tasks, current);
            self.history.push_redo(next);
            return Err(err.into());
        }

        self.history.push_undo(current);
        log::debug!(
            "Redo: {} undo / {} redo entries left",
            self.history.undo_depth(),
            self.history.redo_depth()
        );
        Ok(())
    }

    /// All tasks in the given order
    pub fn sorted_view(&self, key: SortKey) -> Vec<&Task> {
        domain::sort_tasks(self.tasks.values(), key)
    }

    /// Sorted, then filtered
    pub fn list(&self, filter: StatusFilter, key: SortKey) -> Vec<&Task> {
        domain::select(self.tasks.values(), filter, key)
    }

    /// Case-insensitive description search, in id order
    pub fn search(&self, query: &str) -> Vec<SearchHit<'_>> {
        domain::search(self.tasks.values(), query)
    }

    pub fn stats(&self) -> Stats {
        Stats::collect(self.tasks.values())
    }

    /// Exports the priority-sorted, filtered tasks to `<stem>.<ext>`
    pub fn export(
        &self,
        filter: StatusFilter,
        format: ExportFormat,
        stem: &Path,
    ) -> Result<ExportSummary> {
        let selected = self.list(filter, SortKey::Priority);
        Ok(export::write(&selected, format, stem)?)
    }

    /// Like [`TaskStore::export`] with the format given by name
    ///
    /// An unknown name is a [`StoreError::Validation`] and writes nothing.
    pub fn export_as(&self, filter: StatusFilter, format: &str, stem: &Path) -> Result<ExportSummary> {
        let format: ExportFormat = format.parse()?;
        self.export(filter, format, stem)
    }

    /// Runs one mutation with snapshot, persistence and rollback
    fn transact<T>(
        &mut self,
        change: impl FnOnce(&mut Snapshot, &mut TaskId) -> Result<T>,
    ) -> Result<T> {
        let before = self.snapshot();
        let before_next_id = self.next_id;

        let outcome = change(&mut self.tasks, &mut self.next_id).and_then(|value| {
            self.file.save(&self.tasks)?;
            Ok(value)
        });

        match outcome {
            Ok(value) => {
                self.history.record(before);
                log::debug!("Recorded snapshot, undo depth {}", self.history.undo_depth());
                Ok(value)
            }
            Err(err) => {
                self.tasks = before;
                self.next_id = before_next_id;
                Err(err)
            }
        }
    }

    fn audit(&self, message: &str) {
        if let Some(audit_log) = &self.audit {
            if let Err(e) = audit_log.append(message) {
                log::warn!("Audit log entry dropped: {:#}", e);
            }
        }
    }
}
