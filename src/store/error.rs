//! Errors reported by store operations

use thiserror::Error;

use crate::domain::TaskId;
use crate::export::ExportError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Persistence(#[from] StorageError),

    #[error("Deletion of task {0} cancelled")]
    CancelledByUser(TaskId),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("No task ids left after {0}")]
    IdsExhausted(TaskId),

    #[error(transparent)]
    Export(ExportError),
}

impl StoreError {
    /// True for outcomes that leave the store unchanged by choice rather than
    /// by failure (declined delete, empty history)
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            StoreError::CancelledByUser(_) | StoreError::NothingToUndo | StoreError::NothingToRedo
        )
    }
}

impl From<ExportError> for StoreError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnsupportedFormat(_) => StoreError::Validation(err.to_string()),
            other => StoreError::Export(other),
        }
    }
}
