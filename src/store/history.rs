//! Undo/redo history of full-collection snapshots

use std::collections::{BTreeMap, VecDeque};

use crate::domain::{Task, TaskId};

/// A value copy of the whole task collection
pub type Snapshot = BTreeMap<TaskId, Task>;

/// Two stacks of snapshots
///
/// `record` is called once per mutation with the state from before it; that
/// clears the redo stack. Undo and redo move snapshots between the stacks.
/// With a limit set, the oldest undo entries are dropped first.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// History keeping at most `limit` undo steps (`None` = unbounded)
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Records the state preceding a new mutation
    pub fn record(&mut self, before: Snapshot) {
        self.push_undo(before);
        self.redo.clear();
    }

    /// Takes the most recent undo snapshot
    pub fn take_undo(&mut self) -> Option<Snapshot> {
        self.undo.pop_back()
    }

    /// Takes the most recent redo snapshot
    pub fn take_redo(&mut self) -> Option<Snapshot> {
        self.redo.pop()
    }

    /// Pushes onto the undo stack without touching redo
    pub fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo.push_back(snapshot);
        if let Some(limit) = self.limit {
            while self.undo.len() > limit {
                self.undo.pop_front();
            }
        }
    }

    pub fn push_redo(&mut self, snapshot: Snapshot) {
        self.redo.push(snapshot);
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    #[cfg(test)]
    pub(crate) fn peek_undo(&self) -> Option<&Snapshot> {
        self.undo.back()
    }

    #[cfg(test)]
    pub(crate) fn peek_redo(&self) -> Option<&Snapshot> {
        self.redo.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;

    fn snapshot(ns: &[u32]) -> Snapshot {
        ns.iter()
            .map(|&n| {
                let id = TaskId::new(n).unwrap();
                (id, Task::new(id, format!("t{}", n), Priority::Medium))
            })
            .collect()
    }

    #[test]
    fn record_clears_redo() {
        let mut history = History::new();
        history.record(snapshot(&[]));
        history.push_redo(snapshot(&[1]));
        assert_eq!(history.redo_depth(), 1);

        history.record(snapshot(&[1]));
        assert_eq!(history.redo_depth(), 0);
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn take_is_lifo() {
        let mut history = History::new();
        history.record(snapshot(&[1]));
        history.record(snapshot(&[1, 2]));

        assert_eq!(history.take_undo().unwrap().len(), 2);
        assert_eq!(history.take_undo().unwrap().len(), 1);
        assert!(history.take_undo().is_none());
    }

    #[test]
    fn limit_drops_oldest() {
        let mut history = History::with_limit(Some(2));
        history.record(snapshot(&[1]));
        history.record(snapshot(&[1, 2]));
        history.record(snapshot(&[1, 2, 3]));

        assert_eq!(history.undo_depth(), 2);
        assert_eq!(history.take_undo().unwrap().len(), 3);
        assert_eq!(history.take_undo().unwrap().len(), 2);
        assert!(history.take_undo().is_none());
    }

    #[test]
    fn push_undo_keeps_redo() {
        let mut history = History::new();
        history.push_redo(snapshot(&[1]));
        history.push_undo(snapshot(&[]));

        assert_eq!(history.redo_depth(), 1);
        assert_eq!(history.undo_depth(), 1);
    }
}
