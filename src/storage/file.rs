//! JSON file storage for tasks
//!
//! The whole collection lives in one JSON file (default `tareas.json`) that is
//! rewritten on every change. Writes go to a temp file which is then renamed
//! over the original, so an interrupted write never leaves a truncated file.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use super::schema::{self, Loaded, SchemaError};
use crate::domain::{Task, TaskId};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read task file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write task file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed task file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    #[error("Failed to serialize tasks: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// The persistence file of a task store
#[derive(Debug, Clone)]
pub struct TaskFile {
    path: PathBuf,
}

impl TaskFile {
    /// Creates a handle for the file at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads and migrates the file; a missing file is an empty store
    pub fn load(&self) -> Result<Loaded, StorageError> {
        if !self.path.exists() {
            log::debug!("No task file at {}, starting empty", self.path.display());
            return Ok(Loaded::empty());
        }

        let read_err = |source| StorageError::Read {
            path: self.path.clone(),
            source,
        };

        let mut file = File::open(&self.path).map_err(read_err)?;

        // Acquire shared lock for reading
        file.lock_shared().map_err(read_err)?;

        let mut content = String::new();
        file.read_to_string(&mut content).map_err(read_err)?;

        // Lock is released when file is dropped
        let loaded = schema::decode(&content).map_err(|source| StorageError::Malformed {
            path: self.path.clone(),
            source,
        })?;

        log::debug!(
            "Loaded {} tasks from {} ({:?} schema)",
            loaded.tasks.len(),
            self.path.display(),
            loaded.schema
        );
        Ok(loaded)
    }

    /// Writes all tasks to the file (full rewrite)
    pub fn save(&self, tasks: &BTreeMap<TaskId, Task>) -> Result<(), StorageError> {
        let bytes = schema::encode(tasks).map_err(StorageError::Serialize)?;

        let temp_path = self.temp_path();
        if let Err(source) = self.write_atomic(&temp_path, &bytes) {
            // Ignored: the temp file may not exist
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::Write {
                path: self.path.clone(),
                source,
            });
        }

        log::debug!("Saved {} tasks to {}", tasks.len(), self.path.display());
        Ok(())
    }

    fn write_atomic(&self, temp_path: &Path, bytes: &[u8]) -> io::Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(temp_path)?;

            // Acquire exclusive lock
            file.lock_exclusive()?;

            let mut writer = BufWriter::new(&file);
            writer.write_all(bytes)?;
            writer.flush()?;
            drop(writer);

            file.sync_all()?;
        }

        // Atomic rename
        fs::rename(temp_path, &self.path)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "tareas.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;
    use crate::storage::Schema;
    use tempfile::TempDir;

    fn make_task(n: u32) -> Task {
        let id = TaskId::new(n).unwrap();
        Task::new(id, format!("Task {}", n), Priority::Medium)
    }

    fn tasks_of(ns: &[u32]) -> BTreeMap<TaskId, Task> {
        ns.iter().map(|&n| (TaskId::new(n).unwrap(), make_task(n))).collect()
    }

    #[test]
    fn load_missing_file() {
        let dir = TempDir::new().unwrap();
        let file = TaskFile::new(dir.path().join("tareas.json"));

        let loaded = file.load().unwrap();
        assert!(loaded.tasks.is_empty());
        assert_eq!(loaded.next_id, TaskId::FIRST);
        assert_eq!(loaded.schema, None);
    }

    #[test]
    fn save_and_load_tasks() {
        let dir = TempDir::new().unwrap();
        let file = TaskFile::new(dir.path().join("tareas.json"));

        let tasks = tasks_of(&[1, 3]);
        file.save(&tasks).unwrap();

        let loaded = file.load().unwrap();
        assert_eq!(loaded.tasks, tasks);
        assert_eq!(loaded.schema, Some(Schema::Identified));
        assert_eq!(loaded.next_id, TaskId::new(4).unwrap());
    }

    #[test]
    fn save_overwrites_previous_content() {
        let dir = TempDir::new().unwrap();
        let file = TaskFile::new(dir.path().join("tareas.json"));

        file.save(&tasks_of(&[1, 2, 3])).unwrap();
        file.save(&tasks_of(&[2])).unwrap();

        let loaded = file.load().unwrap();
        assert_eq!(loaded.tasks.len(), 1);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let file = TaskFile::new(dir.path().join("nested").join("dir").join("tareas.json"));

        file.save(&tasks_of(&[1])).unwrap();

        assert!(file.exists());
    }

    #[test]
    fn atomic_write() {
        let dir = TempDir::new().unwrap();
        let file = TaskFile::new(dir.path().join("tareas.json"));

        file.save(&tasks_of(&[1])).unwrap();

        // Temp file should not exist after write
        assert!(!dir.path().join("tareas.json.tmp").exists());
    }

    #[test]
    fn malformed_file_is_reported_and_left_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tareas.json");
        fs::write(&path, "{ not json").unwrap();

        let err = TaskFile::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::Malformed { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn failed_save_keeps_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tareas.json");
        let file = TaskFile::new(&path);
        file.save(&tasks_of(&[1])).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        // A directory where the temp file should go makes the write fail
        fs::create_dir(dir.path().join("tareas.json.tmp")).unwrap();
        let result = file.save(&tasks_of(&[1, 2]));

        assert!(matches!(result, Err(StorageError::Write { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }
}
