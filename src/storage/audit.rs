//! Append-only action log
//!
//! Every successful mutation appends one line
//! `<YYYY-MM-DD HH:MM:SS.ffffff> - <message>` to the log file (default
//! `acciones.log`). The file is opened and closed per entry and never read
//! back.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

/// Write-only audit trail of mutating actions
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one timestamped line
    pub fn append(&self, message: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open audit log: {}", self.path.display()))?;

        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.6f");
        writeln!(file, "{} - {}", stamp, message).context("Failed to write audit log")?;

        Ok(())
    }
}
