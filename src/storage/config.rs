//! Configuration handling for todo-pro
//!
//! Configuration is stored in `todo.toml` (workspace, next to the task file)
//! and `~/.config/todo-pro/config.toml` (global). Setting `TODO_CONFIG_DIR`
//! replaces the global directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::SortKey;

/// File name of the workspace configuration
pub const WORKSPACE_CONFIG: &str = "todo.toml";

/// How commands print their results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable lines and tables
    #[default]
    Text,
    /// One JSON document per result
    Json,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Workspace-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Task file, relative to the workspace root
    pub data_file: PathBuf,

    /// Audit log file, relative to the workspace root
    pub log_file: PathBuf,

    /// Write the audit log
    pub audit: bool,

    /// Maximum undo depth (unbounded when unset)
    pub history_limit: Option<usize>,

    /// Directory for relative export stems
    pub export_dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("tareas.json"),
            log_file: PathBuf::from("acciones.log"),
            audit: true,
            history_limit: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl WorkspaceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_file must not be empty".to_string()));
        }
        if self.history_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "history_limit must be at least 1 (omit it for unlimited undo)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Default sort order for `todo list`
    pub default_sort: SortKey,
}

/// Combined configuration (global + workspace)
#[derive(Debug, Clone)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub global: GlobalConfig,
    pub root: PathBuf,
}

impl Config {
    /// Loads configuration for a workspace directory
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let global = Self::load_global()?;
        let workspace = Self::load_workspace(&root)?;

        Ok(Self {
            workspace,
            global,
            root,
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        if let Some(dir) = std::env::var_os("TODO_CONFIG_DIR") {
            return Some(PathBuf::from(dir));
        }
        ProjectDirs::from("dev", "todo-pro", "todo-pro").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads workspace configuration from a specific root
    fn load_workspace(root: &Path) -> Result<WorkspaceConfig> {
        let config_path = root.join(WORKSPACE_CONFIG);

        if !config_path.exists() {
            return Ok(WorkspaceConfig::default());
        }

        let content = fs::read_to_string(&config_path).with_context(|| {
            format!("Failed to read workspace config: {}", config_path.display())
        })?;

        let config: WorkspaceConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse workspace config")?;

        config.validate()?;
        Ok(config)
    }

    /// Overrides the task file (from `--file` / `TODO_FILE`)
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.workspace.data_file = path.into();
        self
    }

    /// Absolute-or-root-relative path of the task file
    pub fn data_path(&self) -> PathBuf {
        self.root.join(&self.workspace.data_file)
    }

    /// Path of the audit log, or `None` when auditing is off
    pub fn log_path(&self) -> Option<PathBuf> {
        self.workspace
            .audit
            .then(|| self.root.join(&self.workspace.log_file))
    }

    /// Resolves an export stem against the export directory
    pub fn export_stem(&self, stem: &Path) -> PathBuf {
        self.root.join(&self.workspace.export_dir).join(stem)
    }

    /// Saves the workspace configuration
    pub fn save_workspace(&self) -> Result<()> {
        let config_path = self.root.join(WORKSPACE_CONFIG);

        let content = toml::to_string_pretty(&self.workspace)
            .context("Failed to serialize workspace config")?;

        fs::write(&config_path, content).with_context(|| {
            format!("Failed to write workspace config: {}", config_path.display())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_at(root: &Path) -> Config {
        Config {
            workspace: WorkspaceConfig::default(),
            global: GlobalConfig::default(),
            root: root.to_path_buf(),
        }
    }

    #[test]
    fn default_config() {
        let config = config_at(Path::new("/work"));

        assert_eq!(config.data_path(), PathBuf::from("/work/tareas.json"));
        assert_eq!(config.log_path(), Some(PathBuf::from("/work/acciones.log")));
        assert_eq!(config.workspace.history_limit, None);
        assert_eq!(config.global.default_format, OutputFormat::Text);
        assert_eq!(config.global.default_sort, SortKey::Priority);
    }

    #[test]
    fn parse_workspace_config() {
        let toml = r#"
data_file = "data/tasks.json"
audit = false
history_limit = 50
"#;

        let config: WorkspaceConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.data_file, PathBuf::from("data/tasks.json"));
        assert!(!config.audit);
        assert_eq!(config.history_limit, Some(50));
        assert_eq!(config.log_file, PathBuf::from("acciones.log"));
    }

    #[test]
    fn parse_global_config() {
        let toml = r#"
default_format = "json"
default_sort = "date"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
        assert_eq!(config.default_sort, SortKey::Date);
    }

    #[test]
    fn audit_off_means_no_log_path() {
        let mut config = config_at(Path::new("/work"));
        config.workspace.audit = false;
        assert_eq!(config.log_path(), None);
    }

    #[test]
    fn absolute_data_file_overrides_root() {
        let config = config_at(Path::new("/work")).with_data_file("/elsewhere/t.json");
        assert_eq!(config.data_path(), PathBuf::from("/elsewhere/t.json"));
    }

    #[test]
    fn export_stem_uses_export_dir() {
        let mut config = config_at(Path::new("/work"));
        config.workspace.export_dir = PathBuf::from("out");
        assert_eq!(
            config.export_stem(Path::new("report")),
            PathBuf::from("/work/out/report")
        );
    }

    #[test]
    fn load_workspace_from_disk() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(WORKSPACE_CONFIG), "data_file = \"mine.json\"\n").unwrap();

        let workspace = Config::load_workspace(dir.path()).unwrap();
        assert_eq!(workspace.data_file, PathBuf::from("mine.json"));
    }

    #[test]
    fn zero_history_limit_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(WORKSPACE_CONFIG), "history_limit = 0\n").unwrap();

        assert!(Config::load_workspace(dir.path()).is_err());
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(WORKSPACE_CONFIG), "data_file = [").unwrap();

        assert!(Config::load_workspace(dir.path()).is_err());
    }

    #[test]
    fn save_and_reload_workspace() {
        let dir = TempDir::new().unwrap();
        let mut config = config_at(dir.path());
        config.workspace.history_limit = Some(10);
        config.save_workspace().unwrap();

        let reloaded = Config::load_workspace(dir.path()).unwrap();
        assert_eq!(reloaded, config.workspace);
    }
}
