//! Task commands
//!
//! A [`Session`] owns one open store and runs [`TaskCommand`]s against it.
//! One-shot invocations use a session for a single command; `todo shell`
//! keeps it open so undo/redo have history to work with.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use crossterm::style::{style, Stylize};

use super::output::Output;
use super::prompt::{AssumeYes, Confirm};
use crate::domain::{SortKey, StatusFilter, Task, TaskId};
use crate::storage::{AuditLog, Config, TaskFile};
use crate::store::TaskStore;

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Add a task
    ///
    /// Examples:
    ///   todo add "Buy milk" -p alta
    ///   todo add "Call the bank"        # priority media
    Add {
        /// What needs doing
        description: String,

        /// Priority (alta, media, baja)
        #[arg(long, short)]
        priority: Option<String>,
    },

    /// Mark a task as completed
    Done {
        /// Task ID
        id: TaskId,
    },

    /// Delete a task (asks for confirmation)
    Delete {
        /// Task ID
        id: TaskId,

        /// Delete without asking
        #[arg(long, short)]
        yes: bool,
    },

    /// Change a task's description and/or priority
    Edit {
        /// Task ID
        id: TaskId,

        /// New description (empty keeps the current one)
        #[arg(long, short)]
        description: Option<String>,

        /// New priority (empty keeps the current one)
        #[arg(long, short)]
        priority: Option<String>,
    },

    /// List tasks
    List {
        /// Which tasks to show
        #[arg(long, short, value_enum, default_value_t)]
        status: StatusFilter,

        /// Sort order (defaults to the configured one)
        #[arg(long, value_enum)]
        sort: Option<SortKey>,
    },

    /// Find tasks whose description contains TEXT (case-insensitive)
    Search {
        /// Text to look for
        text: String,
    },

    /// Show task counters
    Stats,

    /// Export tasks to a file
    Export {
        /// Which tasks to export
        #[arg(long, short, value_enum, default_value_t)]
        status: StatusFilter,

        /// Format: json, txt, csv or excel
        #[arg(id = "to", long = "to", short = 't', default_value = "json")]
        format: String,

        /// Output file name without extension
        #[arg(long, short, default_value = "export")]
        out: PathBuf,
    },
}

/// An open store plus what commands need to report on it
pub struct Session<'a> {
    store: TaskStore,
    config: Config,
    output: &'a Output,
}

impl<'a> Session<'a> {
    /// Opens the configured task file
    pub fn open(config: Config, output: &'a Output) -> Result<Self> {
        let path = config.data_path();
        output.detail("store", &format!("Opening {}", path.display()));

        let mut store = TaskStore::open(TaskFile::new(&path))
            .with_context(|| format!("Failed to open task file {}", path.display()))?
            .with_history_limit(config.workspace.history_limit);

        if let Some(log_path) = config.log_path() {
            output.detail("store", &format!("Audit log: {}", log_path.display()));
            store = store.with_audit(AuditLog::new(log_path));
        }

        output.detail("store", &format!("Loaded {} tasks", store.len()));
        Ok(Self {
            store,
            config,
            output,
        })
    }

    pub fn output(&self) -> &Output {
        self.output
    }

    /// Runs one command; `confirm` answers the delete prompt
    pub fn execute(&mut self, command: TaskCommand, confirm: &mut dyn Confirm) -> Result<()> {
        match command {
            TaskCommand::Add {
                description,
                priority,
            } => self.add(&description, priority.as_deref()),
            TaskCommand::Done { id } => self.complete(id),
            TaskCommand::Delete { id, yes } => {
                if yes {
                    self.delete(id, &mut AssumeYes)
                } else {
                    self.delete(id, confirm)
                }
            }
            TaskCommand::Edit {
                id,
                description,
                priority,
            } => self.edit(id, description.as_deref(), priority.as_deref()),
            TaskCommand::List { status, sort } => self.list(status, sort),
            TaskCommand::Search { text } => self.search(&text),
            TaskCommand::Stats => self.stats(),
            TaskCommand::Export {
                status,
                format,
                out,
            } => self.export(status, &format, out),
        }
    }

    /// Reverts the last change made in this session
    pub fn undo(&mut self) -> Result<()> {
        self.store.undo()?;
        self.report_history("Undone")
    }

    /// Re-applies the last undone change
    pub fn redo(&mut self) -> Result<()> {
        self.store.redo()?;
        self.report_history("Redone")
    }

    fn add(&mut self, description: &str, priority: Option<&str>) -> Result<()> {
        let task = self.store.add(description, priority)?;
        if !task.priority.is_canonical() {
            self.output.detail(
                "add",
                &format!("Priority '{}' is not alta/media/baja; it sorts like media", task.priority),
            );
        }

        if self.output.is_json() {
            self.output.data(&task);
        } else {
            self.output.success(&format!(
                "Task added: {} (ID {}, priority {})",
                task.description, task.id, task.priority
            ));
        }
        Ok(())
    }

    fn complete(&mut self, id: TaskId) -> Result<()> {
        let task = self.store.complete(id)?;

        if self.output.is_json() {
            self.output.data(&task);
        } else {
            self.output
                .success(&format!("Task {} completed: {}", task.id, task.description));
        }
        Ok(())
    }

    fn delete(&mut self, id: TaskId, confirm: &mut dyn Confirm) -> Result<()> {
        let request = self.store.request_delete(id)?;
        let confirmed = confirm.confirm(&format!("Delete task {}?", request.id()))?;
        self.output
            .detail("delete", &format!("Confirmation for {}: {}", id, confirmed));

        let task = self.store.confirm_delete(request, confirmed)?;

        if self.output.is_json() {
            self.output.data(&serde_json::json!({
                "deleted": true,
                "task": task,
            }));
        } else {
            self.output
                .success(&format!("Task deleted: {} (ID {})", task.description, task.id));
        }
        Ok(())
    }

    fn edit(&mut self, id: TaskId, description: Option<&str>, priority: Option<&str>) -> Result<()> {
        let task = self.store.edit(id, description, priority)?;

        if self.output.is_json() {
            self.output.data(&task);
        } else {
            self.output.success(&format!(
                "Task {} updated: {} [{}]",
                task.id, task.description, task.priority
            ));
        }
        Ok(())
    }

    fn list(&self, status: StatusFilter, sort: Option<SortKey>) -> Result<()> {
        let sort = sort.unwrap_or(self.config.global.default_sort);
        self.output
            .detail("list", &format!("status={:?}, sort={:?}", status, sort));

        let tasks = self.store.list(status, sort);

        if self.output.is_json() {
            self.output.data(&tasks);
        } else if tasks.is_empty() {
            println!("No tasks");
        } else {
            print_table(&tasks, |t| t.description.clone());
        }
        Ok(())
    }

    fn search(&self, text: &str) -> Result<()> {
        let hits = self.store.search(text);
        self.output
            .detail("search", &format!("'{}' matched {} tasks", text, hits.len()));

        if self.output.is_json() {
            let items: Vec<_> = hits
                .iter()
                .map(|hit| {
                    serde_json::json!({
                        "task": hit.task,
                        "matches": hit.matches.iter().map(|r| [r.start, r.end]).collect::<Vec<_>>(),
                    })
                })
                .collect();
            self.output.data(&items);
        } else if hits.is_empty() {
            println!("No tasks match '{}'", text);
        } else {
            let styled = std::io::stdout().is_terminal();
            let tasks: Vec<&Task> = hits.iter().map(|hit| hit.task).collect();
            print_table(&tasks, |task| {
                hits.iter()
                    .find(|hit| hit.task.id == task.id)
                    .map(|hit| {
                        hit.highlighted(|part| {
                            if styled {
                                style(part).bold().yellow().to_string()
                            } else {
                                part.to_string()
                            }
                        })
                    })
                    .unwrap_or_else(|| task.description.clone())
            });
            println!();
            println!("Found {} task(s)", hits.len());
        }
        Ok(())
    }

    fn stats(&self) -> Result<()> {
        let stats = self.store.stats();

        if self.output.is_json() {
            self.output.data(&stats);
        } else {
            println!("Total:     {}", stats.total);
            println!("Pending:   {}", stats.pending);
            println!("Completed: {}", stats.completed);
        }
        Ok(())
    }

    fn export(&self, status: StatusFilter, format: &str, out: PathBuf) -> Result<()> {
        let stem = self.config.export_stem(&out);
        self.output.detail(
            "export",
            &format!("status={:?}, format={}, stem={}", status, format, stem.display()),
        );

        let summary = self.store.export_as(status, format, &stem)?;

        if self.output.is_json() {
            self.output.data(&summary);
        } else {
            self.output.success(&format!(
                "Exported {} task(s) to {}",
                summary.count,
                summary.path.display()
            ));
        }
        Ok(())
    }

    fn report_history(&self, action: &str) -> Result<()> {
        let history = self.store.history();

        if self.output.is_json() {
            self.output.data(&serde_json::json!({
                "action": action.to_lowercase(),
                "tasks": self.store.len(),
                "undo_depth": history.undo_depth(),
                "redo_depth": history.redo_depth(),
            }));
        } else {
            self.output.success(&format!(
                "{} ({} tasks; {} undo / {} redo left)",
                action,
                self.store.len(),
                history.undo_depth(),
                history.redo_depth()
            ));
        }
        Ok(())
    }
}

fn print_table(tasks: &[&Task], describe: impl Fn(&Task) -> String) {
    println!(
        "{:<5} {:<9} {:<10} {:<20} DESCRIPTION",
        "ID", "PRIORITY", "STATUS", "CREATED"
    );
    println!("{}", "-".repeat(70));

    for task in tasks {
        let status = if task.completed { "done" } else { "pending" };
        println!(
            "{:<5} {:<9} {:<10} {:<20} {}",
            task.id,
            task.priority,
            status,
            task.created_at_str(),
            describe(task)
        );
    }
}
