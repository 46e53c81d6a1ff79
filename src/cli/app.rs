//! Main CLI application structure

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::output::Output;
use super::prompt::LinePrompt;
use super::shell;
use super::task::{Session, TaskCommand};
use crate::storage::{Config, GlobalConfig, OutputFormat, WorkspaceConfig, WORKSPACE_CONFIG};
use crate::store::StoreError;

#[derive(Parser)]
#[command(name = "todo")]
#[command(author, version, about = "Task manager with priorities, undo/redo, search and export")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured one, else text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Task file to use instead of the configured one
    #[arg(long, global = true, env = "TODO_FILE")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Task(TaskCommand),

    /// Start an interactive session (adds undo and redo)
    Shell,

    /// Write a default todo.toml in the current directory
    Init {
        /// Overwrite an existing todo.toml
        #[arg(long)]
        force: bool,
    },
}

/// Main entry point for the CLI
pub fn run(cli: Cli) -> ExitCode {
    let fallback = Output::new(cli.format.unwrap_or_default(), cli.verbose);
    fallback.detail("app", "todo starting");

    if let Commands::Init { force } = cli.command {
        return finish(&fallback, init(&fallback, force));
    }

    let config = match load_config(cli.file.as_deref()) {
        Ok(config) => config,
        Err(e) => return finish(&fallback, Err(e)),
    };
    let output = Output::new(
        cli.format.unwrap_or(config.global.default_format),
        cli.verbose,
    );

    let result = Session::open(config, &output).and_then(|mut session| match cli.command {
        Commands::Task(command) => {
            session.execute(command, &mut LinePrompt::new(io::stdin().lock()))
        }
        Commands::Shell => shell::run(&mut session, io::stdin().lock()),
        Commands::Init { .. } => Ok(()),
    });

    finish(&output, result)
}

/// Prints an error; returns false for outcomes that are not failures
pub(super) fn report(output: &Output, err: &anyhow::Error) -> bool {
    match err.downcast_ref::<StoreError>() {
        Some(store_err) if store_err.is_benign() => {
            output.notice(&store_err.to_string());
            false
        }
        _ => {
            output.error(&format!("{:#}", err));
            true
        }
    }
}

fn finish(output: &Output, result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => {
            output.detail("app", "Command completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) if report(output, &e) => ExitCode::FAILURE,
        Err(_) => ExitCode::SUCCESS,
    }
}

fn load_config(file: Option<&Path>) -> Result<Config> {
    let root = std::env::current_dir().context("Failed to determine current directory")?;
    let config = Config::load(root)?;

    Ok(match file {
        Some(path) => config.with_data_file(path),
        None => config,
    })
}

fn init(output: &Output, force: bool) -> Result<()> {
    let root = std::env::current_dir().context("Failed to determine current directory")?;
    let path = root.join(WORKSPACE_CONFIG);

    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let config = Config {
        workspace: WorkspaceConfig::default(),
        global: GlobalConfig::default(),
        root,
    };
    config.save_workspace()?;

    output.detail("init", &format!("Task file: {}", config.data_path().display()));
    output.success(&format!("Created {}", path.display()));
    Ok(())
}
