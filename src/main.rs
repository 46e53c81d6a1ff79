//! todo - Task manager with undo/redo, search and export

use std::process::ExitCode;

use clap::Parser;
use todo_pro::cli::{self, Cli};

fn main() -> ExitCode {
    let args = Cli::parse();
    init_logging(args.verbose);
    cli::run(args)
}

/// `RUST_LOG` wins; otherwise debug records with `--verbose`, warnings without
fn init_logging(verbose: bool) {
    let default = if verbose { "todo_pro=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
