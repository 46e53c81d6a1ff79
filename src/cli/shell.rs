//! Interactive session over one open store
//!
//! Each input line is split with shell-style quoting and parsed as a
//! command. `undo` and `redo` work on the history built up since the shell
//! started. Errors are reported and the loop continues; `exit` or end of
//! input ends the session.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::app::report;
use super::prompt::LinePrompt;
use super::task::{Session, TaskCommand};

#[derive(Debug, Parser)]
#[command(multicall = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Task(TaskCommand),

    /// Revert the last change
    Undo,

    /// Re-apply the last undone change
    Redo,

    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

/// Reads commands from `input` until `exit` or end of input
pub fn run<R: BufRead>(session: &mut Session<'_>, mut input: R) -> Result<()> {
    let interactive = io::stdin().is_terminal() && !session.output().is_json();
    if interactive {
        println!("Type 'help' for commands, 'exit' to quit");
    }

    let mut line = String::new();
    loop {
        if interactive {
            print!("todo> ");
            io::stdout().flush().context("Failed to write prompt")?;
        }

        line.clear();
        if input.read_line(&mut line).context("Failed to read command")? == 0 {
            break;
        }

        let words = match split_line(&line) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(e) => {
                session.output().error(&e.to_string());
                continue;
            }
        };

        let command = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                // Help and usage errors are rendered by clap
                let _ = e.print();
                continue;
            }
        };

        session
            .output()
            .detail("shell", &format!("Running {:?}", command));

        let result = match command {
            ShellCommand::Exit => break,
            ShellCommand::Undo => session.undo(),
            ShellCommand::Redo => session.redo(),
            ShellCommand::Task(command) => session.execute(command, &mut LinePrompt::new(&mut input)),
        };

        if let Err(e) = result {
            report(session.output(), &e);
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("Unterminated {0} quote")]
pub struct SplitError(&'static str);

/// Splits a command line into words
///
/// Whitespace separates words. Single quotes keep everything literally;
/// double quotes allow `\"` and `\\`; a backslash outside quotes escapes the
/// next character. `""` yields an empty word.
pub fn split_line(line: &str) -> Result<Vec<String>, SplitError> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => word.push(c),
                        None => return Err(SplitError("single")),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => word.push(c),
                            Some(c) => {
                                word.push('\\');
                                word.push(c);
                            }
                            None => return Err(SplitError("double")),
                        },
                        Some(c) => word.push(c),
                        None => return Err(SplitError("double")),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(c) = chars.next() {
                    word.push(c);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                word.push(c);
            }
        }
    }

    if in_word {
        words.push(word);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(line: &str) -> Vec<String> {
        split_line(line).unwrap()
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(split("  done   3 \n"), vec!["done", "3"]);
        assert!(split("   ").is_empty());
    }

    #[test]
    fn quotes_group_words() {
        assert_eq!(
            split(r#"add "Buy milk" -p alta"#),
            vec!["add", "Buy milk", "-p", "alta"]
        );
        assert_eq!(split("add 'it''s fine'"), vec!["add", "its fine"]);
        assert_eq!(split(r#"edit 2 -d "say \"hi\"""#), vec!["edit", "2", "-d", r#"say "hi""#]);
    }

    #[test]
    fn empty_quotes_are_a_word() {
        assert_eq!(split(r#"search """#), vec!["search", ""]);
    }

    #[test]
    fn backslash_escapes_outside_quotes() {
        assert_eq!(split(r"add Buy\ milk"), vec!["add", "Buy milk"]);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert_eq!(split_line(r#"add "Buy milk"#), Err(SplitError("double")));
        assert_eq!(split_line("add 'x"), Err(SplitError("single")));
    }

    #[test]
    fn shell_lines_parse_as_commands() {
        let parsed = ShellLine::try_parse_from(["add", "Buy milk", "-p", "alta"]).unwrap();
        assert!(matches!(
            parsed.command,
            ShellCommand::Task(TaskCommand::Add { ref description, ref priority })
                if description == "Buy milk" && priority.as_deref() == Some("alta")
        ));

        let parsed = ShellLine::try_parse_from(["undo"]).unwrap();
        assert!(matches!(parsed.command, ShellCommand::Undo));

        let parsed = ShellLine::try_parse_from(["quit"]).unwrap();
        assert!(matches!(parsed.command, ShellCommand::Exit));

        assert!(ShellLine::try_parse_from(["frobnicate"]).is_err());
        assert!(ShellLine::try_parse_from(["done", "zero"]).is_err());
    }
}
