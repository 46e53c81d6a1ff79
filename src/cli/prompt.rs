//! Yes/no confirmation for destructive commands

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Source of yes/no answers
pub trait Confirm {
    /// Asks `question` and returns true for a yes
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Answers yes without asking (`--yes`)
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Reads the answer from a line of input
///
/// The question goes to stderr so JSON on stdout stays parseable. End of
/// input counts as no.
pub struct LinePrompt<R> {
    input: R,
}

impl<R: BufRead> LinePrompt<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Confirm for LinePrompt<R> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let mut stderr = io::stderr();
        write!(stderr, "{} (s/n): ", question).context("Failed to write prompt")?;
        stderr.flush().context("Failed to write prompt")?;

        let mut answer = String::new();
        self.input
            .read_line(&mut answer)
            .context("Failed to read confirmation")?;
        Ok(is_yes(&answer))
    }
}

/// `s`/`si`/`sí` and `y`/`yes`, any case
pub fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn yes_answers() {
        for answer in ["s", "S\n", " sí ", "y", "YES"] {
            assert!(is_yes(answer), "{answer:?}");
        }
        for answer in ["", "n", "no", "sure", "ss"] {
            assert!(!is_yes(answer), "{answer:?}");
        }
    }

    #[test]
    fn line_prompt_reads_one_line_per_question() {
        let mut prompt = LinePrompt::new(Cursor::new("s\nn\n"));
        assert!(prompt.confirm("Delete?").unwrap());
        assert!(!prompt.confirm("Delete?").unwrap());
        // Input exhausted
        assert!(!prompt.confirm("Delete?").unwrap());
    }

    #[test]
    fn assume_yes_always_confirms() {
        assert!(AssumeYes.confirm("Delete?").unwrap());
    }
}
