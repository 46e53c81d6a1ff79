//! Printing command results in text or JSON

use serde::Serialize;

use crate::storage::OutputFormat;

/// Where command results and diagnostics go
///
/// Results and notices go to stdout, errors and `--verbose` details to
/// stderr. In JSON mode every line on stdout is one JSON document.
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// A change that went through
    pub fn success(&self, message: &str) {
        self.message(true, message);
    }

    /// An outcome that changed nothing but is not a failure
    pub fn notice(&self, message: &str) {
        self.message(false, message);
    }

    fn message(&self, success: bool, message: &str) {
        if self.is_json() {
            println!("{}", serde_json::json!({ "success": success, "message": message }));
        } else {
            println!("{}", message);
        }
    }

    pub fn error(&self, message: &str) {
        if self.is_json() {
            eprintln!("{}", serde_json::json!({ "success": false, "error": message }));
        } else {
            eprintln!("Error: {}", message);
        }
    }

    /// One compact JSON document on stdout
    pub fn data<T: Serialize>(&self, data: &T) {
        match serde_json::to_string(data) {
            Ok(json) => println!("{}", json),
            Err(e) => self.error(&format!("Failed to encode result: {}", e)),
        }
    }

    /// `[todo:<scope>] message` on stderr, only with `--verbose`
    pub fn detail(&self, scope: &str, message: &str) {
        if self.verbose {
            eprintln!("[todo:{}] {}", scope, message);
        }
    }
}
