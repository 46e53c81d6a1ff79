//! # Export
//!
//! Writes a selection of tasks to `<stem>.<ext>` in one of four formats:
//!
//! | Format | Extension | Content |
//! |--------|-----------|---------|
//! | `json` | `.json` | Array of task records, 4-space indent |
//! | `txt` | `.txt` | `description [priority] - Pendiente` per line |
//! | `csv` | `.csv` | Header row + one row per task, CRLF |
//! | `excel` | `.xlsx` | One worksheet, same columns as CSV |
//!
//! The content is rendered completely before the file is created, so an
//! unsupported format or an encoding failure never leaves a file behind.

mod xlsx;

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Task, TaskRecord};
use crate::storage::to_pretty_json;

/// Column headers shared by the CSV and spreadsheet exports
pub const HEADERS: [&str; 4] = ["Descripción", "Completada", "Prioridad", "Fecha creación"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format '{0}' (use json, txt, csv or excel)")]
    UnsupportedFormat(String),

    #[error("Failed to encode {format} export: {reason}")]
    Encode {
        format: ExportFormat,
        reason: String,
    },

    #[error("Failed to write export file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Json,
    Txt,
    Csv,
    Excel,
}

impl ExportFormat {
    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "txt" => Ok(ExportFormat::Txt),
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Result of a successful export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub count: usize,
}

/// Renders tasks in the given format
pub fn render(tasks: &[&Task], format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Json => {
            let records: Vec<TaskRecord> = tasks.iter().map(|t| t.to_record()).collect();
            to_pretty_json(&records).map_err(|e| ExportError::Encode {
                format,
                reason: e.to_string(),
            })
        }
        ExportFormat::Txt => Ok(render_txt(tasks).into_bytes()),
        ExportFormat::Csv => Ok(render_csv(tasks).into_bytes()),
        ExportFormat::Excel => {
            let rows: Vec<Vec<String>> = tasks.iter().map(|t| table_row(t).to_vec()).collect();
            xlsx::workbook(&HEADERS, &rows).map_err(|e| ExportError::Encode {
                format,
                reason: e.to_string(),
            })
        }
    }
}

/// Renders and writes tasks to `<stem>.<ext>`, returning the written path
pub fn write(tasks: &[&Task], format: ExportFormat, stem: &Path) -> Result<ExportSummary, ExportError> {
    let bytes = render(tasks, format)?;
    let path = path_for(stem, format);

    let write_err = |source| ExportError::Write {
        path: path.clone(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(&path, bytes).map_err(write_err)?;

    log::debug!("Exported {} tasks to {}", tasks.len(), path.display());
    Ok(ExportSummary {
        path,
        format,
        count: tasks.len(),
    })
}

/// Appends the format's extension to the stem (`report.v2` → `report.v2.csv`)
pub fn path_for(stem: &Path, format: ExportFormat) -> PathBuf {
    let mut name = stem.as_os_str().to_os_string();
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

fn status_word(task: &Task) -> &'static str {
    if task.completed {
        "Completada"
    } else {
        "Pendiente"
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Sí"
    } else {
        "No"
    }
}

fn table_row(task: &Task) -> [String; 4] {
    [
        task.description.clone(),
        yes_no(task.completed).to_string(),
        task.priority.to_string(),
        task.created_at_str(),
    ]
}

fn render_txt(tasks: &[&Task]) -> String {
    tasks
        .iter()
        .map(|t| format!("{} [{}] - {}\n", t.description, t.priority, status_word(t)))
        .collect()
}

fn render_csv(tasks: &[&Task]) -> String {
    let mut out = String::new();
    push_csv_line(&mut out, HEADERS.iter().copied());
    for task in tasks {
        let row = table_row(task);
        push_csv_line(&mut out, row.iter().map(String::as_str));
    }
    out
}

fn push_csv_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let line: Vec<Cow<'a, str>> = fields.map(csv_field).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

/// Quotes a field only when it contains a delimiter, quote or line break
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, TaskId};
    use tempfile::TempDir;

    fn task(n: u32, description: &str, priority: Priority, completed: bool) -> Task {
        let mut task = Task::new(TaskId::new(n).unwrap(), description, priority);
        if completed {
            task.mark_completed();
        }
        task
    }

    #[test]
    fn parse_formats() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(f)) if f == "pdf"
        ));
    }

    #[test]
    fn path_keeps_dots_in_stem() {
        assert_eq!(
            path_for(Path::new("out/report.v2"), ExportFormat::Csv),
            PathBuf::from("out/report.v2.csv")
        );
        assert_eq!(
            path_for(Path::new("export"), ExportFormat::Excel),
            PathBuf::from("export.xlsx")
        );
    }

    #[test]
    fn txt_lines() {
        let a = task(1, "Buy milk", Priority::High, true);
        let b = task(2, "Wash car", Priority::Medium, false);

        let text = render_txt(&[&a, &b]);
        assert_eq!(text, "Buy milk [alta] - Completada\nWash car [media] - Pendiente\n");
    }

    #[test]
    fn csv_header_and_rows() {
        let a = task(1, "Buy milk", Priority::High, true);

        let csv = render_csv(&[&a]);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], "Descripción,Completada,Prioridad,Fecha creación");
        assert_eq!(
            lines[1],
            format!("Buy milk,Sí,alta,{}", a.created_at_str())
        );
        assert_eq!(lines[2], "");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn csv_quotes_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn json_export_is_record_array() {
        let a = task(3, "Leer", Priority::Low, false);

        let bytes = render(&[&a], ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["id"], 3);
        assert_eq!(value[0]["descripcion"], "Leer");
        assert_eq!(value[0]["prioridad"], "baja");
        assert_eq!(value[0]["completada"], false);
    }

    #[test]
    fn write_creates_file_with_extension() {
        let dir = TempDir::new().unwrap();
        let a = task(1, "Buy milk", Priority::High, false);

        let summary = write(&[&a], ExportFormat::Txt, &dir.path().join("export")).unwrap();

        assert_eq!(summary.path, dir.path().join("export.txt"));
        assert_eq!(summary.count, 1);
        assert_eq!(
            fs::read_to_string(&summary.path).unwrap(),
            "Buy milk [alta] - Pendiente\n"
        );
    }

    #[test]
    fn excel_export_is_a_workbook() {
        let dir = TempDir::new().unwrap();
        let a = task(1, "Buy milk", Priority::High, true);

        let summary = write(&[&a], ExportFormat::Excel, &dir.path().join("tareas")).unwrap();
        assert_eq!(summary.path.extension().unwrap(), "xlsx");

        let file = fs::File::open(&summary.path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut sheet = String::new();
        std::io::Read::read_to_string(
            &mut archive.by_name("xl/worksheets/sheet1.xml").unwrap(),
            &mut sheet,
        )
        .unwrap();
        assert!(sheet.contains("Buy milk"));
        assert!(sheet.contains("Sí"));
        assert!(sheet.contains("Fecha creación"));
    }

    #[test]
    fn empty_selection_still_has_header() {
        let csv = String::from_utf8(render(&[], ExportFormat::Csv).unwrap()).unwrap();
        assert_eq!(csv, "Descripción,Completada,Prioridad,Fecha creación\r\n");

        let json = String::from_utf8(render(&[], ExportFormat::Json).unwrap()).unwrap();
        assert_eq!(json.trim(), "[]");
    }
}
