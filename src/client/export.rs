use chrono::{Local, TimeZone};
use clap::ValueEnum;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::todo::Todo;

/// UTF-8 byte-order mark; spreadsheet tools need it to detect the encoding.
pub const BOM: char = '\u{FEFF}';

const CSV_HEADER: [&str; 6] = ["ID", "Title", "Description", "Status", "Created At", "Updated At"];
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn default_file_name(self) -> &'static str {
        match self {
            ExportFormat::Json => "todos.json",
            ExportFormat::Csv => "todos.csv",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize todos: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn completed_label(completed: bool) -> &'static str {
    if completed {
        "Completed"
    } else {
        "Incomplete"
    }
}

pub fn to_json(todos: &[Todo]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(todos)?)
}

/// CSV with timestamps rendered in the local time zone.
pub fn to_csv(todos: &[Todo]) -> Result<String, ExportError> {
    to_csv_in(todos, &Local)
}

/// BOM-prefixed CSV, every field quoted, one `\n`-terminated record per todo.
pub fn to_csv_in<Tz>(todos: &[Todo], tz: &Tz) -> Result<String, ExportError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(BOM.to_string().into_bytes());

    writer.write_record(CSV_HEADER)?;
    for todo in todos {
        let id = todo.id.to_string();
        let created_at = todo.created_at.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string();
        let updated_at = todo.updated_at.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string();
        writer.write_record([
            id.as_str(),
            todo.title.as_str(),
            todo.description.as_deref().unwrap_or(""),
            completed_label(todo.completed),
            created_at.as_str(),
            updated_at.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn render(todos: &[Todo], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => to_json(todos),
        ExportFormat::Csv => to_csv(todos),
    }
}

pub fn write_export(path: &Path, todos: &[Todo], format: ExportFormat) -> Result<(), ExportError> {
    let content = render(todos, format)?;
    std::fs::write(path, content).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Exported {} todos to {}", todos.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::pipeline::{filter_and_sort, fixtures::todo, Filter, SortKey, SortOrder};
    use chrono::Utc;

    #[test]
    fn test_csv_doubles_embedded_quotes() {
        let todos = vec![todo("He said \"hi\"", false, 0)];
        let csv = to_csv_in(&todos, &Utc).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains(",\"He said \"\"hi\"\"\","));

        let mut reader = csv::Reader::from_reader(csv.trim_start_matches(BOM).as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[1], "He said \"hi\"");
    }

    #[test]
    fn test_csv_keeps_commas_and_newlines_in_one_field() {
        let mut todo = todo("Pack, then leave", false, 0);
        todo.description = Some("line one\nline two".to_string());
        let csv = to_csv_in(&[todo], &Utc).unwrap();

        let mut reader = csv::Reader::from_reader(csv.trim_start_matches(BOM).as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][1], "Pack, then leave");
        assert_eq!(&records[0][2], "line one\nline two");
    }

    #[test]
    fn test_csv_layout() {
        let mut done = todo("Ship release", true, 0);
        done.description = Some("v1.2".to_string());
        let csv = to_csv_in(&[done.clone(), todo("Draft notes", false, 1)], &Utc).unwrap();

        assert!(csv.starts_with(BOM));
        let lines: Vec<&str> = csv.trim_start_matches(BOM).lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "\"ID\",\"Title\",\"Description\",\"Status\",\"Created At\",\"Updated At\""
        );
        assert_eq!(
            lines[1],
            format!(
                "\"{}\",\"Ship release\",\"v1.2\",\"Completed\",\"2025/06/01 09:00:00\",\"2025/06/01 09:00:00\"",
                done.id
            )
        );
        assert!(lines[2].contains(",\"Draft notes\",\"\",\"Incomplete\","));
    }

    #[test]
    fn test_json_round_trip_of_visible_view() {
        let todos = vec![
            todo("banana", true, 0),
            todo("Apple", false, 1),
            todo("cherry", true, 2),
        ];
        let visible = filter_and_sort(&todos, Filter::Completed, "", SortKey::Title, SortOrder::Asc);

        let json = to_json(&visible).unwrap();
        assert!(json.contains("\n  {"));
        let parsed: Vec<Todo> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, visible);
    }

    #[test]
    fn test_write_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ExportFormat::Csv.default_file_name());

        write_export(&path, &[todo("File me", false, 0)], ExportFormat::Csv).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"File me\""));
    }
}
