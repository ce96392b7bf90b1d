//! Parsers for tabular fee files.
//!
//! Two on-disk shapes are supported:
//! - tab-separated text (`.tsv`, `.txt`): the first non-blank line is the header
//! - JSON (`.json`): an array of row objects keyed by header name
//!
//! Both produce a `RawTable` of untyped string cells. Typing and
//! normalization happen later, in `dataset.rs`.

use crate::error::{DataLoadError, Result};
use crate::types::RawTable;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Table formats recognised by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Tsv,
    Json,
}

impl TableFormat {
    /// Pick a format from the path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "tsv" | "txt" => Ok(TableFormat::Tsv),
            "json" => Ok(TableFormat::Json),
            _ => Err(DataLoadError::UnsupportedFormat {
                path: path.display().to_string(),
                extension,
            }),
        }
    }
}

/// Read a table from disk, choosing the parser by extension
pub fn parse_table(path: &Path) -> Result<RawTable> {
    let format = TableFormat::from_path(path)?;
    let content = read_utf8(path)?;
    let source = path.display().to_string();
    match format {
        TableFormat::Tsv => parse_tsv_str(&source, &content),
        TableFormat::Json => parse_json_str(&source, &content),
    }
}

/// Read a UTF-8 file, dropping a leading byte-order mark
fn read_utf8(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    Ok(match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Parse tab-separated text as spreadsheets export it.
///
/// ## Rules
/// 1. Cells may be quoted; quoted cells can hold tabs, line breaks and
///    doubled quotes
/// 2. Blank lines are skipped
/// 3. The first remaining record is the header
/// 4. Rows shorter than the header are padded with blank cells
/// 5. Rows longer than the header are rejected
pub fn parse_tsv_str(source: &str, content: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut records = reader
        .records()
        .map(|record| record.map_err(|e| csv_parse_error(source, e)))
        .filter(|record| match record {
            Ok(record) => !record.iter().all(|cell| cell.trim().is_empty()),
            Err(_) => true,
        });

    let header = records.next().ok_or_else(|| DataLoadError::ParseError {
        file: source.to_string(),
        line: 1,
        reason: "Missing header line".to_string(),
    })??;
    let headers: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
    let mut table = RawTable::new(source, headers);
    let width = table.headers.len();

    for record in records {
        let record = record?;
        if record.len() > width {
            return Err(DataLoadError::FieldCountMismatch {
                expected: width,
                found: record.len(),
                line: record_line(&record),
            });
        }
        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        cells.resize(width, String::new());
        table.rows.push(cells);
    }

    Ok(table)
}

fn record_line(record: &csv::StringRecord) -> usize {
    record.position().map_or(0, |p| p.line() as usize)
}

fn csv_parse_error(source: &str, err: csv::Error) -> DataLoadError {
    DataLoadError::ParseError {
        file: source.to_string(),
        line: err.position().map_or(0, |p| p.line() as usize),
        reason: err.to_string(),
    }
}

/// Parse a JSON array of row objects.
///
/// Headers are collected in first-seen order across all rows (object keys
/// keep their file order); a row without a given key reads that cell as blank.
pub fn parse_json_str(source: &str, content: &str) -> Result<RawTable> {
    let value: Value = serde_json::from_str(content)?;
    let rows = value.as_array().ok_or_else(|| DataLoadError::ParseError {
        file: source.to_string(),
        line: 1,
        reason: "Expected a JSON array of row objects".to_string(),
    })?;

    let mut objects = Vec::with_capacity(rows.len());
    let mut headers: Vec<String> = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let object = row.as_object().ok_or_else(|| DataLoadError::ParseError {
            file: source.to_string(),
            line: idx + 1,
            reason: format!("Row {} is not an object", idx + 1),
        })?;
        for key in object.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
        objects.push(object);
    }

    let mut table = RawTable::new(source, headers);
    for object in objects {
        let cells = table
            .headers
            .iter()
            .map(|h| object.get(h).map(json_cell).unwrap_or_default())
            .collect();
        table.rows.push(cells);
    }
    Ok(table)
}

/// Render a JSON cell as text: strings as-is, null as blank
fn json_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
