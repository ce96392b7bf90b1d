//! Writers for filtered results.
//!
//! A result is always exported as a single sheet with a header row. The
//! output format follows the file extension, same as loading:
//! - `.tsv` / `.txt`: header line then one line per row
//! - `.json`: `{"sheet": "결과", "headers": [...], "rows": [[...], ...]}`

use crate::error::Result;
use crate::parser::TableFormat;
use crate::types::{ColumnNames, RESULT_SHEET_NAME, ResultTable};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// JSON shape of an exported sheet
#[derive(Debug, Serialize)]
struct Sheet<'a> {
    sheet: &'a str,
    headers: Vec<String>,
    rows: Vec<Vec<&'a str>>,
}

/// Write `table` to `path` in the format implied by its extension
pub fn write_result(table: &ResultTable, columns: &ColumnNames, path: &Path) -> Result<()> {
    let content = match TableFormat::from_path(path)? {
        TableFormat::Tsv => render_tsv(table, columns),
        TableFormat::Json => render_json(table, columns)?,
    };
    fs::write(path, content)?;
    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Render as tab-separated text.
///
/// Tabs and line breaks inside a cell would break the row structure, so they
/// are replaced by single spaces.
pub fn render_tsv(table: &ResultTable, columns: &ColumnNames) -> String {
    let mut out = String::new();
    push_tsv_line(&mut out, table.headers(columns).iter().map(String::as_str));
    for row in &table.rows {
        push_tsv_line(&mut out, row.cells(table.include_note).into_iter());
    }
    out
}

fn push_tsv_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let line: Vec<String> = cells
        .map(|cell| cell.replace(['\t', '\r', '\n'], " "))
        .collect();
    out.push_str(&line.join("\t"));
    out.push('\n');
}

/// Render as a pretty-printed JSON sheet
pub fn render_json(table: &ResultTable, columns: &ColumnNames) -> Result<String> {
    let sheet = Sheet {
        sheet: RESULT_SHEET_NAME,
        headers: table.headers(columns),
        rows: table
            .rows
            .iter()
            .map(|row| row.cells(table.include_note))
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&sheet)?)
}
