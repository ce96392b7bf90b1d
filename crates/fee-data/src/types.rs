//! Core domain types for fee tables.
//!
//! This module defines the data structures shared by the loader, the
//! filtering pipeline and the exporter:
//! - `RawTable`: a header plus string cells, exactly as read from disk
//! - `FeeRecord`: one normalized billing row
//! - `FeeDataset`: all records of a session plus column metadata
//! - `ProjectedRow` / `ResultTable`: the deduplicated output shape
//! - `ColumnNames`: the header naming convention (configurable)

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// =============================================================================
// Constants
// =============================================================================

/// Number of department slots a record can carry (`진료과1`..`진료과6`)
pub const DEPARTMENT_SLOTS: usize = 6;

/// Number of test-room slots a record can carry (`검사실1`..`검사실3`)
pub const TESTROOM_SLOTS: usize = 3;

/// Marker value meaning "this flag applies" in the cancer/transplant columns
pub const APPLIES_MARKER: &str = "O";

/// Separator used inside the grade source column
pub const GRADE_SEPARATOR: char = '/';

/// Sheet name used when exporting results
pub const RESULT_SHEET_NAME: &str = "결과";

// =============================================================================
// Raw table
// =============================================================================

/// A table as read from disk: headers plus string cells.
///
/// Rows may be shorter than the header; missing trailing cells read as blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Where the table came from (file path or a label in tests)
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(source: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            source: source.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Builder-style row insertion, handy for tests and small fixtures
    pub fn with_row<S: AsRef<str>>(mut self, cells: &[S]) -> Self {
        self.rows
            .push(cells.iter().map(|c| c.as_ref().to_string()).collect());
        self
    }

    /// Position of a header, if present
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (row, column), treating cells past the end of a short row as blank
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

// =============================================================================
// Column naming
// =============================================================================

/// Header names used to locate each field.
///
/// Defaults follow the Korean fee-schedule workbook layout. Can be overridden
/// from a JSON file; any key left out keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Delimited facility grade column (required)
    pub grade: String,
    pub exclude: String,
    /// Department slots are `<prefix>1`..`<prefix>6`
    pub department_prefix: String,
    pub cancer: String,
    pub transplant: String,
    pub testrooms: Vec<String>,
    /// Billing code (required)
    pub code: String,
    /// Display name (required)
    pub name: String,
    /// Calculated name (required)
    pub calculated_name: String,
    pub note: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            grade: "병원등급".to_string(),
            exclude: "제외".to_string(),
            department_prefix: "진료과".to_string(),
            cancer: "종양여부".to_string(),
            transplant: "이식".to_string(),
            testrooms: vec![
                "검사실1".to_string(),
                "검사실2".to_string(),
                "검사실3".to_string(),
            ],
            code: "EDI코드".to_string(),
            name: "명칭".to_string(),
            calculated_name: "산정명칭".to_string(),
            note: "특이사항".to_string(),
        }
    }
}

impl ColumnNames {
    /// Read column names from a JSON file; missing keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Columns that must exist for a dataset to be usable
    pub fn required(&self) -> [&str; 4] {
        [
            self.grade.as_str(),
            self.code.as_str(),
            self.name.as_str(),
            self.calculated_name.as_str(),
        ]
    }
}

// =============================================================================
// Records
// =============================================================================

/// One billable item, normalized at load time.
///
/// Every optional text field is trimmed and blank cells become `None`, so
/// predicates never need to re-normalize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRecord {
    pub code: String,
    pub name: String,
    pub calculated_name: String,
    pub note: Option<String>,
    /// Tokens of the grade column split on `/`, trimmed, blanks dropped
    pub grade_tags: Vec<String>,
    pub exclude_tag: Option<String>,
    /// One entry per department column found in the source, in slot order.
    ///
    /// Empty when the source has no department columns at all.
    pub departments: Vec<Option<String>>,
    pub cancer_flag: Option<String>,
    pub transplant_flag: Option<String>,
    /// One entry per test-room column found in the source
    pub testrooms: Vec<Option<String>>,
}

impl FeeRecord {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        calculated_name: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            calculated_name: calculated_name.into(),
            ..Self::default()
        }
    }

    /// Set grade tags from the raw delimited string, e.g. `"의원 / 병원"`
    pub fn with_grades(mut self, raw: &str) -> Self {
        self.grade_tags = split_grade_tags(raw);
        self
    }

    pub fn with_exclude_tag(mut self, tag: &str) -> Self {
        self.exclude_tag = normalize_cell(tag);
        self
    }

    pub fn with_departments(mut self, slots: &[&str]) -> Self {
        self.departments = slots.iter().map(|s| normalize_cell(s)).collect();
        self
    }

    pub fn with_testrooms(mut self, slots: &[&str]) -> Self {
        self.testrooms = slots.iter().map(|s| normalize_cell(s)).collect();
        self
    }

    pub fn with_cancer_flag(mut self, flag: &str) -> Self {
        self.cancer_flag = normalize_cell(flag);
        self
    }

    pub fn with_transplant_flag(mut self, flag: &str) -> Self {
        self.transplant_flag = normalize_cell(flag);
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = normalize_cell(note);
        self
    }

    pub fn is_cancer(&self) -> bool {
        self.cancer_flag.as_deref() == Some(APPLIES_MARKER)
    }

    pub fn is_transplant(&self) -> bool {
        self.transplant_flag.as_deref() == Some(APPLIES_MARKER)
    }

    /// Department values actually present (blank slots skipped)
    pub fn department_values(&self) -> impl Iterator<Item = &str> {
        self.departments.iter().filter_map(|d| d.as_deref())
    }

    /// Test-room values actually present (blank slots skipped)
    pub fn testroom_values(&self) -> impl Iterator<Item = &str> {
        self.testrooms.iter().filter_map(|t| t.as_deref())
    }
}

/// Trim a cell; blank cells are absent.
pub fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split a grade cell on `/`, trimming each token and dropping empty ones.
///
/// Example: `" 의원 / 병원 //"` -> `["의원", "병원"]`
pub fn split_grade_tags(raw: &str) -> Vec<String> {
    raw.split(GRADE_SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Dataset
// =============================================================================

/// All records of one session plus what the loader learned about the columns.
///
/// The impl block with loading logic lives in `dataset.rs`.
#[derive(Debug, Clone, Default)]
pub struct FeeDataset {
    pub source: String,
    pub records: Vec<FeeRecord>,
    /// Whether the source carried a note column (controls output projection)
    pub has_note: bool,
    /// Department headers found, in slot order
    pub department_columns: Vec<String>,
    /// Test-room headers found, in slot order
    pub testroom_columns: Vec<String>,
    pub has_exclude: bool,
    pub has_cancer: bool,
    pub has_transplant: bool,
}

// =============================================================================
// Output
// =============================================================================

/// A record reduced to its identity/display columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectedRow {
    pub code: String,
    pub name: String,
    pub calculated_name: String,
    pub note: Option<String>,
}

impl ProjectedRow {
    /// Cells in header order; the note cell is only emitted when requested
    pub fn cells(&self, include_note: bool) -> Vec<&str> {
        let mut cells = vec![
            self.code.as_str(),
            self.name.as_str(),
            self.calculated_name.as_str(),
        ];
        if include_note {
            cells.push(self.note.as_deref().unwrap_or(""));
        }
        cells
    }
}

/// The filtered, projected and deduplicated result of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    pub include_note: bool,
    pub rows: Vec<ProjectedRow>,
}

impl ResultTable {
    /// Header row matching `ProjectedRow::cells`
    pub fn headers(&self, columns: &ColumnNames) -> Vec<String> {
        let mut headers = vec![
            columns.code.clone(),
            columns.name.clone(),
            columns.calculated_name.clone(),
        ];
        if self.include_note {
            headers.push(columns.note.clone());
        }
        headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
