//! FeeDataset building logic.
//!
//! Turns a `RawTable` into typed `FeeRecord`s:
//! - Validate the header (required columns present, no duplicates)
//! - Resolve optional columns and department slots once
//! - Normalize every row in parallel
//! - Expose the option lists a selection UI offers

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::{info, warn};

/// Column positions resolved from the header, computed once per table
#[derive(Debug)]
struct ColumnLayout {
    grade: usize,
    code: usize,
    name: usize,
    calculated_name: usize,
    note: Option<usize>,
    exclude: Option<usize>,
    departments: Vec<(String, usize)>,
    cancer: Option<usize>,
    transplant: Option<usize>,
    testrooms: Vec<(String, usize)>,
}

impl ColumnLayout {
    fn resolve(table: &RawTable, columns: &ColumnNames) -> Result<Self> {
        let mut seen = HashSet::new();
        for header in table.headers.iter().filter(|h| !h.is_empty()) {
            if !seen.insert(header.as_str()) {
                return Err(DataLoadError::DuplicateColumn {
                    column: header.clone(),
                });
            }
        }

        let required = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| DataLoadError::MissingColumn {
                    column: name.to_string(),
                })
        };

        if columns.testrooms.len() > TESTROOM_SLOTS {
            return Err(DataLoadError::ValidationError(format!(
                "At most {} test-room columns are supported, {} configured",
                TESTROOM_SLOTS,
                columns.testrooms.len()
            )));
        }

        Ok(Self {
            grade: required(columns.grade.as_str())?,
            code: required(columns.code.as_str())?,
            name: required(columns.name.as_str())?,
            calculated_name: required(columns.calculated_name.as_str())?,
            note: table.column_index(&columns.note),
            exclude: table.column_index(&columns.exclude),
            departments: discover_department_slots(table, &columns.department_prefix)?,
            cancer: table.column_index(&columns.cancer),
            transplant: table.column_index(&columns.transplant),
            testrooms: columns
                .testrooms
                .iter()
                .filter_map(|name| table.column_index(name).map(|idx| (name.clone(), idx)))
                .collect(),
        })
    }

    fn record(&self, table: &RawTable, row: usize) -> FeeRecord {
        let optional = |column: Option<usize>| column.and_then(|c| normalize_cell(table.cell(row, c)));

        FeeRecord {
            code: table.cell(row, self.code).trim().to_string(),
            name: table.cell(row, self.name).trim().to_string(),
            calculated_name: table.cell(row, self.calculated_name).trim().to_string(),
            note: optional(self.note),
            grade_tags: split_grade_tags(table.cell(row, self.grade)),
            exclude_tag: optional(self.exclude),
            departments: self
                .departments
                .iter()
                .map(|(_, c)| normalize_cell(table.cell(row, *c)))
                .collect(),
            cancer_flag: optional(self.cancer),
            transplant_flag: optional(self.transplant),
            testrooms: self
                .testrooms
                .iter()
                .map(|(_, c)| normalize_cell(table.cell(row, *c)))
                .collect(),
        }
    }
}

/// Find `<prefix><n>` headers with n in 1..=DEPARTMENT_SLOTS, ordered by n.
///
/// Only the plain decimal spelling counts (`진료과1`, not `진료과01`).
/// Other headers that share the prefix are ignored with a warning. Two
/// headers claiming the same slot number is a structural error.
fn discover_department_slots(table: &RawTable, prefix: &str) -> Result<Vec<(String, usize)>> {
    let mut slots: Vec<(usize, String, usize)> = Vec::new();
    for (idx, header) in table.headers.iter().enumerate() {
        let Some(suffix) = header.strip_prefix(prefix) else {
            continue;
        };
        match suffix.parse::<usize>() {
            Ok(n) if n.to_string() == suffix && (1..=DEPARTMENT_SLOTS).contains(&n) => {
                if let Some((_, first, _)) = slots.iter().find(|(slot, _, _)| *slot == n) {
                    return Err(DataLoadError::ValidationError(format!(
                        "Columns '{}' and '{}' both map to department slot {}",
                        first, header, n
                    )));
                }
                slots.push((n, header.clone(), idx));
            }
            _ => warn!(
                "Ignoring column '{}': department slots are {}1..{}{}",
                header, prefix, prefix, DEPARTMENT_SLOTS
            ),
        }
    }
    slots.sort_by_key(|(n, _, _)| *n);
    Ok(slots
        .into_iter()
        .map(|(_, header, idx)| (header, idx))
        .collect())
}

impl FeeDataset {
    /// Load and normalize a fee table from disk.
    ///
    /// Fails on unreadable files, unknown formats, malformed rows and
    /// missing required columns. Missing optional columns are fine.
    pub fn load(path: &Path, columns: &ColumnNames) -> Result<Self> {
        info!("Loading fee table from {}", path.display());
        let table = parser::parse_table(path)?;
        Self::from_table(&table, columns)
    }

    /// Build a dataset from an already parsed table
    pub fn from_table(table: &RawTable, columns: &ColumnNames) -> Result<Self> {
        let layout = ColumnLayout::resolve(table, columns)?;

        // Rows are independent, so normalize them in parallel.
        // Indexed parallel iterators keep the input order on collect.
        let records: Vec<FeeRecord> = (0..table.rows.len())
            .into_par_iter()
            .map(|row| layout.record(table, row))
            .collect();

        let dataset = FeeDataset {
            source: table.source.clone(),
            records,
            has_note: layout.note.is_some(),
            department_columns: layout.departments.iter().map(|(h, _)| h.clone()).collect(),
            testroom_columns: layout.testrooms.iter().map(|(h, _)| h.clone()).collect(),
            has_exclude: layout.exclude.is_some(),
            has_cancer: layout.cancer.is_some(),
            has_transplant: layout.transplant.is_some(),
        };

        info!(
            "Loaded {} records from {} ({} department slots, {} test-room slots, note column: {})",
            dataset.records.len(),
            dataset.source,
            dataset.department_columns.len(),
            dataset.testroom_columns.len(),
            dataset.has_note
        );
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted unique department values across all slots
    pub fn departments(&self) -> Vec<String> {
        sorted_unique(self.records.iter().flat_map(|r| r.department_values()))
    }

    /// Sorted unique exclude-tag values
    pub fn exclude_values(&self) -> Vec<String> {
        sorted_unique(self.records.iter().filter_map(|r| r.exclude_tag.as_deref()))
    }

    /// Sorted unique test-room values across all slots
    pub fn testroom_values(&self) -> Vec<String> {
        sorted_unique(self.records.iter().flat_map(|r| r.testroom_values()))
    }

    pub fn has_department(&self, value: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.department_values().any(|d| d == value))
    }
}

fn sorted_unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_table() -> RawTable {
        RawTable::new(
            "test",
            headers(&[
                "EDI코드", "명칭", "산정명칭", "병원등급", "제외", "진료과2", "진료과1", "종양여부",
                "검사실1", "특이사항",
            ]),
        )
        .with_row(&["A1", "검사", "검사(1)", "의원/ 병원", "", "내과", "공통", "O", "", "비고"])
        .with_row(&["A2", "처치", "처치", "", "야간", "", "외과", " ", "병리", ""])
    }

    #[test]
    fn test_from_table_normalizes_rows() {
        let dataset = FeeDataset::from_table(&create_test_table(), &ColumnNames::default()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(dataset.has_note);
        assert!(!dataset.has_transplant);

        // Slots are ordered by number, not by header position
        assert_eq!(dataset.department_columns, vec!["진료과1", "진료과2"]);

        let first = &dataset.records[0];
        assert_eq!(first.grade_tags, vec!["의원", "병원"]);
        assert_eq!(first.exclude_tag, None);
        assert_eq!(
            first.departments,
            vec![Some("공통".to_string()), Some("내과".to_string())]
        );
        assert!(first.is_cancer());
        assert_eq!(first.note.as_deref(), Some("비고"));

        let second = &dataset.records[1];
        assert!(second.grade_tags.is_empty());
        assert_eq!(second.cancer_flag, None);
        assert_eq!(second.testrooms, vec![Some("병리".to_string())]);
    }

    #[test]
    fn test_missing_grade_column_is_structural() {
        let table = RawTable::new("test", headers(&["EDI코드", "명칭", "산정명칭"]))
            .with_row(&["A1", "검사", "검사"]);
        let err = FeeDataset::from_table(&table, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn { ref column } if column == "병원등급"));
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let table = RawTable::new("test", headers(&["EDI코드", "명칭", "산정명칭", "병원등급"]))
            .with_row(&["A1", "검사", "검사", "의원"]);
        let dataset = FeeDataset::from_table(&table, &ColumnNames::default()).unwrap();
        let record = &dataset.records[0];
        assert!(record.departments.is_empty());
        assert!(record.testrooms.is_empty());
        assert!(!dataset.has_note);
        assert!(dataset.departments().is_empty());
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let table = RawTable::new("test", headers(&["EDI코드", "명칭", "산정명칭", "병원등급", "명칭"]));
        let err = FeeDataset::from_table(&table, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, DataLoadError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_out_of_range_department_slot_ignored() {
        let table = RawTable::new(
            "test",
            headers(&["EDI코드", "명칭", "산정명칭", "병원등급", "진료과1", "진료과7", "진료과비고"]),
        )
        .with_row(&["A1", "검사", "검사", "", "내과", "외과", "메모"]);
        let dataset = FeeDataset::from_table(&table, &ColumnNames::default()).unwrap();
        assert_eq!(dataset.department_columns, vec!["진료과1"]);
        assert_eq!(dataset.departments(), vec!["내과"]);
    }

    #[test]
    fn test_department_slots_need_plain_numbers() {
        let table = RawTable::new(
            "test",
            headers(&[
                "EDI코드", "명칭", "산정명칭", "병원등급", "진료과1", "진료과01", "진료과+1", "진료과2",
                "진료과3", "진료과4", "진료과5", "진료과6",
            ]),
        )
        .with_row(&["A1", "검사", "검사", "", "내과", "외과", "안과", "", "", "", "", ""]);
        let dataset = FeeDataset::from_table(&table, &ColumnNames::default()).unwrap();
        assert_eq!(
            dataset.department_columns,
            vec!["진료과1", "진료과2", "진료과3", "진료과4", "진료과5", "진료과6"]
        );
        assert_eq!(dataset.records[0].departments.len(), DEPARTMENT_SLOTS);
        assert_eq!(dataset.departments(), vec!["내과"]);
    }

    #[test]
    fn test_repeated_department_slot_rejected() {
        let table = RawTable::new("test", headers(&["진료과1", "진료과2"]));
        let slots = discover_department_slots(&table, "진료과").unwrap();
        assert_eq!(slots.len(), 2);

        let table = RawTable::new("test", headers(&["진료과1", "진료과2", "진료과1"]));
        assert!(matches!(
            discover_department_slots(&table, "진료과"),
            Err(DataLoadError::ValidationError(_))
        ));
    }

    #[test]
    fn test_option_lists_are_sorted_and_unique() {
        let dataset = FeeDataset::from_table(&create_test_table(), &ColumnNames::default()).unwrap();
        assert_eq!(dataset.departments(), vec!["공통", "내과", "외과"]);
        assert_eq!(dataset.exclude_values(), vec!["야간"]);
        assert_eq!(dataset.testroom_values(), vec!["병리"]);
        assert!(dataset.has_department("공통"));
        assert!(!dataset.has_department("안과"));
    }
}
