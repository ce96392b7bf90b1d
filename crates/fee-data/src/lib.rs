//! # Fee Data Crate
//!
//! This crate loads fee-schedule tables and writes filtered results.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (FeeRecord, FeeDataset, ResultTable, ColumnNames)
//! - **grade**: Tier A/B/C grade vocabularies
//! - **parser**: Parse `.tsv` / `.json` tables into a `RawTable`
//! - **dataset**: Validate headers and normalize rows into a `FeeDataset`
//! - **export**: Write a `ResultTable` as a single-sheet file
//! - **error**: Error types for loading and export
//!
//! ## Example Usage
//!
//! ```ignore
//! use fee_data::{ColumnNames, FeeDataset};
//! use std::path::Path;
//!
//! let columns = ColumnNames::default();
//! let dataset = FeeDataset::load(Path::new("data/fees.tsv"), &columns)?;
//!
//! println!("{} records, departments: {:?}", dataset.len(), dataset.departments());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod grade;
pub mod parser;
pub mod dataset;
pub mod export;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use grade::{GradeVocabulary, Tier};
pub use types::{
    // Constants
    APPLIES_MARKER,
    DEPARTMENT_SLOTS,
    TESTROOM_SLOTS,
    // Core types
    ColumnNames,
    FeeDataset,
    FeeRecord,
    ProjectedRow,
    RawTable,
    ResultTable,
};
pub use export::write_result;
