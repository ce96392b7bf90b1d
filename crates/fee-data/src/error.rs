//! Error types for the fee-data crate.
//!
//! Every variant here is a structural problem with the input: the dataset
//! cannot be built at all. Missing optional columns are not errors; they
//! simply leave the corresponding record fields empty.

use thiserror::Error;

/// Errors that can occur while loading, validating or exporting fee tables
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading or writing a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The file extension does not map to a known tabular format
    #[error("Unsupported table format '{extension}' for {path}")]
    UnsupportedFormat { path: String, extension: String },

    /// Line or row in a table couldn't be parsed
    ///
    /// This variant stores context about where the error occurred
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A row has more cells than the header declares
    #[error("Expected at most {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },

    /// A required column is absent from the header
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    /// The same header appears more than once
    #[error("Duplicate column: {column}")]
    DuplicateColumn { column: String },

    /// A grade token was listed in two tier vocabularies
    #[error("Grade token '{token}' is listed in both tier {first} and tier {second}")]
    OverlappingVocabulary {
        token: String,
        first: String,
        second: String,
    },

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
