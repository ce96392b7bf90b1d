//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! independent row predicates to be applied to fee records.

use fee_data::FeeRecord;
use selection::FilterSpec;

/// Core trait for filtering fee records.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be evaluated across rows in parallel
/// - `keep` is a total predicate over one record: absent or empty fields are
///   ordinary input, never an error
/// - `apply` takes ownership of the Vec and returns the survivors in their
///   original relative order
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Whether `record` survives this filter under `spec`
    fn keep(&self, record: &FeeRecord, spec: &FilterSpec) -> bool;

    /// Apply this filter to a set of records.
    ///
    /// # Arguments
    /// * `records` - The records to filter (takes ownership)
    /// * `spec` - The resolved selection criteria
    fn apply(&self, records: Vec<FeeRecord>, spec: &FilterSpec) -> Vec<FeeRecord> {
        records
            .into_iter()
            .filter(|record| self.keep(record, spec))
            .collect()
    }
}
