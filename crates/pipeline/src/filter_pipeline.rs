//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::traits::Filter;
use fee_data::FeeRecord;
use rayon::prelude::*;
use selection::FilterSpec;
use tracing;

/// Progress report emitted after each filter step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterStep {
    /// 1-based position of the filter that just ran
    pub index: usize,
    pub total: usize,
    pub name: String,
    /// Records still alive after this step
    pub remaining: usize,
}

/// Chains multiple filters together into a processing pipeline.
///
/// Filters are combined by logical AND, so the surviving set does not
/// depend on the order they were added in; only intermediate counts do.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(GradeTierFilter::tier_a(vocabulary.clone()))
///     .add_filter(ExcludeTagFilter)
///     .add_filter(DepartmentFilter);
///
/// let filtered = pipeline.apply(records, &spec);
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    ///
    /// # Arguments
    /// * `filter` - Any type implementing the Filter trait
    ///
    /// # Returns
    /// Self for method chaining
    pub fn add_filter(self, filter: impl Filter + 'static) -> Self {
        self.add_boxed(Box::new(filter))
    }

    /// Add an already boxed filter (builder pattern).
    pub fn add_boxed(mut self, filter: Box<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Filter names in evaluation order
    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Whether a single record passes every filter
    pub fn keep(&self, record: &FeeRecord, spec: &FilterSpec) -> bool {
        self.filters.iter().all(|filter| filter.keep(record, spec))
    }

    /// Apply all filters in sequence to the records.
    ///
    /// ## Algorithm
    /// 1. Start with the input records
    /// 2. For each filter in order:
    ///    a. Log filter name and input count
    ///    b. Apply the filter
    ///    c. Log output count
    /// 3. Return final filtered set
    pub fn apply(&self, records: Vec<FeeRecord>, spec: &FilterSpec) -> Vec<FeeRecord> {
        self.apply_with_progress(records, spec, |_| {})
    }

    /// Same as `apply`, reporting each completed step to `observer`.
    ///
    /// The observer only sees counts; it cannot influence the result.
    pub fn apply_with_progress<F>(
        &self,
        records: Vec<FeeRecord>,
        spec: &FilterSpec,
        mut observer: F,
    ) -> Vec<FeeRecord>
    where
        F: FnMut(&FilterStep),
    {
        let total = self.filters.len();
        let mut current = records;
        for (idx, filter) in self.filters.iter().enumerate() {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, spec);
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
            observer(&FilterStep {
                index: idx + 1,
                total,
                name: filter.name().to_string(),
                remaining: current.len(),
            });
        }
        current
    }

    /// Evaluate all filters per row in one fused, parallel scan.
    ///
    /// Produces exactly what `apply` produces, in the same order.
    pub fn apply_parallel(&self, records: &[FeeRecord], spec: &FilterSpec) -> Vec<FeeRecord> {
        records
            .par_iter()
            .filter(|record| self.keep(record, spec))
            .cloned()
            .collect()
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
