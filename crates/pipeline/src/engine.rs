//! # Filter Engine
//!
//! Coordinates one full evaluation pass:
//! 1. Run every record through the standard filter chain
//! 2. Project survivors onto the identity/display columns
//! 3. Drop duplicate projected rows, keeping the first occurrence
//!
//! The engine holds no per-evaluation state. It is built once per
//! vocabulary and re-run in full whenever the FilterSpec changes.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use fee_data::{FeeDataset, FeeRecord, GradeVocabulary, ProjectedRow, ResultTable};
use selection::FilterSpec;
use tracing::info;

use crate::filter_pipeline::{FilterPipeline, FilterStep};
use crate::filters::{
    CancerTransplantFilter, DepartmentFilter, ExcludeTagFilter, GradeTierFilter, TestroomFilter,
};

/// The standard filter chain, in canonical order:
/// tier A, tier B, tier C, exclude tag, department, cancer/transplant, test room
pub fn standard_pipeline(vocabulary: Arc<GradeVocabulary>) -> FilterPipeline {
    FilterPipeline::new()
        .add_filter(GradeTierFilter::tier_a(vocabulary.clone()))
        .add_filter(GradeTierFilter::tier_b(vocabulary.clone()))
        .add_filter(GradeTierFilter::tier_c(vocabulary))
        .add_filter(ExcludeTagFilter)
        .add_filter(DepartmentFilter)
        .add_filter(CancerTransplantFilter)
        .add_filter(TestroomFilter)
}

/// Stateless evaluator: dataset × FilterSpec → ResultTable
pub struct FilterEngine {
    vocabulary: Arc<GradeVocabulary>,
    pipeline: FilterPipeline,
}

impl FilterEngine {
    /// Create an engine running the standard filter chain
    pub fn new(vocabulary: Arc<GradeVocabulary>) -> Self {
        let pipeline = standard_pipeline(vocabulary.clone());
        Self {
            vocabulary,
            pipeline,
        }
    }

    /// Create an engine with a custom filter chain
    pub fn with_pipeline(vocabulary: Arc<GradeVocabulary>, pipeline: FilterPipeline) -> Self {
        Self {
            vocabulary,
            pipeline,
        }
    }

    pub fn vocabulary(&self) -> &GradeVocabulary {
        &self.vocabulary
    }

    pub fn pipeline(&self) -> &FilterPipeline {
        &self.pipeline
    }

    /// Surviving records in input order. The input is left untouched.
    pub fn filter(&self, records: &[FeeRecord], spec: &FilterSpec) -> Vec<FeeRecord> {
        self.pipeline.apply(records.to_vec(), spec)
    }

    /// Like `filter`, reporting every step to `observer`
    pub fn filter_with_progress<F>(&self, records: &[FeeRecord], spec: &FilterSpec, observer: F) -> Vec<FeeRecord>
    where
        F: FnMut(&FilterStep),
    {
        self.pipeline.apply_with_progress(records.to_vec(), spec, observer)
    }

    /// Like `filter`, evaluating rows in parallel
    pub fn filter_parallel(&self, records: &[FeeRecord], spec: &FilterSpec) -> Vec<FeeRecord> {
        self.pipeline.apply_parallel(records, spec)
    }

    /// Filter, project and deduplicate a dataset
    pub fn evaluate(&self, dataset: &FeeDataset, spec: &FilterSpec) -> ResultTable {
        self.evaluate_with_progress(dataset, spec, |_| {})
    }

    /// Like `evaluate`, reporting every filter step to `observer`
    pub fn evaluate_with_progress<F>(&self, dataset: &FeeDataset, spec: &FilterSpec, observer: F) -> ResultTable
    where
        F: FnMut(&FilterStep),
    {
        let start = Instant::now();
        let survivors = self.filter_with_progress(&dataset.records, spec, observer);
        let table = project(&survivors, dataset.has_note);
        info!(
            "Evaluated {} records: {} survived, {} unique rows ({:?})",
            dataset.len(),
            survivors.len(),
            table.len(),
            start.elapsed()
        );
        table
    }
}

/// Reduce records to their identity/display columns and drop duplicates.
///
/// Duplicates are judged on the projected columns only, so rows differing
/// just in filtered-out columns collapse to one. The note takes part only
/// when `include_note` is set. First occurrences keep their order.
pub fn project(records: &[FeeRecord], include_note: bool) -> ResultTable {
    let mut seen: HashSet<ProjectedRow> = HashSet::new();
    let mut rows = Vec::new();

    for record in records {
        let row = ProjectedRow {
            code: record.code.clone(),
            name: record.name.clone(),
            calculated_name: record.calculated_name.clone(),
            note: if include_note { record.note.clone() } else { None },
        };
        if seen.insert(row.clone()) {
            rows.push(row);
        }
    }

    ResultTable { include_note, rows }
}
