//! Pipeline for filtering fee records.
//!
//! This crate provides:
//! - Filter trait and implementations for row predicates
//! - FilterPipeline for composing filters
//! - FilterEngine for full evaluation: filter, project, deduplicate
//!
//! ## Architecture
//! Each filter is an independent predicate over one record; the pipeline
//! combines them by logical AND:
//! 1. Grade tier filters (A any-match, B/C all-match)
//! 2. Exclude tag, department, cancer/transplant and test room filters
//! 3. Survivors are projected to code/name/calculated name (+ note) and deduplicated
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::FilterEngine;
//! use fee_data::GradeVocabulary;
//!
//! let engine = FilterEngine::new(Arc::new(GradeVocabulary::default()));
//! let result = engine.evaluate(&dataset, &spec);
//! fee_data::write_result(&result, &columns, Path::new("result.tsv"))?;
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod engine;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::{FilterPipeline, FilterStep};
pub use engine::{FilterEngine, project, standard_pipeline};
