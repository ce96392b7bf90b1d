//! # Selection Crate
//!
//! This crate turns user choices into the criteria the filtering pipeline
//! evaluates.
//!
//! ## Components
//!
//! ### Selections
//! Raw, optional user input: which tier grades, departments, exclude tags
//! and test rooms were picked, plus the cancer/transplant switches. Usually
//! read from a JSON file written by the selection screen.
//!
//! ### FilterSpec
//! The resolved, immutable criteria for one evaluation pass. Every set is
//! concrete, every empty-selection policy is explicit.
//!
//! ## Example Usage
//!
//! ```ignore
//! use selection::{build_filter_spec, Selections};
//! use fee_data::{FeeDataset, GradeVocabulary};
//!
//! let selections = Selections::from_json_file(Path::new("selections.json"))?;
//! let spec = build_filter_spec(&dataset, &GradeVocabulary::default(), &selections)?;
//! ```

// Public modules
pub mod types;
pub mod filter_spec;

// Re-export commonly used types
pub use filter_spec::build_filter_spec;
pub use types::{FilterSpec, Selections, TierSelection, default_strict_when_empty};
