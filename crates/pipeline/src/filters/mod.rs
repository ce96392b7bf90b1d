//! Filter implementations for the fee pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod grade_tier;
pub mod exclude_tag;
pub mod department;
pub mod cancer_transplant;
pub mod testroom;

// Re-export for convenience
pub use grade_tier::{GradeTierFilter, TierMatch};
pub use exclude_tag::ExcludeTagFilter;
pub use department::DepartmentFilter;
pub use cancer_transplant::CancerTransplantFilter;
pub use testroom::TestroomFilter;
