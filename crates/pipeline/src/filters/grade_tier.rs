//! Filters on facility grade tiers.
//!
//! A record's grade tags are intersected with one tier's vocabulary. Tags
//! outside the tier (including unclassified ones) are ignored, so a record
//! with no tag of the tier always passes.

use crate::traits::Filter;
use fee_data::{FeeRecord, GradeVocabulary, Tier};
use selection::FilterSpec;
use std::sync::Arc;

/// How the present tier tags are checked against the allowed set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierMatch {
    /// At least one present tag must be allowed (tier A)
    Any,
    /// Every present tag must be allowed (tiers B and C)
    All,
}

/// Keeps records whose tags in one tier satisfy the tier's selection.
///
/// ## Algorithm
/// 1. Collect the record's tags that belong to the tier
/// 2. None present: keep
/// 3. Allowed set empty: drop if the tier is strict-when-empty, else keep
/// 4. Otherwise keep iff any (tier A) / all (tiers B, C) present tags are allowed
pub struct GradeTierFilter {
    vocabulary: Arc<GradeVocabulary>,
    tier: Tier,
    matching: TierMatch,
    name: &'static str,
}

impl GradeTierFilter {
    /// Create a filter for `tier` with an explicit matching rule
    pub fn new(vocabulary: Arc<GradeVocabulary>, tier: Tier, matching: TierMatch) -> Self {
        let name = match tier {
            Tier::A => "TierAFilter",
            Tier::B => "TierBFilter",
            Tier::C => "TierCFilter",
        };
        Self {
            vocabulary,
            tier,
            matching,
            name,
        }
    }

    /// Tier A: any present tag allowed
    pub fn tier_a(vocabulary: Arc<GradeVocabulary>) -> Self {
        Self::new(vocabulary, Tier::A, TierMatch::Any)
    }

    /// Tier B: all present tags allowed
    pub fn tier_b(vocabulary: Arc<GradeVocabulary>) -> Self {
        Self::new(vocabulary, Tier::B, TierMatch::All)
    }

    /// Tier C: all present tags allowed
    pub fn tier_c(vocabulary: Arc<GradeVocabulary>) -> Self {
        Self::new(vocabulary, Tier::C, TierMatch::All)
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }
}

impl Filter for GradeTierFilter {
    fn name(&self) -> &str {
        self.name
    }

    fn keep(&self, record: &FeeRecord, spec: &FilterSpec) -> bool {
        let selection = spec.tier(self.tier);
        let mut present = self
            .vocabulary
            .tags_in(&record.grade_tags, self.tier)
            .peekable();

        if present.peek().is_none() {
            return true;
        }
        if selection.allowed.is_empty() {
            return !selection.strict_when_empty;
        }
        match self.matching {
            TierMatch::Any => present.any(|tag| selection.permits(tag)),
            TierMatch::All => present.all(|tag| selection.permits(tag)),
        }
    }
}
