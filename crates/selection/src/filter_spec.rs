//! Helper functions to build a FilterSpec from raw selections
//!
//! Resolves what the user picked (or left untouched) into the immutable
//! criteria the pipeline reads, applying the same defaults the selection
//! screen starts with.

use crate::types::{FilterSpec, Selections, TierSelection, default_strict_when_empty};
use anyhow::{Result, bail};
use fee_data::{FeeDataset, GradeVocabulary, Tier};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Tier A token preselected when the user has not chosen anything
pub const DEFAULT_TIER_A: &str = "공통";

/// Department preselected when the dataset contains it
pub const DEFAULT_DEPARTMENT: &str = "공통";

/// Build a FilterSpec for `dataset` from the user's selections
///
/// Defaults for untouched controls:
/// - Tier A: `공통`
/// - Tier B / C: the whole tier vocabulary
/// - Departments: `공통` when the dataset has it, otherwise none
/// - Exclude tags, test rooms: none; cancer/transplant: not excluded
///
/// Tier tokens must come from their tier's vocabulary. Other values that
/// the dataset never contains are kept but logged.
pub fn build_filter_spec(
    dataset: &FeeDataset,
    vocabulary: &GradeVocabulary,
    selections: &Selections,
) -> Result<FilterSpec> {
    let tier_a = resolve_tier(vocabulary, selections, Tier::A)?;
    let tier_b = resolve_tier(vocabulary, selections, Tier::B)?;
    let tier_c = resolve_tier(vocabulary, selections, Tier::C)?;

    let excluded_tags = match &selections.exclude_tags {
        Some(tags) => checked_values("exclude tag", tags, &dataset.exclude_values()),
        None => BTreeSet::new(),
    };

    let allowed_departments = match &selections.departments {
        Some(departments) => checked_values("department", departments, &dataset.departments()),
        None if dataset.has_department(DEFAULT_DEPARTMENT) => {
            BTreeSet::from([DEFAULT_DEPARTMENT.to_string()])
        }
        None => BTreeSet::new(),
    };

    let excluded_testrooms = match &selections.exclude_testrooms {
        Some(rooms) => checked_values("test room", rooms, &dataset.testroom_values()),
        None => BTreeSet::new(),
    };

    let spec = FilterSpec {
        tier_a,
        tier_b,
        tier_c,
        excluded_tags,
        allowed_departments,
        exclude_cancer: selections.exclude_cancer.unwrap_or(false),
        exclude_transplant: selections.exclude_transplant.unwrap_or(false),
        excluded_testrooms,
    };
    debug!("Resolved filter spec: {:?}", spec);
    Ok(spec)
}

fn resolve_tier(vocabulary: &GradeVocabulary, selections: &Selections, tier: Tier) -> Result<TierSelection> {
    let strict = selections
        .strict(tier)
        .unwrap_or_else(|| default_strict_when_empty(tier));

    let allowed: Vec<String> = match selections.tier(tier) {
        Some(tokens) => {
            let mut allowed = Vec::with_capacity(tokens.len());
            for token in tokens.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
                if !vocabulary.contains(tier, token) {
                    bail!("'{}' is not a tier {} grade", token, tier);
                }
                allowed.push(token.to_string());
            }
            allowed
        }
        None => match tier {
            Tier::A => vec![DEFAULT_TIER_A.to_string()],
            Tier::B | Tier::C => vocabulary.tokens(tier).to_vec(),
        },
    };

    Ok(TierSelection::new(allowed, strict))
}

/// Collect trimmed, non-blank values, warning about ones the dataset lacks
fn checked_values(kind: &str, values: &[String], known: &[String]) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if !known.iter().any(|k| k == value) {
            warn!("Selected {} '{}' does not occur in the dataset", kind, value);
        }
        set.insert(value.to_string());
    }
    set
}
