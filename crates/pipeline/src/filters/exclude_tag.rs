//! Filter to drop records carrying a selected exclude tag.

use crate::traits::Filter;
use fee_data::FeeRecord;
use selection::FilterSpec;

/// Removes records whose exclude tag is in `spec.excluded_tags`.
///
/// Records without an exclude tag always pass.
pub struct ExcludeTagFilter;

impl Filter for ExcludeTagFilter {
    fn name(&self) -> &str {
        "ExcludeTagFilter"
    }

    fn keep(&self, record: &FeeRecord, spec: &FilterSpec) -> bool {
        match &record.exclude_tag {
            Some(tag) => !spec.excluded_tags.contains(tag),
            None => true,
        }
    }
}
