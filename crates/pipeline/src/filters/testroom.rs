//! Filter to drop records performed in excluded test rooms.

use crate::traits::Filter;
use fee_data::FeeRecord;
use selection::FilterSpec;

/// Removes records where any test-room slot is in `spec.excluded_testrooms`.
pub struct TestroomFilter;

impl Filter for TestroomFilter {
    fn name(&self) -> &str {
        "TestroomFilter"
    }

    fn keep(&self, record: &FeeRecord, spec: &FilterSpec) -> bool {
        if spec.excluded_testrooms.is_empty() {
            return true;
        }
        !record
            .testroom_values()
            .any(|room| spec.excluded_testrooms.contains(room))
    }
}
