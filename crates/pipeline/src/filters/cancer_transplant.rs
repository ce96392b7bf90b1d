//! Filter to drop cancer-care and transplant items on request.

use crate::traits::Filter;
use fee_data::FeeRecord;
use selection::FilterSpec;

/// Removes records flagged `O` for cancer care or transplant when the
/// matching exclusion switch is on. A missing flag never drops a record.
pub struct CancerTransplantFilter;

impl Filter for CancerTransplantFilter {
    fn name(&self) -> &str {
        "CancerTransplantFilter"
    }

    fn keep(&self, record: &FeeRecord, spec: &FilterSpec) -> bool {
        if spec.exclude_cancer && record.is_cancer() {
            return false;
        }
        if spec.exclude_transplant && record.is_transplant() {
            return false;
        }
        true
    }
}
