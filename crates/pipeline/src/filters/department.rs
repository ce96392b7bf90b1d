//! Filter to keep records from the selected departments.

use crate::traits::Filter;
use fee_data::FeeRecord;
use selection::FilterSpec;

/// Keeps records where any department slot matches a selected department.
///
/// ## Algorithm
/// 1. No departments selected: keep everything
/// 2. Record has no department slots (source had no department columns): keep
/// 3. Otherwise keep iff a non-blank slot equals a selected department
pub struct DepartmentFilter;

impl Filter for DepartmentFilter {
    fn name(&self) -> &str {
        "DepartmentFilter"
    }

    fn keep(&self, record: &FeeRecord, spec: &FilterSpec) -> bool {
        if spec.allowed_departments.is_empty() || record.departments.is_empty() {
            return true;
        }
        record
            .department_values()
            .any(|dept| spec.allowed_departments.contains(dept))
    }
}
