//! Custom assertion helpers for common test patterns

use crate::models::{DataType, DataVersion};

/// Assert that exactly one version of `data_type` is active
pub fn assert_single_active(versions: &[DataVersion], data_type: DataType) -> DataVersion {
    let active: Vec<&DataVersion> = versions
        .iter()
        .filter(|v| v.is_active && v.data_type() == data_type)
        .collect();
    assert_eq!(
        active.len(),
        1,
        "Expected exactly one active {} version, found {}",
        data_type,
        active.len()
    );
    active[0].clone()
}

/// Assert that no version of `data_type` is active
pub fn assert_no_active(versions: &[DataVersion], data_type: DataType) {
    let count = versions
        .iter()
        .filter(|v| v.is_active && v.data_type() == data_type)
        .count();
    assert_eq!(count, 0, "Expected no active {} version, found {}", data_type, count);
}
