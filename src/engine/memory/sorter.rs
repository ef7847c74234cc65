//! Record sorting for the memory engine
//!
//! Stable multi-key sort. Absent values order before present ones; values
//! that cannot be compared are treated as equal.

use std::cmp::Ordering;

use crate::engine::spec::{RawRecord, SortDirection, SortSpec};
use crate::schema::StorableValue;

/// Sorts records by every key in turn, the first key being primary.
pub fn sort(records: &mut [RawRecord], keys: &[SortSpec]) {
    if keys.is_empty() {
        return;
    }
    records.sort_by(|a, b| {
        for key in keys {
            let a_val = a.attribute(&key.attribute).and_then(|v| v.as_value());
            let b_val = b.attribute(&key.attribute).and_then(|v| v.as_value());
            let ordering = match key.direction {
                SortDirection::Ascending => compare_values(a_val, b_val),
                SortDirection::Descending => compare_values(a_val, b_val).reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn compare_values(a: Option<&StorableValue>, b: Option<&StorableValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}
