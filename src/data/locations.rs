use std::collections::BTreeSet;

use super::model::RecordSet;

/// Distinct location identifiers in ascending ordinal order.
///
/// Deduplicates by exact string equality. Pure: the same record set always
/// yields the same list.
pub fn location_index(set: &RecordSet) -> Vec<String> {
    set.records()
        .iter()
        .map(|r| r.location.as_str())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
