//! Detail tag helpers.

use std::collections::HashSet;
use std::hash::Hash;

use crate::TagId;

/// Parse the comma-separated `tag_ids` column of a personality result.
///
/// Blank and non-numeric entries are skipped.
#[must_use]
pub fn parse_tag_ids(raw: &str) -> Vec<TagId> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .map(TagId::new)
        .collect()
}

/// Remove duplicates, keeping the first occurrence of each value in order.
pub fn dedup_preserving_order<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
