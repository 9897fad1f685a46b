// 🏷️ Category Normalizer - Dotted category paths reduced to their leaf label
//
// "user.derived.identifiable.location" → "location"
//
// Only the leaf is shown and compared. Two different parents with the same
// leaf ("user.location" vs "system.location") collapse into one label.

use crate::model::System;
use std::collections::BTreeSet;

/// Leaf segment of a dot-delimited category path
///
/// Total over all strings: no dot returns the input, empty returns empty,
/// a trailing dot returns the empty leaf.
pub fn extract_short_category(full_path: &str) -> &str {
    match full_path.rfind('.') {
        Some(pos) => &full_path[pos + 1..],
        None => full_path,
    }
}

/// Normalized categories of one system as a set (used for intersection tests)
pub fn category_set(system: &System) -> BTreeSet<&str> {
    system.category_paths().map(extract_short_category).collect()
}

/// Unique short categories across every declaration of a system, sorted
pub fn unique_data_categories(system: &System) -> Vec<String> {
    category_set(system)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// True when two systems share at least one short category
pub fn shares_category(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> bool {
    // iterate the smaller side
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().any(|c| large.contains(c))
}

// ============================================================================
// TESTS
// ============================================================================
