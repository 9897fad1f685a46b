// 🔍 Deduplication Engine - Drop repeated systems by fides_key
// First occurrence wins, order of first occurrences is preserved

use crate::model::System;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// DEDUPLICATION REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeduplicationReport {
    /// Systems kept, in input order
    pub systems: Vec<System>,

    /// Keys of discarded records, one entry per discarded record
    pub dropped_keys: Vec<String>,
}

impl DeduplicationReport {
    pub fn dropped_count(&self) -> usize {
        self.dropped_keys.len()
    }

    pub fn summary(&self) -> String {
        format!(
            "Kept {} systems, dropped {} duplicates",
            self.systems.len(),
            self.dropped_keys.len()
        )
    }
}

// ============================================================================
// DEDUPLICATION
// ============================================================================

/// Remove later records that repeat an earlier `fides_key`
pub fn dedupe_by_key(raw: Vec<System>) -> Vec<System> {
    dedupe_with_report(raw).systems
}

/// Same as [`dedupe_by_key`] but also reports what was dropped
pub fn dedupe_with_report(raw: Vec<System>) -> DeduplicationReport {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut systems = Vec::with_capacity(raw.len());
    let mut dropped_keys = Vec::new();

    for system in raw {
        if seen.contains(&system.fides_key) {
            dropped_keys.push(system.fides_key);
            continue;
        }
        seen.insert(system.fides_key.clone());
        systems.push(system);
    }

    DeduplicationReport {
        systems,
        dropped_keys,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn create_test_system(key: &str, name: &str) -> System {
        System {
            fides_key: key.to_string(),
            name: name.to_string(),
            description: String::new(),
            system_type: "Service".to_string(),
            system_dependencies: vec![],
            privacy_declarations: vec![],
        }
    }

    #[test]
    fn test_first_occurrence_wins() {
        let raw = vec![
            create_test_system("a", "First A"),
            create_test_system("b", "B"),
            create_test_system("a", "Second A"),
        ];

        let deduped = dedupe_by_key(raw);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].fides_key, "a");
        assert_eq!(deduped[0].name, "First A");
        assert_eq!(deduped[1].fides_key, "b");
    }

    #[test]
    fn test_order_preserved() {
        let raw = vec![
            create_test_system("c", "C"),
            create_test_system("a", "A"),
            create_test_system("c", "C again"),
            create_test_system("b", "B"),
        ];

        let keys: Vec<String> = dedupe_by_key(raw)
            .into_iter()
            .map(|s| s.fides_key)
            .collect();

        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe_by_key(vec![]).is_empty());
    }

    #[test]
    fn test_report_lists_dropped_keys() {
        let raw = vec![
            create_test_system("a", "A"),
            create_test_system("a", "A2"),
            create_test_system("a", "A3"),
            create_test_system("b", "B"),
        ];

        let report = dedupe_with_report(raw);

        assert_eq!(report.systems.len(), 2);
        assert_eq!(report.dropped_keys, vec!["a", "a"]);
        assert_eq!(report.dropped_count(), 2);
        assert_eq!(report.summary(), "Kept 2 systems, dropped 2 duplicates");
    }

    proptest! {
        #[test]
        fn proptest_no_duplicate_keys_and_first_wins(
            keys in proptest::collection::vec("[a-e]", 0..30)
        ) {
            let raw: Vec<System> = keys
                .iter()
                .enumerate()
                .map(|(i, k)| create_test_system(k, &i.to_string()))
                .collect();

            let deduped = dedupe_by_key(raw.clone());

            let unique: HashSet<&str> = deduped.iter().map(|s| s.fides_key.as_str()).collect();
            prop_assert_eq!(unique.len(), deduped.len());

            for kept in &deduped {
                let first = raw.iter().find(|s| s.fides_key == kept.fides_key).unwrap();
                prop_assert_eq!(&first.name, &kept.name);
            }
        }
    }
}
