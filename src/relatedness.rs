// 🕸️ Relatedness Graph - Which systems share a data category with the focused one
//
// Relatedness is symmetric: two systems are related when their short
// category sets intersect. The focused key is always part of its own
// related set, even when it is not in the collection.
//
// The scanning functions are O(S·C) per call (S systems, C categories per
// system). CategoryIndex trades one build pass for set-union lookups.

use crate::category::{category_set, shares_category};
use crate::model::System;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

// ============================================================================
// CONNECTION
// ============================================================================

/// One connector line between the focused system and a related one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
}

impl Connection {
    /// Direction-independent identity of the pair
    pub fn pair_key(&self) -> (String, String) {
        unordered_pair(&self.from, &self.to)
    }
}

fn unordered_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

// ============================================================================
// SCANNING BUILDER
// ============================================================================

/// Connections from the focused system to every other system sharing a category
///
/// Unknown focus yields no connections. Each unordered pair is emitted once.
pub fn connections_for_focused(systems: &[System], focused_key: &str) -> Vec<Connection> {
    let mut by_key: HashMap<&str, &System> = HashMap::with_capacity(systems.len());
    for system in systems {
        by_key.entry(system.fides_key.as_str()).or_insert(system);
    }

    let focused = match by_key.get(focused_key) {
        Some(system) => *system,
        None => return Vec::new(),
    };

    let focused_categories = category_set(focused);
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut connections = Vec::new();

    for system in systems {
        if system.fides_key == focused_key {
            continue;
        }

        if !shares_category(&focused_categories, &category_set(system)) {
            continue;
        }

        let connection = Connection {
            from: focused_key.to_string(),
            to: system.fides_key.clone(),
        };
        if seen.insert(connection.pair_key()) {
            connections.push(connection);
        }
    }

    connections
}

/// The focused key plus every key it connects to
pub fn related_keys(systems: &[System], focused_key: &str) -> BTreeSet<String> {
    let mut related = BTreeSet::new();
    related.insert(focused_key.to_string());

    for connection in connections_for_focused(systems, focused_key) {
        related.insert(connection.from);
        related.insert(connection.to);
    }

    related
}

// ============================================================================
// CATEGORY INDEX
// ============================================================================

/// Inverted index built once per dataset: category → keys, key → categories
///
/// Answers the same questions as the scanning functions without re-reading
/// every system on each focus change. Must be rebuilt when the collection
/// (e.g. the filtered set) changes.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    /// Keys in collection order (first occurrence)
    order: Vec<String>,
    categories_by_key: HashMap<String, BTreeSet<String>>,
    keys_by_category: BTreeMap<String, BTreeSet<String>>,
}

impl CategoryIndex {
    pub fn build(systems: &[System]) -> Self {
        let mut index = CategoryIndex::default();

        for system in systems {
            if index.categories_by_key.contains_key(&system.fides_key) {
                continue;
            }

            let categories: BTreeSet<String> = category_set(system)
                .into_iter()
                .map(str::to_string)
                .collect();

            for category in &categories {
                index
                    .keys_by_category
                    .entry(category.clone())
                    .or_default()
                    .insert(system.fides_key.clone());
            }

            index.order.push(system.fides_key.clone());
            index
                .categories_by_key
                .insert(system.fides_key.clone(), categories);
        }

        log::debug!(
            "Built category index: {} systems, {} categories",
            index.order.len(),
            index.keys_by_category.len()
        );
        index
    }

    pub fn system_count(&self) -> usize {
        self.order.len()
    }

    pub fn category_count(&self) -> usize {
        self.keys_by_category.len()
    }

    /// Keys of systems declaring the short category
    pub fn systems_with_category(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.keys_by_category.get(category)
    }

    pub fn related_keys(&self, focused_key: &str) -> BTreeSet<String> {
        let mut related = BTreeSet::new();
        related.insert(focused_key.to_string());

        if let Some(categories) = self.categories_by_key.get(focused_key) {
            for category in categories {
                if let Some(keys) = self.keys_by_category.get(category) {
                    related.extend(keys.iter().cloned());
                }
            }
        }

        related
    }

    /// Connections in collection order, matching [`connections_for_focused`]
    pub fn connections_for(&self, focused_key: &str) -> Vec<Connection> {
        if !self.categories_by_key.contains_key(focused_key) {
            return Vec::new();
        }

        let related = self.related_keys(focused_key);
        self.order
            .iter()
            .filter(|key| key.as_str() != focused_key && related.contains(key.as_str()))
            .map(|key| Connection {
                from: focused_key.to_string(),
                to: key.clone(),
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
