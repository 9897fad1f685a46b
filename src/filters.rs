// 🔎 Filter Engine - Data use and data category predicates
//
// An empty selection means "show all", never "show none".
// Within one dimension selections are OR'ed, across dimensions AND'ed.

use crate::category::category_set;
use crate::model::System;
use serde::{Deserialize, Serialize};

// ============================================================================
// PREDICATES
// ============================================================================

/// Keep systems with at least one declaration whose data use is selected
pub fn filter_by_data_use(systems: &[System], selected_uses: &[String]) -> Vec<System> {
    if selected_uses.is_empty() {
        return systems.to_vec();
    }

    systems
        .iter()
        .filter(|system| {
            system
                .data_uses()
                .any(|data_use| selected_uses.iter().any(|u| u == data_use))
        })
        .cloned()
        .collect()
}

/// Keep systems whose short categories include at least one selected category
pub fn filter_by_data_categories(
    systems: &[System],
    selected_categories: &[String],
) -> Vec<System> {
    if selected_categories.is_empty() {
        return systems.to_vec();
    }

    systems
        .iter()
        .filter(|system| {
            let categories = category_set(system);
            selected_categories
                .iter()
                .any(|c| categories.contains(c.as_str()))
        })
        .cloned()
        .collect()
}

/// Data use filter first, then category filter on its result
pub fn apply_filters(
    systems: &[System],
    selected_uses: &[String],
    selected_categories: &[String],
) -> Vec<System> {
    let by_use = filter_by_data_use(systems, selected_uses);
    let result = filter_by_data_categories(&by_use, selected_categories);

    log::debug!(
        "Filtered {} → {} systems (uses: {:?}, categories: {:?})",
        systems.len(),
        result.len(),
        selected_uses,
        selected_categories
    );

    result
}

// ============================================================================
// SELECTION STATE
// ============================================================================

/// What the viewer has ticked in the two multi-select dropdowns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub selected_uses: Vec<String>,
    pub selected_categories: Vec<String>,
}

impl FilterSelection {
    pub fn new(selected_uses: Vec<String>, selected_categories: Vec<String>) -> Self {
        let mut selection = FilterSelection::default();
        for data_use in selected_uses {
            if !selection.selected_uses.contains(&data_use) {
                selection.selected_uses.push(data_use);
            }
        }
        for category in selected_categories {
            if !selection.selected_categories.contains(&category) {
                selection.selected_categories.push(category);
            }
        }
        selection
    }

    /// Add the data use if absent, remove it if present
    pub fn toggle_use(&mut self, data_use: &str) {
        toggle(&mut self.selected_uses, data_use);
    }

    /// Add the category if absent, remove it if present
    pub fn toggle_category(&mut self, category: &str) {
        toggle(&mut self.selected_categories, category);
    }

    pub fn clear(&mut self) {
        self.selected_uses.clear();
        self.selected_categories.clear();
    }

    pub fn has_active_filters(&self) -> bool {
        !self.selected_uses.is_empty() || !self.selected_categories.is_empty()
    }

    pub fn is_use_selected(&self, data_use: &str) -> bool {
        self.selected_uses.iter().any(|u| u == data_use)
    }

    pub fn is_category_selected(&self, category: &str) -> bool {
        self.selected_categories.iter().any(|c| c == category)
    }

    pub fn apply(&self, systems: &[System]) -> Vec<System> {
        apply_filters(systems, &self.selected_uses, &self.selected_categories)
    }
}

fn toggle(selected: &mut Vec<String>, value: &str) {
    if let Some(pos) = selected.iter().position(|s| s == value) {
        selected.remove(pos);
    } else {
        selected.push(value.to_string());
    }
}

// ============================================================================
// TESTS
// ============================================================================
