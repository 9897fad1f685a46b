// 🧺 Grouping Engine - Partition systems into named buckets
//
// Two layouts:
// - system_type: every system in exactly one bucket (raw label is the key)
// - data_use:    one bucket per distinct data use, so a system can appear
//                in several buckets; no declarations → "(no data use)"

use crate::model::System;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Bucket for systems that declare no data use at all
pub const NO_DATA_USE: &str = "(no data use)";

// ============================================================================
// LAYOUT MODE
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    SystemType,
    DataUse,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::SystemType => "system_type",
            LayoutMode::DataUse => "data_use",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            LayoutMode::SystemType => "System Type",
            LayoutMode::DataUse => "Data Use",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            LayoutMode::SystemType => LayoutMode::DataUse,
            LayoutMode::DataUse => LayoutMode::SystemType,
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system_type" => Ok(LayoutMode::SystemType),
            "data_use" => Ok(LayoutMode::DataUse),
            other => Err(format!(
                "Unknown layout mode '{}' (expected system_type or data_use)",
                other
            )),
        }
    }
}

// ============================================================================
// GROUPS
// ============================================================================

/// Buckets in the order their keys were first encountered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemGroups {
    entries: Vec<(String, Vec<System>)>,
}

impl SystemGroups {
    pub fn get(&self, key: &str) -> Option<&[System]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, systems)| systems.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[System])> {
        self.entries
            .iter()
            .map(|(k, systems)| (k.as_str(), systems.as_slice()))
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of bucket sizes (counts fan-out placements more than once)
    pub fn placement_count(&self) -> usize {
        self.entries.iter().map(|(_, systems)| systems.len()).sum()
    }
}

/// Accumulates buckets while remembering first-seen key order
struct GroupBuilder {
    positions: HashMap<String, usize>,
    entries: Vec<(String, Vec<System>)>,
}

impl GroupBuilder {
    fn new() -> Self {
        GroupBuilder {
            positions: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn push(&mut self, key: &str, system: &System) {
        let index = match self.positions.get(key) {
            Some(&index) => index,
            None => {
                self.entries.push((key.to_string(), Vec::new()));
                self.positions.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[index].1.push(system.clone());
    }

    fn finish(self) -> SystemGroups {
        SystemGroups {
            entries: self.entries,
        }
    }
}

// ============================================================================
// GROUPING
// ============================================================================

pub fn group_systems(systems: &[System], mode: LayoutMode) -> SystemGroups {
    let mut builder = GroupBuilder::new();

    match mode {
        LayoutMode::SystemType => {
            for system in systems {
                builder.push(&system.system_type, system);
            }
        }
        LayoutMode::DataUse => {
            for system in systems {
                let mut uses: Vec<&str> = Vec::new();
                for data_use in system.data_uses() {
                    if !uses.contains(&data_use) {
                        uses.push(data_use);
                    }
                }

                if uses.is_empty() {
                    builder.push(NO_DATA_USE, system);
                } else {
                    for data_use in uses {
                        builder.push(data_use, system);
                    }
                }
            }
        }
    }

    let groups = builder.finish();
    log::debug!(
        "Grouped {} systems by {} into {} buckets",
        systems.len(),
        mode,
        groups.len()
    );
    groups
}

/// Display order for bucket keys
///
/// system_type: keys listed in `preferred_types` first, in that order, then
/// the rest alphabetically. data_use: alphabetical.
pub fn ordered_group_keys(
    groups: &SystemGroups,
    mode: LayoutMode,
    preferred_types: &[String],
) -> Vec<String> {
    let mut keys: Vec<String> = groups.keys().map(str::to_string).collect();

    match mode {
        LayoutMode::SystemType => {
            let rank = |key: &str| {
                preferred_types
                    .iter()
                    .position(|t| t == key)
                    .unwrap_or(preferred_types.len())
            };
            keys.sort_by(|a, b| rank(a).cmp(&rank(b)).then_with(|| a.cmp(b)));
        }
        LayoutMode::DataUse => keys.sort(),
    }

    keys
}

// ============================================================================
// TESTS
// ============================================================================
