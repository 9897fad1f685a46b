// 🗂️ Data Model - Systems and their privacy declarations
// Records are loaded once, held immutable, and only ever read by the core

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Bundled sample inventory (contains one duplicated record on purpose)
const SAMPLE_DATA: &str = include_str!("../data/sample.json");

// ============================================================================
// PRIVACY DECLARATION
// ============================================================================

/// One purpose-of-use statement attached to a system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacyDeclaration {
    /// Dot-delimited category paths (e.g. "user.derived.identifiable.location")
    #[serde(default)]
    pub data_categories: Vec<String>,

    #[serde(default)]
    pub data_subjects: Vec<String>,

    /// Business purpose (e.g. "advertising")
    pub data_use: String,

    #[serde(default)]
    pub name: String,
}

// ============================================================================
// SYSTEM
// ============================================================================

/// An application, service, database or integration in the inventory
///
/// Identity: `fides_key` (stable)
/// `system_type` is an open label, never matched against a fixed list here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    pub fides_key: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub system_type: String,

    /// Keys of other systems this one depends on (informational only)
    #[serde(default)]
    pub system_dependencies: Vec<String>,

    #[serde(default)]
    pub privacy_declarations: Vec<PrivacyDeclaration>,
}

impl System {
    /// Every category path across all declarations, in declaration order
    pub fn category_paths(&self) -> impl Iterator<Item = &str> {
        self.privacy_declarations
            .iter()
            .flat_map(|decl| decl.data_categories.iter().map(String::as_str))
    }

    /// Every data use across all declarations (may repeat)
    pub fn data_uses(&self) -> impl Iterator<Item = &str> {
        self.privacy_declarations
            .iter()
            .map(|decl| decl.data_use.as_str())
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Parse a JSON array of systems. No deduplication happens here.
pub fn parse_systems(json: &str) -> Result<Vec<System>> {
    serde_json::from_str(json).context("Failed to deserialize systems")
}

/// Read a JSON array of systems from disk
pub fn load_systems(path: &Path) -> Result<Vec<System>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset file {}", path.display()))?;

    let systems = parse_systems(&raw)
        .with_context(|| format!("Invalid dataset in {}", path.display()))?;

    log::debug!("Read {} raw systems from {}", systems.len(), path.display());
    Ok(systems)
}

/// The bundled sample inventory, raw (duplicates included)
pub fn sample_systems() -> Result<Vec<System>> {
    parse_systems(SAMPLE_DATA).context("Bundled sample data is invalid")
}

// ============================================================================
// TESTS
// ============================================================================
