// 📐 Shape Checks - Report questionable records without rejecting them
//
// The core accepts anything that deserializes. These checks only surface
// problems to whoever loaded the data.

use crate::model::System;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// ============================================================================
// SEVERITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Critical, // record cannot be addressed (no key)
    Warning,  // record is usable but will behave surprisingly
    Info,     // informational only
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }
}

// ============================================================================
// VALIDATION ISSUE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub fides_key: String,
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(severity: Severity, fides_key: &str, field: &str, message: String) -> Self {
        ValidationIssue {
            severity,
            fides_key: fides_key.to_string(),
            field: field.to_string(),
            message,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity.as_str(),
            self.fides_key,
            self.field,
            self.message
        )
    }
}

// ============================================================================
// CHECKS
// ============================================================================

/// Check a raw (not yet deduplicated) collection
pub fn validate_systems(systems: &[System]) -> Vec<ValidationIssue> {
    let known_keys: HashSet<&str> = systems.iter().map(|s| s.fides_key.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut issues = Vec::new();

    for (position, system) in systems.iter().enumerate() {
        let key = system.fides_key.as_str();

        if key.trim().is_empty() {
            issues.push(ValidationIssue::new(
                Severity::Critical,
                key,
                "fides_key",
                format!("record #{} has an empty fides_key", position),
            ));
        }

        if !seen.insert(key) {
            issues.push(ValidationIssue::new(
                Severity::Warning,
                key,
                "fides_key",
                format!("duplicate record #{} will be dropped", position),
            ));
        }

        for (d, declaration) in system.privacy_declarations.iter().enumerate() {
            if declaration.data_use.trim().is_empty() {
                issues.push(ValidationIssue::new(
                    Severity::Warning,
                    key,
                    "data_use",
                    format!("declaration #{} has an empty data_use", d),
                ));
            }

            for path in &declaration.data_categories {
                if let Some(problem) = check_category_path(path) {
                    issues.push(ValidationIssue::new(
                        Severity::Warning,
                        key,
                        "data_categories",
                        format!("declaration #{}: {}", d, problem),
                    ));
                }
            }
        }

        for dependency in &system.system_dependencies {
            if !known_keys.contains(dependency.as_str()) {
                issues.push(ValidationIssue::new(
                    Severity::Info,
                    key,
                    "system_dependencies",
                    format!("depends on unknown system '{}'", dependency),
                ));
            }
        }
    }

    issues
}

fn check_category_path(path: &str) -> Option<String> {
    if path.is_empty() {
        return Some("empty category path".to_string());
    }
    if path.split('.').any(str::is_empty) {
        return Some(format!("category path '{}' has an empty segment", path));
    }
    None
}

pub fn has_critical(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Critical)
}

// ============================================================================
// TESTS
// ============================================================================
