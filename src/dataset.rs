// 📦 Dataset - Raw records → validated, deduplicated working set
//
// Loaded once per session. Everything downstream reads `systems` only.

use crate::aggregation::{unique_data_categories_list, unique_data_uses};
use crate::deduplication::dedupe_with_report;
use crate::model::{load_systems, sample_systems, System};
use crate::schema::{validate_systems, Severity, ValidationIssue};
use anyhow::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Dataset {
    /// Deduplicated systems in source order
    pub systems: Vec<System>,

    /// Problems found in the raw records (before deduplication)
    pub issues: Vec<ValidationIssue>,

    /// Number of raw records read
    pub raw_count: usize,

    /// Keys of dropped duplicate records
    pub dropped_keys: Vec<String>,
}

impl Dataset {
    pub fn from_raw(raw: Vec<System>) -> Self {
        let raw_count = raw.len();
        let issues = validate_systems(&raw);

        for issue in &issues {
            match issue.severity {
                Severity::Critical | Severity::Warning => log::warn!("{}", issue),
                Severity::Info => log::debug!("{}", issue),
            }
        }

        let report = dedupe_with_report(raw);
        log::info!("{}", report.summary());

        Dataset {
            systems: report.systems,
            issues,
            raw_count,
            dropped_keys: report.dropped_keys,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_raw(load_systems(path)?))
    }

    pub fn sample() -> Result<Self> {
        Ok(Self::from_raw(sample_systems()?))
    }

    /// `load` when a path is given, bundled sample otherwise
    pub fn load_or_sample(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::sample(),
        }
    }

    /// Options for the data use dropdown
    pub fn data_uses(&self) -> Vec<String> {
        unique_data_uses(&self.systems)
    }

    /// Options for the data category dropdown
    pub fn data_categories(&self) -> Vec<String> {
        unique_data_categories_list(&self.systems)
    }

    pub fn find(&self, fides_key: &str) -> Option<&System> {
        self.systems.iter().find(|s| s.fides_key == fides_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_systems;

    #[test]
    fn test_from_raw_dedupes_and_records_issues() {
        let raw = parse_systems(
            r#"[
                {"fides_key": "a", "name": "First"},
                {"fides_key": "b", "system_dependencies": ["zzz"]},
                {"fides_key": "a", "name": "Second"}
            ]"#,
        )
        .unwrap();

        let dataset = Dataset::from_raw(raw);

        assert_eq!(dataset.raw_count, 3);
        assert_eq!(dataset.systems.len(), 2);
        assert_eq!(dataset.dropped_keys, vec!["a"]);
        assert_eq!(dataset.find("a").unwrap().name, "First");
        assert_eq!(dataset.issues.len(), 2);
    }

    #[test]
    fn test_sample_is_deduplicated() {
        let dataset = Dataset::sample().unwrap();

        assert!(dataset.raw_count > dataset.systems.len());
        assert!(!dataset.data_uses().is_empty());
        assert!(!dataset.data_categories().is_empty());
    }

    #[test]
    fn test_load_or_sample_without_path() {
        let dataset = Dataset::load_or_sample(None).unwrap();
        assert!(!dataset.systems.is_empty());
    }
}
