// ⚙️ View Configuration - Presentation preferences loaded from JSON
//
// Example file:
// {
//   "system_type_order": ["Application", "Service", "Database", "Integration"],
//   "layout_mode": "data_use"
// }

use crate::grouping::LayoutMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Group headers shown first in system_type layout, in this order
    pub system_type_order: Vec<String>,

    /// Layout used when the viewer starts
    pub layout_mode: LayoutMode,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            system_type_order: vec![
                "Application".to_string(),
                "Service".to_string(),
                "Database".to_string(),
                "Integration".to_string(),
            ],
            layout_mode: LayoutMode::SystemType,
        }
    }
}

impl ViewConfig {
    /// Load from a JSON file; fields missing from the file keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: ViewConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        log::debug!("Loaded view config from {}", path.display());
        Ok(config)
    }

    /// `load` when a path is given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ViewConfig::default();
        assert_eq!(config.system_type_order.len(), 4);
        assert_eq!(config.layout_mode, LayoutMode::SystemType);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"layout_mode": "data_use"}}"#).unwrap();

        let config = ViewConfig::load(file.path()).unwrap();
        assert_eq!(config.layout_mode, LayoutMode::DataUse);
        assert_eq!(config.system_type_order, ViewConfig::default().system_type_order);
    }

    #[test]
    fn test_custom_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"system_type_order": ["Database"]}}"#).unwrap();

        let config = ViewConfig::load(file.path()).unwrap();
        assert_eq!(config.system_type_order, vec!["Database".to_string()]);
    }

    #[test]
    fn test_invalid_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"layout_mode": "diagonal"}}"#).unwrap();

        assert!(ViewConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(ViewConfig::load_or_default(None).unwrap(), ViewConfig::default());
    }
}
