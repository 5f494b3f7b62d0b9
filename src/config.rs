//! Dashboard Configuration Module
//! Column names, data path and display settings, optionally read from `nutridash.json`.

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "nutridash.json";

/// CSV file loaded when no config overrides it.
pub const DEFAULT_DATA_PATH: &str = "nutridiab_filtré.csv";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0:#}")]
    Read(anyhow::Error),
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings for the dashboard. Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub brand_column: String,
    pub grade_column: String,
    pub name_column: String,
    pub sugar_column: String,
    /// Brand dropdown entry meaning "no filter".
    pub all_label: String,
    pub preview_rows: usize,
    pub kde_points: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            brand_column: "brands".to_string(),
            grade_column: "nutriscore_grade".to_string(),
            name_column: "product_name".to_string(),
            sugar_column: "sugars_100g".to_string(),
            all_label: "All".to_string(),
            preview_rows: 5,
            kde_points: 200,
        }
    }
}

impl DashboardConfig {
    /// Read the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))
            .map_err(ConfigError::Read)?;

        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Read the config, falling back to the defaults when it is malformed.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("{e}; using default settings");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"brand_column": "marque", "preview_rows": 10}}"#).unwrap();

        let config = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(config.brand_column, "marque");
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.sugar_column, "sugars_100g");
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
    }

    #[test]
    fn malformed_file_is_an_error_but_fallback_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(
            DashboardConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
        assert_eq!(
            DashboardConfig::load_or_default(file.path()),
            DashboardConfig::default()
        );
    }
}
