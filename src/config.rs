//! Catalog configuration
//!
//! Where the period files live, which extension they carry, and the knobs the
//! summarization engine reads (date-like name hints, histogram bin count).

use crate::catalog::DatasetCatalog;
use crate::error::{Result, ResultExt as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides `data_root` when set.
pub const DATA_ROOT_ENV: &str = "DOUANE_DATA_ROOT";
/// Overrides `extension` when set.
pub const EXTENSION_ENV: &str = "DOUANE_EXTENSION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Root of the `<category>/<year>/<MM>.<ext>` tree
    pub data_root: PathBuf,
    /// Period file extension, without the dot
    pub extension: String,
    /// Lowercase substrings that mark a column name as date-like
    pub date_hints: Vec<String>,
    /// Number of bins for numeric distributions
    pub histogram_bins: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            extension: "xlsx".to_owned(),
            date_hints: default_date_hints(),
            histogram_bins: 20,
        }
    }
}

pub fn default_date_hints() -> Vec<String> {
    ["date", "mois", "month"]
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

impl CatalogConfig {
    /// Load configuration from a JSON file, falling back to defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self =
            serde_json::from_str(&contents).context("Failed to parse catalog config JSON")?;

        Ok(config)
    }

    /// Save configuration to disk
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize catalog config")?;

        std::fs::write(path, json)
            .with_context(|| format!("Failed to write catalog config to {}", path.display()))?;

        Ok(())
    }

    /// Apply `DOUANE_DATA_ROOT` / `DOUANE_EXTENSION` from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(DATA_ROOT_ENV).ok(),
            std::env::var(EXTENSION_ENV).ok(),
        )
    }

    fn with_overrides(mut self, data_root: Option<String>, extension: Option<String>) -> Self {
        if let Some(root) = data_root.filter(|r| !r.trim().is_empty()) {
            self.data_root = PathBuf::from(root);
        }
        if let Some(ext) = extension.filter(|e| !e.trim().is_empty()) {
            self.extension = ext.trim().trim_start_matches('.').to_owned();
        }
        self
    }

    /// Build the catalog described by this configuration.
    pub fn catalog(&self) -> DatasetCatalog {
        DatasetCatalog::new(&self.data_root).with_extension(&self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = CatalogConfig::load(&dir.path().join("absent.json"))?;
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.histogram_bins, 20);
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("douane.json");

        let config = CatalogConfig {
            data_root: PathBuf::from("/srv/douane"),
            extension: "csv".to_owned(),
            date_hints: vec!["periode".to_owned()],
            histogram_bins: 12,
        };
        config.save(&path)?;

        assert_eq!(CatalogConfig::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_partial_json_fills_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("douane.json");
        std::fs::write(&path, r#"{ "histogram_bins": 8 }"#)?;

        let config = CatalogConfig::load(&path)?;
        assert_eq!(config.histogram_bins, 8);
        assert_eq!(config.extension, "xlsx");
        assert_eq!(config.date_hints, default_date_hints());
        Ok(())
    }

    #[test]
    fn test_invalid_json_is_config_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("douane.json");
        std::fs::write(&path, "{ not json")?;

        let err = CatalogConfig::load(&path).expect_err("should not parse");
        assert!(matches!(err, crate::error::DouaneError::Config(_)));
        Ok(())
    }

    #[test]
    fn test_overrides() {
        let config = CatalogConfig::default()
            .with_overrides(Some("/mnt/exports".to_owned()), Some(".csv".to_owned()));
        assert_eq!(config.data_root, PathBuf::from("/mnt/exports"));
        assert_eq!(config.extension, "csv");

        let untouched = CatalogConfig::default().with_overrides(Some("  ".to_owned()), None);
        assert_eq!(untouched, CatalogConfig::default());
    }
}
