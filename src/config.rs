use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::data::export::DEFAULT_EXPORT_NAME;
use crate::data::timeframe::Timeframe;

/// Env var pointing at a JSON config file.
pub const CONFIG_ENV: &str = "THREAT_LENS_CONFIG";
/// Env var overriding the default dataset path.
pub const DATA_ENV: &str = "THREAT_LENS_DATA";

/// Dashboard settings. Every field has a default, so a config file only needs
/// the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset loaded when nothing was uploaded, relative to the executable's
    /// directory unless absolute.
    pub dataset_file: PathBuf,
    /// Maximum rows shown in the detailed log table.
    pub log_table_limit: usize,
    /// Maximum labelled ticks on the chart's x-axis.
    pub max_x_ticks: usize,
    pub default_timeframe: Timeframe,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_file: PathBuf::from(DEFAULT_EXPORT_NAME),
            log_table_limit: 100,
            max_x_ticks: 20,
            default_timeframe: Timeframe::Hour,
        }
    }
}

impl DashboardConfig {
    /// Load the config named by `$THREAT_LENS_CONFIG`, returning defaults if
    /// unset or unreadable.
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) else {
            log::info!("No {CONFIG_ENV} set, using default config");
            return Self::default();
        };

        match Self::read_file(&path) {
            Ok(config) => {
                log::info!("Loaded config from {path:?}");
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {path:?}: {e:#}");
                Self::default()
            }
        }
    }

    /// Read and parse a JSON config file.
    pub fn read_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text).context("parsing config JSON")
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Where the default dataset lives.
    ///
    /// `$THREAT_LENS_DATA` wins; otherwise `dataset_file` next to the
    /// executable, falling back to the working directory.
    pub fn default_dataset_path(&self) -> PathBuf {
        if let Some(path) = std::env::var_os(DATA_ENV) {
            return PathBuf::from(path);
        }
        if self.dataset_file.is_absolute() {
            return self.dataset_file.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(&self.dataset_file)))
            .filter(|candidate| candidate.exists())
            .unwrap_or_else(|| self.dataset_file.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = DashboardConfig::from_json(r#"{ "log_table_limit": 25, "default_timeframe": "12_hour" }"#)
            .unwrap();
        assert_eq!(config.log_table_limit, 25);
        assert_eq!(config.default_timeframe, Timeframe::TwelveHour);
        assert_eq!(config.max_x_ticks, 20);
        assert_eq!(config.dataset_file, PathBuf::from("final_threat_dataset.csv"));
    }

    #[test]
    fn test_unknown_timeframe_rejected() {
        assert!(DashboardConfig::from_json(r#"{ "default_timeframe": "minute" }"#).is_err());
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("threat-lens.json");
        std::fs::write(&path, r#"{ "max_x_ticks": 8 }"#).unwrap();
        let config = DashboardConfig::read_file(&path).unwrap();
        assert_eq!(config.max_x_ticks, 8);
        assert_eq!(config.log_table_limit, 100);
    }

    #[test]
    fn test_read_file_errors_carry_context() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = DashboardConfig::read_file(&missing).unwrap_err();
        assert!(format!("{err:#}").starts_with("reading "));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        let err = DashboardConfig::read_file(&broken).unwrap_err();
        assert!(format!("{err:#}").starts_with("parsing config JSON: "));
    }

    #[test]
    fn test_absolute_dataset_file() {
        let config = DashboardConfig {
            dataset_file: PathBuf::from("/srv/threats/events.csv"),
            ..DashboardConfig::default()
        };
        if std::env::var_os(DATA_ENV).is_none() {
            assert_eq!(config.default_dataset_path(), PathBuf::from("/srv/threats/events.csv"));
        }
    }
}
