use std::path::{Path, PathBuf};
use std::sync::Arc;

use threat_lens::config::DashboardConfig;
use threat_lens::data::cache::DatasetCache;
use threat_lens::data::export;
use threat_lens::data::indicator::ThreatIndicator;
use threat_lens::data::loader::{DataSource, LoadedDataset};
use threat_lens::data::model::ThreatRecord;
use threat_lens::data::summary::{bucket_summary, flagged_rows, BucketCount};
use threat_lens::data::timeframe::Timeframe;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Memoized load results; cleared by "Reset Cache".
    pub cache: DatasetCache,

    /// Last uploaded source, preferred over the default file.
    pub upload: Option<DataSource>,

    /// Default dataset location.
    pub default_path: PathBuf,

    /// Dataset currently shown (None while a load error is active).
    pub loaded: Option<Arc<LoadedDataset>>,

    /// Display name of the source behind `loaded`.
    pub source_label: Option<String>,

    /// Fatal load error. While set, nothing but the error renders.
    pub load_error: Option<String>,

    /// Selected threat column.
    pub threat: Option<ThreatIndicator>,

    /// Selected bucket granularity.
    pub timeframe: Timeframe,

    /// Non-fatal status line (export results).
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let default_path = config.default_dataset_path();
        let timeframe = config.default_timeframe;
        Self {
            config,
            cache: DatasetCache::new(),
            upload: None,
            default_path,
            loaded: None,
            source_label: None,
            load_error: None,
            threat: None,
            timeframe,
            status_message: None,
        }
    }

    /// Resolve the active source and (re)load it through the cache.
    pub fn refresh(&mut self) {
        let source = if let Some(upload) = &self.upload {
            upload.clone()
        } else if self.default_path.exists() {
            DataSource::Path(self.default_path.clone())
        } else {
            let file_name = self
                .config
                .dataset_file
                .file_name()
                .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
            self.fail(format!(
                "No file found. Upload a CSV or place '{file_name}' in the app directory."
            ));
            return;
        };

        match self.cache.get_or_load(&source) {
            Ok(loaded) => self.set_dataset(loaded, source.display_name()),
            Err(e) => {
                log::error!("Failed to load {}: {e}", source.display_name());
                self.fail(e.to_string());
            }
        }
    }

    fn fail(&mut self, message: String) {
        self.loaded = None;
        self.source_label = None;
        self.load_error = Some(message);
    }

    /// Ingest a dataset, keeping the selected threat when it is still present.
    fn set_dataset(&mut self, loaded: Arc<LoadedDataset>, label: String) {
        let unchanged = self
            .loaded
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &loaded));
        if !unchanged {
            self.threat = self
                .threat
                .filter(|t| loaded.indicators.contains(t))
                .or_else(|| loaded.indicators.first().copied());
        }
        self.loaded = Some(loaded);
        self.source_label = Some(label);
        self.load_error = None;
    }

    /// Make `source` the active upload and load it.
    pub fn set_upload(&mut self, source: DataSource) {
        self.upload = Some(source);
        self.status_message = None;
        self.refresh();
    }

    /// Open a file picked by the user. Text formats are read into memory like
    /// an upload; Parquet stays a path source.
    pub fn open_path(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let is_parquet = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "parquet" | "pq"));

        if is_parquet {
            self.set_upload(DataSource::Path(path.to_path_buf()));
            return;
        }
        match std::fs::read(path) {
            Ok(bytes) => self.set_upload(DataSource::upload(name, bytes)),
            Err(e) => {
                log::error!("Failed to read {}: {e}", path.display());
                self.fail(format!("Error reading file: {e}"));
            }
        }
    }

    /// Drop every memoized dataset and load again from scratch.
    pub fn reset_cache(&mut self) {
        self.cache.clear();
        self.loaded = None;
        self.refresh();
    }

    pub fn summary(&self) -> Vec<BucketCount> {
        match (&self.loaded, self.threat) {
            (Some(loaded), Some(threat)) => bucket_summary(&loaded.dataset, threat, self.timeframe),
            _ => Vec::new(),
        }
    }

    pub fn log_rows(&self) -> Vec<&ThreatRecord> {
        match (&self.loaded, self.threat) {
            (Some(loaded), Some(threat)) => {
                flagged_rows(&loaded.dataset, threat, self.config.log_table_limit)
            }
            _ => Vec::new(),
        }
    }

    /// Write the enriched dataset to `path` and report the outcome.
    pub fn export_to(&mut self, path: &Path) {
        let Some(loaded) = &self.loaded else {
            return;
        };
        self.status_message = Some(match export::write_csv(&loaded.dataset, path) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                format!("Export failed: {e:#}")
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_without_default() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.default_path = PathBuf::from("/nonexistent/final_threat_dataset.csv");
        state
    }

    fn upload(text: &str) -> DataSource {
        DataSource::upload("events.csv", text.as_bytes().to_vec())
    }

    #[test]
    fn test_no_source_is_fatal() {
        let mut state = state_without_default();
        state.refresh();
        assert!(state.loaded.is_none());
        assert_eq!(
            state.load_error.as_deref(),
            Some("No file found. Upload a CSV or place 'final_threat_dataset.csv' in the app directory.")
        );
    }

    #[test]
    fn test_upload_selects_first_threat() {
        let mut state = state_without_default();
        state.set_upload(upload("timestamp,rare_ip,is_spike\n2024-01-01 00:10,1,0\n"));
        assert!(state.load_error.is_none());
        assert_eq!(state.threat, Some(ThreatIndicator::Spike));
        assert_eq!(state.source_label.as_deref(), Some("events.csv"));
        assert_eq!(state.summary().len(), 1);
    }

    #[test]
    fn test_load_error_clears_dataset() {
        let mut state = state_without_default();
        state.set_upload(upload("timestamp,is_spike\n2024-01-01 00:10,1\n"));
        assert!(state.loaded.is_some());

        state.set_upload(upload("timestamp,src\n2024-01-01 00:10,x\n"));
        assert!(state.loaded.is_none());
        assert_eq!(state.load_error.as_deref(), Some("No valid threat columns found."));
        assert!(state.log_rows().is_empty());
    }

    #[test]
    fn test_reset_cache_revalidates() {
        let mut state = state_without_default();
        state.set_upload(upload("timestamp,is_spike\n2024-01-01 00:10,1\n"));
        state.refresh();
        assert_eq!(state.cache.validation_passes(), 1);

        state.reset_cache();
        assert_eq!(state.cache.validation_passes(), 2);
        assert!(state.loaded.is_some());
        assert_eq!(state.threat, Some(ThreatIndicator::Spike));
    }

    #[test]
    fn test_threat_kept_across_reload() {
        let mut state = state_without_default();
        state.set_upload(upload("timestamp,is_intrusion,rare_ip\n2024-01-01 00:10,1,0\n"));
        state.threat = Some(ThreatIndicator::RareIp);
        state.set_upload(upload("timestamp,is_intrusion,rare_ip\n2024-01-02 00:10,0,1\n"));
        assert_eq!(state.threat, Some(ThreatIndicator::RareIp));
    }
}
