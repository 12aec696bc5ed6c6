use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::PathBuf;
use std::sync::Arc;

use super::loader::{self, DataSource, LoadError, LoadedDataset};

/// Identity of a source for memoization purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    Path(PathBuf),
    /// Uploads are keyed on their name and content, so re-uploading an edited
    /// file validates again.
    Upload { name: String, digest: u64 },
}

impl SourceKey {
    pub fn of(source: &DataSource) -> Self {
        match source {
            DataSource::Path(path) => SourceKey::Path(path.clone()),
            DataSource::Upload { name, bytes } => {
                let mut hasher = DefaultHasher::new();
                bytes.hash(&mut hasher);
                SourceKey::Upload {
                    name: name.clone(),
                    digest: hasher.finish(),
                }
            }
        }
    }
}

/// Memoized load results, owned by the caller and passed explicitly.
///
/// Lifecycle: empty → populated on miss → emptied by [`DatasetCache::clear`].
/// Failures are never cached.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<SourceKey, Arc<LoadedDataset>>,
    validation_passes: usize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `source`, loading it on a miss.
    ///
    /// Repeated hits hand out the same `Arc`, so callers may compare results
    /// with [`Arc::ptr_eq`].
    pub fn get_or_load(&mut self, source: &DataSource) -> Result<Arc<LoadedDataset>, LoadError> {
        self.get_or_load_with(source, loader::load)
    }

    /// Like [`DatasetCache::get_or_load`] with a custom load function.
    pub fn get_or_load_with<F>(
        &mut self,
        source: &DataSource,
        load: F,
    ) -> Result<Arc<LoadedDataset>, LoadError>
    where
        F: FnOnce(&DataSource) -> Result<LoadedDataset, LoadError>,
    {
        let key = SourceKey::of(source);
        if let Some(hit) = self.entries.get(&key) {
            log::debug!("Dataset cache hit for {}", source.display_name());
            return Ok(Arc::clone(hit));
        }

        self.validation_passes += 1;
        let loaded = Arc::new(load(source)?);
        self.entries.insert(key, Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Discard every cached result.
    pub fn clear(&mut self) {
        log::info!("Clearing {} cached dataset(s)", self.entries.len());
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of load attempts made on cache misses since creation.
    pub fn validation_passes(&self) -> usize {
        self.validation_passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENTS: &str = "timestamp,is_intrusion\n2024-01-01 00:10,1\n2024-01-01 03:00,0\n";

    fn upload(name: &str, text: &str) -> DataSource {
        DataSource::upload(name, text.as_bytes().to_vec())
    }

    #[test]
    fn test_hit_returns_same_dataset() {
        let mut cache = DatasetCache::new();
        let source = upload("a.csv", EVENTS);

        let first = cache.get_or_load(&source).unwrap();
        let second = cache.get_or_load(&source).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.validation_passes(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_forces_revalidation() {
        let mut cache = DatasetCache::new();
        let source = upload("a.csv", EVENTS);

        let first = cache.get_or_load(&source).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        let second = cache.get_or_load(&source).unwrap();

        assert_eq!(cache.validation_passes(), 2);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.dataset.len(), second.dataset.len());
        assert_eq!(first.indicators, second.indicators);
    }

    #[test]
    fn test_uploads_keyed_on_content() {
        let mut cache = DatasetCache::new();
        cache.get_or_load(&upload("a.csv", EVENTS)).unwrap();
        cache
            .get_or_load(&upload("a.csv", "timestamp,rare_ip\n2024-01-01,1\n"))
            .unwrap();
        cache.get_or_load(&upload("b.csv", EVENTS)).unwrap();

        assert_eq!(cache.validation_passes(), 3);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let mut cache = DatasetCache::new();
        let source = upload("bad.csv", "timestamp,src\n2024-01-01,x\n");

        for _ in 0..2 {
            assert_eq!(
                cache.get_or_load(&source).unwrap_err(),
                LoadError::NoThreatColumns
            );
        }
        assert_eq!(cache.validation_passes(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_injected_loader_runs_once_per_key() {
        let mut cache = DatasetCache::new();
        let source = DataSource::Path(PathBuf::from("virtual.csv"));
        let mut calls = 0;

        for _ in 0..3 {
            cache
                .get_or_load_with(&source, |_| {
                    calls += 1;
                    loader::load(&upload("virtual.csv", EVENTS))
                })
                .unwrap();
        }
        assert_eq!(calls, 1);
    }
}
