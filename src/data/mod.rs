/// Data layer: core types, loading, caching, summaries and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet  (path or uploaded bytes)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse → RawTable → validate → ThreatDataset + indicators
///   └──────────┘
///        │  memoized per source by `cache`
///        ▼
///   ┌──────────────┐
///   │ ThreatDataset │  Vec<ThreatRecord>, timestamp + hour/12_hour/24_hour
///   └──────────────┘
///        │
///        ├──▶ summary  (metrics, bucket sums, flagged rows)
///        └──▶ export   (CSV bytes for download)
/// ```

pub mod cache;
pub mod export;
pub mod indicator;
pub mod loader;
pub mod model;
pub mod summary;
pub mod timeframe;
