use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::indicator::ThreatIndicator;
use super::model::{CellValue, ThreatDataset, ThreatRecord, TIMESTAMP_COLUMN};
use super::timeframe::{parse_timestamp, Timeframe};

// ---------------------------------------------------------------------------
// Sources, results and errors
// ---------------------------------------------------------------------------

/// Where a dataset comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Bytes handed over by the user (file picker, drag and drop).
    Upload { name: String, bytes: Arc<[u8]> },
    /// A file on disk, e.g. the default dataset next to the executable.
    Path(PathBuf),
}

impl DataSource {
    pub fn upload(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        DataSource::Upload {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Human readable origin, shown in the UI and in logs.
    pub fn display_name(&self) -> String {
        match self {
            DataSource::Upload { name, .. } => name.clone(),
            DataSource::Path(path) => path.display().to_string(),
        }
    }

    fn format(&self) -> SourceFormat {
        let ext = match self {
            DataSource::Upload { name, .. } => Path::new(name).extension(),
            DataSource::Path(path) => path.extension(),
        }
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

        match ext.as_str() {
            "parquet" | "pq" => SourceFormat::Parquet,
            "json" => SourceFormat::Json,
            _ => SourceFormat::Csv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceFormat {
    Csv,
    Json,
    Parquet,
}

/// Terminal load failures. Each one stops the dashboard from rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("The file is completely empty.")]
    EmptySource,
    #[error("The CSV file is empty or has no columns.")]
    EmptyOrMalformed,
    #[error("Missing required '{0}' column.")]
    MissingRequiredColumn(String),
    #[error("No valid threat columns found.")]
    NoThreatColumns,
    #[error("Error reading file: {0}")]
    LoadFailed(String),
}

impl LoadError {
    /// Recover the typed error from an `anyhow` chain, or wrap the chain as
    /// [`LoadError::LoadFailed`].
    fn from_anyhow(err: anyhow::Error) -> Self {
        match err.downcast::<LoadError>() {
            Ok(typed) => typed,
            Err(other) => LoadError::LoadFailed(format!("{other:#}")),
        }
    }
}

/// A validated dataset together with the threat indicators it carries.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: ThreatDataset,
    /// Detected indicator columns, non-empty, in candidate order.
    pub indicators: Vec<ThreatIndicator>,
}

/// Table of text cells as parsed from any source format, before validation.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and validate a threat dataset.
///
/// Supported formats (by extension of the path or upload name):
/// * `.parquet` / `.pq` – Arrow record batches, path sources only
/// * `.json`            – `[{ "timestamp": "...", "is_spike": 1, ... }, ...]`
/// * anything else      – CSV with a header row
///
/// Rows whose `timestamp` cannot be parsed are dropped. Every other problem
/// is reported as a [`LoadError`].
pub fn load(source: &DataSource) -> Result<LoadedDataset, LoadError> {
    let raw = read_raw(source).map_err(LoadError::from_anyhow)?;
    let loaded = validate(raw)?;
    log::info!(
        "Loaded {} rows from {} with threat columns {:?}",
        loaded.dataset.len(),
        source.display_name(),
        loaded.indicators
    );
    Ok(loaded)
}

fn read_raw(source: &DataSource) -> Result<RawTable> {
    match (source.format(), source) {
        (SourceFormat::Parquet, DataSource::Path(path)) => read_parquet(path),
        (SourceFormat::Parquet, DataSource::Upload { .. }) => {
            bail!("Parquet data must be opened from a file path")
        }
        (SourceFormat::Json, _) => parse_json(&source_bytes(source)?),
        (SourceFormat::Csv, _) => parse_csv(&source_bytes(source)?),
    }
}

fn source_bytes(source: &DataSource) -> Result<Arc<[u8]>> {
    match source {
        DataSource::Upload { bytes, .. } => Ok(Arc::clone(bytes)),
        DataSource::Path(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Ok(bytes.into())
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Turn a raw table into a validated dataset.
///
/// Columns named like a derived bucket column are replaced by the derived
/// values. A table whose timestamps are all unparseable is rejected as
/// [`LoadError::EmptyOrMalformed`].
pub fn validate(raw: RawTable) -> Result<LoadedDataset, LoadError> {
    if raw.columns.is_empty() || raw.rows.is_empty() {
        return Err(LoadError::EmptyOrMalformed);
    }

    let ts_idx = raw
        .columns
        .iter()
        .position(|c| c == TIMESTAMP_COLUMN)
        .ok_or_else(|| LoadError::MissingRequiredColumn(TIMESTAMP_COLUMN.to_string()))?;

    let kept: Vec<usize> = (0..raw.columns.len())
        .filter(|&i| {
            !Timeframe::ALL
                .iter()
                .any(|tf| tf.column_name() == raw.columns[i])
        })
        .collect();
    if kept.len() < raw.columns.len() {
        log::debug!("Replacing source columns that clash with derived bucket columns");
    }
    let columns: Vec<String> = kept.iter().map(|&i| raw.columns[i].clone()).collect();

    let total_rows = raw.rows.len();
    let mut records = Vec::with_capacity(total_rows);
    for row in raw.rows {
        let Some(timestamp) = row.get(ts_idx).and_then(|cell| parse_timestamp(cell)) else {
            continue;
        };
        let values = kept
            .iter()
            .map(|&i| {
                if i == ts_idx {
                    CellValue::Timestamp(timestamp)
                } else {
                    CellValue::guess(row.get(i).map_or("", String::as_str))
                }
            })
            .collect();
        records.push(ThreatRecord::new(timestamp, values));
    }

    let dropped = total_rows - records.len();
    if dropped > 0 {
        log::warn!("Dropped {dropped} of {total_rows} rows with unparseable timestamps");
    }
    if records.is_empty() {
        return Err(LoadError::EmptyOrMalformed);
    }

    let indicators = ThreatIndicator::detect(&columns);
    if indicators.is_empty() {
        return Err(LoadError::NoThreatColumns);
    }

    Ok(LoadedDataset {
        dataset: ThreatDataset::new(columns, records),
        indicators,
    })
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one event per line.
/// Short rows are padded with empty cells; long rows are an error.
/// Fields and headers are kept verbatim, whitespace included.
fn parse_csv(bytes: &[u8]) -> Result<RawTable> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        bail!(LoadError::EmptySource);
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if columns.is_empty() {
        bail!(LoadError::EmptySource);
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > columns.len() {
            bail!(
                "Expected {} fields in CSV row {row_no}, saw {}",
                columns.len(),
                record.len()
            );
        }
        let mut row: Vec<String> = record.iter().map(|v| v.to_string()).collect();
        row.resize(columns.len(), String::new());
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "timestamp": "2024-01-01 00:10:00", "src_ip": "10.0.0.4", "is_spike": 1 },
///   ...
/// ]
/// ```
///
/// Columns are the union of all object keys in first-seen order.
fn parse_json(bytes: &[u8]) -> Result<RawTable> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        bail!(LoadError::EmptySource);
    }
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map_or_else(String::new, json_to_text))
                .collect::<Vec<String>>()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet file. Every cell is rendered to text through Arrow's display
/// formatting, so timestamp columns come out as ISO-8601 and go through the
/// same coercion as CSV cells.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| {
                    if col.is_null(row) {
                        Ok(String::new())
                    } else {
                        array_value_to_string(col, row)
                            .with_context(|| format!("Row {row}: formatting parquet value"))
                    }
                })
                .collect::<Result<Vec<String>>>()?;
            rows.push(cells);
        }
    }

    Ok(RawTable { columns, rows })
}
