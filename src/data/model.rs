use std::fmt;

use chrono::NaiveDateTime;

use super::indicator::ThreatIndicator;
use super::timeframe::{format_timestamp, TimeBuckets, Timeframe};

/// Name of the one column every dataset must carry.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

// ---------------------------------------------------------------------------
// CellValue – a single cell of the event table
// ---------------------------------------------------------------------------

/// Text markers read as missing values, matching the usual dataframe readers.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A dynamically-typed cell value mirroring common dataframe dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Timestamp(NaiveDateTime),
    Null,
}

impl CellValue {
    /// Guess the type of a raw text cell.
    ///
    /// Surrounding whitespace is ignored when detecting numbers, booleans and
    /// missing markers; text cells keep it.
    pub fn guess(s: &str) -> CellValue {
        let t = s.trim();
        if NA_MARKERS.contains(&t) {
            return CellValue::Null;
        }
        if let Ok(i) = t.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = t.parse::<f64>() {
            return CellValue::Float(f);
        }
        match t {
            "true" | "True" | "TRUE" => CellValue::Bool(true),
            "false" | "False" | "FALSE" => CellValue::Bool(false),
            _ => CellValue::String(s.to_string()),
        }
    }

    /// Numeric view used for indicator sums. Non-finite floats count as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v).filter(|v| v.is_finite()),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

/// The `Display` form is also the exported CSV field.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // keep a trailing ".0" so integral floats stay floats when re-read
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(true) => write!(f, "True"),
            CellValue::Bool(false) => write!(f, "False"),
            CellValue::Timestamp(ts) => write!(f, "{}", format_timestamp(ts)),
            CellValue::Null => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// ThreatRecord – one validated row
// ---------------------------------------------------------------------------

/// A single event row that survived timestamp coercion.
#[derive(Debug, Clone)]
pub struct ThreatRecord {
    /// Parsed `timestamp` column.
    pub timestamp: NaiveDateTime,
    /// Derived `hour`, `12_hour` and `24_hour` columns.
    pub buckets: TimeBuckets,
    /// Source cells aligned with [`ThreatDataset::columns`]; the timestamp
    /// cell holds [`CellValue::Timestamp`].
    pub values: Vec<CellValue>,
}

impl ThreatRecord {
    pub fn new(timestamp: NaiveDateTime, values: Vec<CellValue>) -> Self {
        ThreatRecord {
            timestamp,
            buckets: TimeBuckets::from_timestamp(timestamp),
            values,
        }
    }
}

// ---------------------------------------------------------------------------
// ThreatDataset – the validated, enriched table
// ---------------------------------------------------------------------------

/// The validated dataset. Never mutated once built.
#[derive(Debug, Clone)]
pub struct ThreatDataset {
    /// Source column names in source order (derived columns excluded).
    pub columns: Vec<String>,
    pub records: Vec<ThreatRecord>,
}

impl ThreatDataset {
    pub fn new(columns: Vec<String>, records: Vec<ThreatRecord>) -> Self {
        ThreatDataset { columns, records }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All column names as exposed to consumers: source columns followed by
    /// the derived bucket columns.
    pub fn header(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(String::as_str)
            .chain(Timeframe::ALL.iter().map(|tf| tf.column_name()))
            .collect()
    }

    /// One row rendered as text, in [`ThreatDataset::header`] order.
    pub fn row_fields(&self, record: &ThreatRecord) -> Vec<String> {
        record
            .values
            .iter()
            .map(CellValue::to_string)
            .chain(
                Timeframe::ALL
                    .iter()
                    .map(|tf| format_timestamp(&record.buckets.get(*tf))),
            )
            .collect()
    }

    /// Numeric value of `indicator` in `record`; missing or non-numeric
    /// cells count as zero.
    pub fn indicator_value(&self, record: &ThreatRecord, indicator: ThreatIndicator) -> f64 {
        self.column_index(indicator.column_name())
            .and_then(|idx| record.values.get(idx))
            .and_then(CellValue::as_f64)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_types() {
        assert_eq!(CellValue::guess(""), CellValue::Null);
        assert_eq!(CellValue::guess("1"), CellValue::Integer(1));
        assert_eq!(CellValue::guess("0.5"), CellValue::Float(0.5));
        assert_eq!(CellValue::guess("True"), CellValue::Bool(true));
        assert_eq!(
            CellValue::guess("10.0.0.1"),
            CellValue::String("10.0.0.1".to_string())
        );
    }

    #[test]
    fn test_guess_missing_markers() {
        for raw in ["NaN", "nan", "NA", "N/A", "null", "None", "<NA>", " NaN "] {
            assert_eq!(CellValue::guess(raw), CellValue::Null, "{raw:?}");
        }
    }

    #[test]
    fn test_guess_ignores_padding_for_numbers() {
        assert_eq!(CellValue::guess(" 1"), CellValue::Integer(1));
        assert_eq!(CellValue::guess("TRUE "), CellValue::Bool(true));
        assert_eq!(CellValue::guess(" tcp"), CellValue::String(" tcp".to_string()));
    }

    #[test]
    fn test_non_finite_is_not_numeric() {
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(CellValue::guess("inf").as_f64(), None);
        assert_eq!(CellValue::Float(0.5).as_f64(), Some(0.5));
    }

    #[test]
    fn test_display_is_reparseable() {
        for raw in ["1", "2.0", "0.25", "True", "tcp", " tcp"] {
            let cell = CellValue::guess(raw);
            assert_eq!(CellValue::guess(&cell.to_string()), cell);
        }
        assert_eq!(CellValue::Null.to_string(), "");
    }

    #[test]
    fn test_header_appends_buckets() {
        let ds = ThreatDataset::new(vec!["timestamp".into(), "is_spike".into()], Vec::new());
        assert_eq!(
            ds.header(),
            vec!["timestamp", "is_spike", "hour", "12_hour", "24_hour"]
        );
    }

    #[test]
    fn test_indicator_value_defaults_to_zero() {
        let ts = NaiveDateTime::parse_from_str("2024-01-01 00:10:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let ds = ThreatDataset::new(
            vec!["timestamp".into(), "is_spike".into()],
            vec![
                ThreatRecord::new(ts, vec![CellValue::Timestamp(ts), CellValue::Integer(1)]),
                ThreatRecord::new(ts, vec![CellValue::Timestamp(ts), CellValue::Null]),
            ],
        );
        assert_eq!(ds.indicator_value(&ds.records[0], ThreatIndicator::Spike), 1.0);
        assert_eq!(ds.indicator_value(&ds.records[1], ThreatIndicator::Spike), 0.0);
        assert_eq!(ds.indicator_value(&ds.records[0], ThreatIndicator::RareIp), 0.0);
    }
}
