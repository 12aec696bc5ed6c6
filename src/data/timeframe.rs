use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Timestamp coercion
// ---------------------------------------------------------------------------

/// Date-time layouts accepted after RFC 3339 fails.
/// `%.f` also matches when the fractional part is absent.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, interpreted as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Layouts with an explicit UTC offset, tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f %:z",
    "%Y-%m-%dT%H:%M:%S%.f %z",
];

/// Coerce a text cell into a point in time.
///
/// Values carrying a UTC offset are normalised to UTC; naive values are taken
/// as-is. Returns `None` for empty or unrecognised input, which the loader
/// treats as a row to drop rather than an error.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    // "2024-01-01 00:10:00+02:00" is what most dataframe writers emit for tz-aware columns
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Render a timestamp the way it is written back out on export.
/// Sub-second digits only appear when present.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

// ---------------------------------------------------------------------------
// Timeframe – bucket granularity
// ---------------------------------------------------------------------------

/// Granularity of the derived bucket columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "hour")]
    Hour,
    #[serde(rename = "12_hour")]
    TwelveHour,
    #[serde(rename = "24_hour")]
    Day,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Hour, Timeframe::TwelveHour, Timeframe::Day];

    /// Name of the derived column holding this bucket.
    pub const fn column_name(self) -> &'static str {
        match self {
            Timeframe::Hour => "hour",
            Timeframe::TwelveHour => "12_hour",
            Timeframe::Day => "24_hour",
        }
    }

    pub const fn seconds(self) -> i64 {
        match self {
            Timeframe::Hour => 3_600,
            Timeframe::TwelveHour => 12 * 3_600,
            Timeframe::Day => 24 * 3_600,
        }
    }

    /// Floor `ts` to the start of its containing block.
    ///
    /// Blocks are aligned on the Unix epoch, so 12- and 24-hour blocks start
    /// at midnight and noon.
    pub fn floor(self, ts: NaiveDateTime) -> NaiveDateTime {
        let secs = ts.and_utc().timestamp();
        let floored = secs - secs.rem_euclid(self.seconds());
        DateTime::from_timestamp(floored, 0).map_or(ts, |dt| dt.naive_utc())
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.column_name() == s)
            .ok_or_else(|| format!("unknown timeframe '{s}', expected hour, 12_hour or 24_hour"))
    }
}

// ---------------------------------------------------------------------------
// TimeBuckets – the three derived columns of one row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBuckets {
    pub hour: NaiveDateTime,
    pub twelve_hour: NaiveDateTime,
    pub day: NaiveDateTime,
}

impl TimeBuckets {
    pub fn from_timestamp(ts: NaiveDateTime) -> Self {
        TimeBuckets {
            hour: Timeframe::Hour.floor(ts),
            twelve_hour: Timeframe::TwelveHour.floor(ts),
            day: Timeframe::Day.floor(ts),
        }
    }

    pub const fn get(&self, timeframe: Timeframe) -> NaiveDateTime {
        match timeframe {
            Timeframe::Hour => self.hour,
            Timeframe::TwelveHour => self.twelve_hour,
            Timeframe::Day => self.day,
        }
    }
}
