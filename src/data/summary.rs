use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::indicator::ThreatIndicator;
use super::model::{ThreatDataset, ThreatRecord};
use super::timeframe::Timeframe;

/// Sum of one indicator inside one time bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketCount {
    pub start: NaiveDateTime,
    pub total: f64,
}

/// Sum of an indicator column over the whole dataset.
pub fn indicator_total(dataset: &ThreatDataset, indicator: ThreatIndicator) -> f64 {
    dataset
        .records
        .iter()
        .map(|rec| dataset.indicator_value(rec, indicator))
        .sum()
}

/// Group rows by the `timeframe` bucket and sum `indicator` per bucket.
///
/// Every bucket holding at least one row is present, ascending by start.
pub fn bucket_summary(
    dataset: &ThreatDataset,
    indicator: ThreatIndicator,
    timeframe: Timeframe,
) -> Vec<BucketCount> {
    let mut sums: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();
    for rec in &dataset.records {
        *sums.entry(rec.buckets.get(timeframe)).or_default() +=
            dataset.indicator_value(rec, indicator);
    }
    sums.into_iter()
        .map(|(start, total)| BucketCount { start, total })
        .collect()
}

/// Rows where `indicator` is exactly 1, newest first, at most `limit`.
pub fn flagged_rows(
    dataset: &ThreatDataset,
    indicator: ThreatIndicator,
    limit: usize,
) -> Vec<&ThreatRecord> {
    let mut rows: Vec<&ThreatRecord> = dataset
        .records
        .iter()
        .filter(|rec| dataset.indicator_value(rec, indicator) == 1.0)
        .collect();
    rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    rows.truncate(limit);
    rows
}

/// Indices of the x-axis labels to draw for `n` bars.
///
/// Up to `max_ticks` bars every label is shown; beyond that every
/// `n / max_ticks`-th one.
pub fn tick_positions(n: usize, max_ticks: usize) -> Vec<usize> {
    if max_ticks == 0 || n <= max_ticks {
        return (0..n).collect();
    }
    (0..n).step_by(n / max_ticks).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{load, DataSource};
    use crate::data::timeframe::parse_timestamp;

    fn dataset() -> ThreatDataset {
        let csv = "\
timestamp,is_intrusion,rare_ip
2024-01-01 00:10,1,0
2024-01-01 00:50,1,1
2024-01-01 13:05,0,1
2024-01-02 09:00,1,0
2024-01-01 01:30,0,0
";
        load(&DataSource::upload("t.csv", csv.as_bytes().to_vec()))
            .unwrap()
            .dataset
    }

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_totals() {
        let ds = dataset();
        assert_eq!(indicator_total(&ds, ThreatIndicator::Intrusion), 3.0);
        assert_eq!(indicator_total(&ds, ThreatIndicator::RareIp), 2.0);
        assert_eq!(indicator_total(&ds, ThreatIndicator::Spike), 0.0);
    }

    #[test]
    fn test_missing_markers_are_skipped_in_sums() {
        let csv = "timestamp,is_spike\n2024-01-01 00:10,1\n2024-01-01 00:20,NaN\n2024-01-01 00:30,1\n";
        let ds = load(&DataSource::upload("t.csv", csv.as_bytes().to_vec()))
            .unwrap()
            .dataset;
        assert_eq!(indicator_total(&ds, ThreatIndicator::Spike), 2.0);

        let buckets = bucket_summary(&ds, ThreatIndicator::Spike, Timeframe::Hour);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].start, ts("2024-01-01 00:00"));
        assert_eq!(buckets[0].total, 2.0);
    }

    #[test]
    fn test_hourly_buckets_sorted_with_zero_sums() {
        let ds = dataset();
        let summary = bucket_summary(&ds, ThreatIndicator::Intrusion, Timeframe::Hour);
        assert_eq!(
            summary,
            vec![
                BucketCount { start: ts("2024-01-01 00:00"), total: 2.0 },
                BucketCount { start: ts("2024-01-01 01:00"), total: 0.0 },
                BucketCount { start: ts("2024-01-01 13:00"), total: 0.0 },
                BucketCount { start: ts("2024-01-02 09:00"), total: 1.0 },
            ]
        );
    }

    #[test]
    fn test_twelve_hour_and_daily_buckets() {
        let ds = dataset();
        let half_days = bucket_summary(&ds, ThreatIndicator::RareIp, Timeframe::TwelveHour);
        assert_eq!(
            half_days,
            vec![
                BucketCount { start: ts("2024-01-01 00:00"), total: 1.0 },
                BucketCount { start: ts("2024-01-01 12:00"), total: 1.0 },
                BucketCount { start: ts("2024-01-02 00:00"), total: 0.0 },
            ]
        );

        let days = bucket_summary(&ds, ThreatIndicator::Intrusion, Timeframe::Day);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].total, 2.0);
    }

    #[test]
    fn test_bucket_totals_add_up() {
        let ds = dataset();
        for tf in Timeframe::ALL {
            let sum: f64 = bucket_summary(&ds, ThreatIndicator::Intrusion, tf)
                .iter()
                .map(|b| b.total)
                .sum();
            assert_eq!(sum, indicator_total(&ds, ThreatIndicator::Intrusion));
        }
    }

    #[test]
    fn test_flagged_rows_newest_first() {
        let ds = dataset();
        let rows = flagged_rows(&ds, ThreatIndicator::Intrusion, 100);
        let stamps: Vec<NaiveDateTime> = rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(
            stamps,
            vec![
                ts("2024-01-02 09:00"),
                ts("2024-01-01 00:50"),
                ts("2024-01-01 00:10"),
            ]
        );
    }

    #[test]
    fn test_flagged_rows_limit() {
        let ds = dataset();
        let rows = flagged_rows(&ds, ThreatIndicator::Intrusion, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].timestamp, ts("2024-01-02 09:00"));
    }

    #[test]
    fn test_tick_positions() {
        assert_eq!(tick_positions(5, 20), vec![0, 1, 2, 3, 4]);
        assert_eq!(tick_positions(20, 20).len(), 20);
        assert_eq!(tick_positions(45, 20), (0..45).step_by(2).collect::<Vec<_>>());
        assert_eq!(tick_positions(0, 20), Vec::<usize>::new());
    }
}
