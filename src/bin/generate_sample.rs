use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray, TimestampSecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use parquet::arrow::ArrowWriter;

use threat_lens::data::timeframe::format_timestamp;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// One synthetic network event.
struct Event {
    timestamp: Option<NaiveDateTime>,
    src_ip: String,
    dst_port: i64,
    protocol: &'static str,
    bytes: i64,
    is_intrusion: i64,
    malware_like: i64,
    is_spike: i64,
    rare_ip: i64,
}

fn generate_events(rng: &mut SimpleRng, start: NaiveDateTime, days: i64) -> Vec<Event> {
    let protocols = ["tcp", "udp", "icmp"];
    let ports = [22, 53, 80, 443, 3389, 8080];
    let end = start + TimeDelta::days(days);

    let mut events = Vec::new();
    let mut ts = start;
    while ts < end {
        let rare = rng.chance(0.02);
        let src_ip = if rare {
            format!("203.0.113.{}", rng.range(1, 255))
        } else {
            format!("10.0.{}.{}", rng.range(0, 4), rng.range(1, 64))
        };
        let bytes = if rng.chance(0.04) {
            rng.range(50_000, 500_000) as i64
        } else {
            rng.range(60, 4_000) as i64
        };

        events.push(Event {
            // a few malformed stamps exercise the loader's row filter
            timestamp: (events.len() % 250 != 249).then_some(ts),
            src_ip,
            dst_port: ports[rng.range(0, ports.len() as u64) as usize],
            protocol: protocols[rng.range(0, protocols.len() as u64) as usize],
            bytes,
            is_intrusion: i64::from(rng.chance(0.05)),
            malware_like: i64::from(rng.chance(0.03)),
            is_spike: i64::from(bytes >= 50_000),
            rare_ip: i64::from(rare),
        });

        ts += TimeDelta::seconds(rng.range(60, 600) as i64);
    }
    events
}

fn write_csv(events: &[Event], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    writer.write_record([
        "timestamp",
        "src_ip",
        "dst_port",
        "protocol",
        "bytes",
        "is_intrusion",
        "malware_like",
        "is_spike",
        "rare_ip",
    ])?;
    for ev in events {
        writer.write_record([
            ev.timestamp
                .as_ref()
                .map_or_else(|| "n/a".to_string(), format_timestamp),
            ev.src_ip.clone(),
            ev.dst_port.to_string(),
            ev.protocol.to_string(),
            ev.bytes.to_string(),
            ev.is_intrusion.to_string(),
            ev.malware_like.to_string(),
            ev.is_spike.to_string(),
            ev.rare_ip.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn write_parquet(events: &[Event], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("timestamp", DataType::Timestamp(TimeUnit::Second, None), true),
        Field::new("src_ip", DataType::Utf8, false),
        Field::new("dst_port", DataType::Int64, false),
        Field::new("protocol", DataType::Utf8, false),
        Field::new("bytes", DataType::Int64, false),
        Field::new("is_intrusion", DataType::Int64, false),
        Field::new("malware_like", DataType::Int64, false),
        Field::new("is_spike", DataType::Int64, false),
        Field::new("rare_ip", DataType::Int64, false),
    ]));

    let int_column = |f: fn(&Event) -> i64| Int64Array::from(events.iter().map(f).collect::<Vec<_>>());

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(TimestampSecondArray::from(
                events
                    .iter()
                    .map(|e| e.timestamp.map(|ts| ts.and_utc().timestamp()))
                    .collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                events.iter().map(|e| e.src_ip.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(int_column(|e| e.dst_port)),
            Arc::new(StringArray::from(
                events.iter().map(|e| e.protocol).collect::<Vec<_>>(),
            )),
            Arc::new(int_column(|e| e.bytes)),
            Arc::new(int_column(|e| e.is_intrusion)),
            Arc::new(int_column(|e| e.malware_like)),
            Arc::new(int_column(|e| e.is_spike)),
            Arc::new(int_column(|e| e.rare_ip)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;
    let events = generate_events(&mut rng, start, 3);

    let csv_path = "final_threat_dataset.csv";
    let parquet_path = "final_threat_dataset.parquet";
    write_csv(&events, csv_path)?;
    write_parquet(&events, parquet_path)?;

    println!(
        "Wrote {} events to {csv_path} and {parquet_path}",
        events.len()
    );
    Ok(())
}
