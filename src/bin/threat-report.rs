//! Command line front end over the same loader the dashboard uses.
//!
//! ```text
//! threat-report final_threat_dataset.csv --threat is_spike --timeframe 12_hour
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use threat_lens::config::DashboardConfig;
use threat_lens::data::export;
use threat_lens::data::indicator::ThreatIndicator;
use threat_lens::data::loader::{load, DataSource};
use threat_lens::data::summary::{bucket_summary, indicator_total};
use threat_lens::data::timeframe::{format_timestamp, Timeframe};

#[derive(Debug, Parser)]
#[command(name = "threat-report", about = "Summarize a network threat dataset")]
struct Args {
    /// Dataset to load (defaults to the dashboard's default dataset)
    path: Option<PathBuf>,

    /// Threat column to chart (defaults to the first one detected)
    #[arg(long)]
    threat: Option<String>,

    /// Bucket granularity: hour, 12_hour or 24_hour
    #[arg(long)]
    timeframe: Option<Timeframe>,

    /// Also write the enriched dataset as CSV
    #[arg(long)]
    export: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = DashboardConfig::load();
    let path = args
        .path
        .unwrap_or_else(|| config.default_dataset_path());
    let timeframe = args.timeframe.unwrap_or(config.default_timeframe);

    let loaded = load(&DataSource::Path(path.clone()))?;
    let dataset = &loaded.dataset;

    let threat = match args.threat.as_deref() {
        Some(name) => {
            let ind = ThreatIndicator::from_column(name)
                .ok_or_else(|| anyhow::anyhow!("unknown threat column '{name}'"))?;
            anyhow::ensure!(
                loaded.indicators.contains(&ind),
                "threat column '{name}' is not present in {}",
                path.display()
            );
            ind
        }
        None => loaded.indicators[0],
    };

    println!("{}: {} events", path.display(), dataset.len());
    println!();
    println!("Threat Overview");
    for &ind in &loaded.indicators {
        println!(
            "  {:<18} {}",
            ind.metric_label(),
            indicator_total(dataset, ind) as i64
        );
    }

    println!();
    println!("{} per {timeframe}", threat.title());
    for bucket in bucket_summary(dataset, threat, timeframe) {
        println!("  {}  {}", format_timestamp(&bucket.start), bucket.total as i64);
    }

    if let Some(out) = args.export {
        export::write_csv(dataset, &out)?;
        println!();
        println!("Wrote {}", out.display());
    }

    Ok(())
}
