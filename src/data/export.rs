use std::path::Path;

use anyhow::{Context, Result};

use super::model::ThreatDataset;

/// File name offered for the download.
pub const DEFAULT_EXPORT_NAME: &str = "final_threat_dataset.csv";

/// Serialize the enriched dataset as UTF-8 CSV: header row, source columns,
/// then `hour`, `12_hour` and `24_hour`.
pub fn to_csv_bytes(dataset: &ThreatDataset) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_records(&mut writer, dataset)?;
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV buffer: {e}"))
}

/// Write the CSV export to `path`.
pub fn write_csv(dataset: &ThreatDataset, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_records(&mut writer, dataset)?;
    writer.flush().context("flushing CSV file")?;
    log::info!("Exported {} rows to {}", dataset.len(), path.display());
    Ok(())
}

fn write_records<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    dataset: &ThreatDataset,
) -> Result<()> {
    writer
        .write_record(dataset.header())
        .context("writing CSV header")?;
    for (row_no, rec) in dataset.records.iter().enumerate() {
        writer
            .write_record(dataset.row_fields(rec))
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }
    Ok(())
}
