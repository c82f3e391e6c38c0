//! CSV report artifact.

use crate::error::{Result, UptimeError};
use crate::metrics::StoreMetrics;
use std::path::Path;
use tracing::info;

pub const REPORT_COLUMNS: [&str; 7] = [
    "store_id",
    "uptime_last_hour",
    "uptime_last_day",
    "uptime_last_week",
    "downtime_last_hour",
    "downtime_last_day",
    "downtime_last_week",
];

/// Render rows as CSV with every figure fixed to two decimals.
pub fn render_csv(rows: &[StoreMetrics]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(REPORT_COLUMNS)?;
    for row in rows {
        writer.write_record([
            row.store_id.clone(),
            format!("{:.2}", row.uptime_last_hour),
            format!("{:.2}", row.uptime_last_day),
            format!("{:.2}", row.uptime_last_week),
            format!("{:.2}", row.downtime_last_hour),
            format!("{:.2}", row.downtime_last_day),
            format!("{:.2}", row.downtime_last_week),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| UptimeError::Io(e.into_error()))
}

/// Write the report to `path` in one atomic step.
pub fn write_report(path: &Path, rows: &[StoreMetrics]) -> Result<()> {
    let data = render_csv(rows)?;
    crate::io::atomic_write(path, &data)?;
    info!(path = %path.display(), stores = rows.len(), "report written");
    Ok(())
}
