use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use uptime_core::artifact::{self, REPORT_COLUMNS};
use uptime_core::loader;
use uptime_core::metrics::Aggregator;
use uptime_core::report::dataset_now;

/// Compute the report once, in-process, without touching the job db.
pub fn run(root: &Path, out: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let (dataset, load) = loader::load_dir(&config.data_dir)
        .with_context(|| format!("failed to load data from {}", config.data_dir.display()))?;
    if !load.errors.is_empty() {
        eprintln!(
            "warning: {} rows rejected (run `uptime check` for details)",
            load.errors.len()
        );
    }

    let now = dataset_now(&dataset)?;
    let rows = Aggregator::new(&dataset, config.default_tz()?).compute(now)?;

    if let Some(path) = out {
        artifact::write_report(path, &rows)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {} stores to {}", rows.len(), path.display());
        return Ok(());
    }

    if json {
        #[derive(serde::Serialize)]
        struct ReportOutput<'a> {
            current_time: chrono::DateTime<chrono::Utc>,
            stores: &'a [uptime_core::metrics::StoreMetrics],
        }
        return print_json(&ReportOutput {
            current_time: now,
            stores: &rows,
        });
    }

    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.store_id.clone(),
                format!("{:.2}", r.uptime_last_hour),
                format!("{:.2}", r.uptime_last_day),
                format!("{:.2}", r.uptime_last_week),
                format!("{:.2}", r.downtime_last_hour),
                format!("{:.2}", r.downtime_last_day),
                format!("{:.2}", r.downtime_last_week),
            ]
        })
        .collect();
    print_table(&REPORT_COLUMNS, table);
    Ok(())
}
