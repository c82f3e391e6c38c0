use crate::output::{print_fields, print_json};
use anyhow::{anyhow, Context};
use std::path::Path;
use uptime_core::report::{JobStore, ReportDb};

pub fn run(root: &Path, report_id: &str, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let db = ReportDb::open(&config.db_path)
        .with_context(|| format!("failed to open job db {}", config.db_path.display()))?;
    let job = db
        .get(report_id)?
        .ok_or_else(|| anyhow!("report not found: {report_id}"))?;

    if json {
        return print_json(&job);
    }

    let mut fields = vec![
        ("report_id", job.report_id.clone()),
        ("status", job.status.to_string()),
        ("order", job.created_order.to_string()),
        (
            "created",
            job.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ),
        (
            "updated",
            job.updated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ),
    ];
    if let Some(path) = &job.output_path {
        fields.push(("output", path.display().to_string()));
    }
    if let Some(error) = &job.error {
        fields.push(("error", error.clone()));
    }
    print_fields(&fields);
    Ok(())
}
