use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use uptime_core::loader;

/// Row errors shown in table mode; `--json` prints all of them.
const MAX_ERRORS_SHOWN: usize = 20;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let (dataset, report) = loader::load_dir(&config.data_dir)
        .with_context(|| format!("failed to load data from {}", config.data_dir.display()))?;

    if json {
        #[derive(serde::Serialize)]
        struct CheckOutput<'a> {
            data_dir: String,
            stores: usize,
            #[serde(flatten)]
            report: &'a loader::LoadReport,
            clean: bool,
        }

        return print_json(&CheckOutput {
            data_dir: config.data_dir.display().to_string(),
            stores: dataset.store_count(),
            report: &report,
            clean: report.is_clean(),
        });
    }

    println!("data dir:      {}", config.data_dir.display());
    println!("stores:        {}", dataset.store_count());
    println!("observations:  {}", report.observations);
    println!("hours rules:   {}", report.rules);
    println!("timezones:     {}", report.timezones);
    for file in &report.missing_files {
        println!("missing file:  {file}");
    }

    if report.errors.is_empty() {
        println!("rejected rows: 0");
        return Ok(());
    }

    println!("rejected rows: {}", report.errors.len());
    println!();
    let rows: Vec<Vec<String>> = report
        .errors
        .iter()
        .take(MAX_ERRORS_SHOWN)
        .map(|e| vec![e.file.clone(), e.line.to_string(), e.reason.clone()])
        .collect();
    print_table(&["FILE", "LINE", "REASON"], rows);
    if report.errors.len() > MAX_ERRORS_SHOWN {
        println!("... {} more", report.errors.len() - MAX_ERRORS_SHOWN);
    }
    Ok(())
}
