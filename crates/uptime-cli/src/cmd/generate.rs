use crate::output::print_json;
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use uptime_core::loader;
use uptime_core::paths::{MENU_HOURS_CSV, STORE_STATUS_CSV};
use uptime_core::synth::{self, SimulationParams};

pub struct GenerateArgs<'a> {
    pub stores: Option<usize>,
    pub seed: Option<u64>,
    pub end: Option<&'a str>,
    pub force: bool,
}

/// Write a synthetic `store_status.csv` into the data dir.
///
/// Store ids come from the existing schedule and timezone files; `--stores`
/// adds freshly minted ids on top.
pub fn run(root: &Path, args: GenerateArgs<'_>, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let target = config.data_dir.join(STORE_STATUS_CSV);
    if target.exists() && !args.force {
        bail!("{} already exists (pass --force to replace it)", target.display());
    }

    let (dataset, _) = loader::load_dir(&config.data_dir)
        .with_context(|| format!("failed to load data from {}", config.data_dir.display()))?;
    let mut store_ids = dataset.scheduled_store_ids();
    store_ids.extend((0..args.stores.unwrap_or(0)).map(|_| uuid::Uuid::new_v4().to_string()));
    if store_ids.is_empty() {
        bail!(
            "no stores to simulate: add {} or pass --stores",
            config.data_dir.join(MENU_HOURS_CSV).display()
        );
    }

    let end: DateTime<Utc> = match args.end {
        Some(raw) => loader::parse_timestamp(raw)?,
        None => Utc::now(),
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let observations = synth::simulate(&store_ids, &SimulationParams::ending_at(end), &mut rng);
    synth::write_status_csv(&target, &observations)
        .with_context(|| format!("failed to write {}", target.display()))?;

    if json {
        return print_json(&serde_json::json!({
            "path": target.display().to_string(),
            "stores": store_ids.len(),
            "observations": observations.len(),
            "end": end,
        }));
    }
    println!(
        "wrote {} observations for {} stores to {}",
        observations.len(),
        store_ids.len(),
        target.display()
    );
    Ok(())
}
