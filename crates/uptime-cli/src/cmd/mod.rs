pub mod check;
pub mod generate;
pub mod report;
pub mod serve;
pub mod status;

use anyhow::Context;
use std::path::Path;
use uptime_core::config::Config;

/// Load `uptime.yaml` at `root` with every relative path anchored there.
pub(crate) fn load_config(root: &Path) -> anyhow::Result<Config> {
    let config = Config::load(root)
        .with_context(|| format!("failed to load config under {}", root.display()))?;
    Ok(config.anchored(root))
}
