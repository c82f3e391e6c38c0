use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uptime_core::loader;
use uptime_core::report::{ReportDb, ReportService};
use uptime_server::{AppState, WorkerPool};

pub fn run(root: &Path, port: u16, workers: Option<usize>) -> anyhow::Result<()> {
    let mut config = super::load_config(root)?;
    if let Some(n) = workers {
        config.workers = n;
    }
    config.validate()?;

    let (dataset, load) = loader::load_dir(&config.data_dir)
        .with_context(|| format!("failed to load data from {}", config.data_dir.display()))?;
    if !load.is_clean() {
        warn!(
            rejected = load.errors.len(),
            missing = load.missing_files.len(),
            "dataset loaded with problems"
        );
    }

    let db = ReportDb::open(&config.db_path)
        .with_context(|| format!("failed to open job db {}", config.db_path.display()))?;
    let recovered = db.startup_recovery()?;
    if recovered > 0 {
        info!(recovered, "orphaned running reports marked failed");
    }

    let service = Arc::new(ReportService::new(
        Arc::new(dataset),
        Arc::new(db),
        &config,
    )?);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        let pool = WorkerPool::start(service.clone(), config.workers, config.queue_capacity);
        let state = AppState::new(service, Arc::new(pool));

        println!("uptime report server → http://localhost:{actual_port}");

        tokio::select! {
            res = uptime_server::serve_on(state, listener) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
