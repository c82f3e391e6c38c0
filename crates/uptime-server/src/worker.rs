//! Background report workers.
//!
//! A bounded queue of report ids drained by a fixed set of tokio tasks. Each
//! worker runs one generation at a time on the blocking pool. There are no
//! retries: a failed job stays Failed, and a job lost to a worker panic stays
//! Running until `startup_recovery` reconciles it.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};
use uptime_core::report::{Dispatch, Enqueue, ReportService};

#[derive(Clone)]
pub struct WorkerPool {
    tx: mpsc::Sender<String>,
}

impl WorkerPool {
    /// Spawn `workers` tasks sharing a queue of `capacity` pending jobs.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start(service: Arc<ReportService>, workers: usize, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel::<String>(capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        for worker in 0..workers.max(1) {
            let rx = rx.clone();
            let service = service.clone();
            tokio::spawn(async move {
                loop {
                    let next = rx.lock().await.recv().await;
                    let Some(report_id) = next else {
                        break;
                    };
                    run_job(worker, &service, report_id).await;
                }
                debug!(worker, "report worker stopped");
            });
        }
        info!(workers, capacity, "report workers started");

        Self { tx }
    }
}

async fn run_job(worker: usize, service: &Arc<ReportService>, report_id: String) {
    debug!(worker, report_id = %report_id, "report picked up");
    let svc = service.clone();
    let id = report_id.clone();
    match tokio::task::spawn_blocking(move || svc.generate(&id)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!(worker, report_id = %report_id, error = %e, "queued report failed"),
        Err(e) => error!(worker, report_id = %report_id, error = %e, "report worker panicked"),
    }
}

impl Dispatch for WorkerPool {
    fn try_enqueue(&self, report_id: &str) -> Enqueue {
        match self.tx.try_send(report_id.to_string()) {
            Ok(()) => Enqueue::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => {
                Enqueue::Unavailable("report queue is full".into())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Enqueue::Unavailable("report queue is closed".into())
            }
        }
    }
}
