//! Submission, generation, and polling of report jobs.
//!
//! `ReportService` owns no global state: the data provider, the job store,
//! and the configuration are handed in by whoever builds it (the HTTP
//! server, the CLI, tests).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::artifact;
use crate::config::Config;
use crate::error::{Result, UptimeError};
use crate::metrics::Aggregator;
use crate::paths;
use crate::provider::DataProvider;
use crate::types::ReportStatus;

use super::job::{generate_report_id, JobStore};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Outcome of offering a job to a background queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enqueue {
    Queued,
    /// The queue could not take the job; the caller runs it inline.
    Unavailable(String),
}

/// A background queue that may or may not accept work right now.
pub trait Dispatch: Send + Sync {
    fn try_enqueue(&self, report_id: &str) -> Enqueue;
}

/// No background queue at all. Every submission runs synchronously.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQueue;

impl Dispatch for NoQueue {
    fn try_enqueue(&self, _report_id: &str) -> Enqueue {
        Enqueue::Unavailable("no background queue configured".into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Async,
    Sync,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub report_id: String,
    pub mode: ExecutionMode,
}

/// What a poller sees for a report id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ReportPoll {
    Running,
    Complete { path: PathBuf },
    Failed { reason: Option<String> },
    NotFound,
}

// ---------------------------------------------------------------------------
// ReportService
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ReportService {
    provider: Arc<dyn DataProvider>,
    jobs: Arc<dyn JobStore>,
    default_tz: Tz,
    reports_dir: PathBuf,
}

impl ReportService {
    /// `config` paths are used as given; anchor them at the project root first.
    pub fn new(
        provider: Arc<dyn DataProvider>,
        jobs: Arc<dyn JobStore>,
        config: &Config,
    ) -> Result<Self> {
        Ok(Self {
            provider,
            jobs,
            default_tz: config.default_tz()?,
            reports_dir: config.reports_dir.clone(),
        })
    }

    pub fn jobs(&self) -> &Arc<dyn JobStore> {
        &self.jobs
    }

    /// Register a new Running job and hand it to `dispatch`.
    ///
    /// When the queue is unavailable the job is generated before this
    /// returns. A generation failure is recorded on the job, not returned.
    pub fn submit(&self, dispatch: &dyn Dispatch) -> Result<Submission> {
        let report_id = generate_report_id();
        self.jobs.create(&report_id)?;

        let mode = match dispatch.try_enqueue(&report_id) {
            Enqueue::Queued => {
                info!(report_id = %report_id, "report queued");
                ExecutionMode::Async
            }
            Enqueue::Unavailable(reason) => {
                warn!(
                    report_id = %report_id,
                    reason = %reason,
                    "queue unavailable, generating inline"
                );
                if let Err(e) = self.generate(&report_id) {
                    warn!(report_id = %report_id, error = %e, "inline report generation failed");
                }
                ExecutionMode::Sync
            }
        };
        Ok(Submission { report_id, mode })
    }

    /// Compute metrics, write the artifact, and move the job to Complete.
    ///
    /// On any error the job is moved to Failed and the error is returned.
    /// A job that is already terminal is rejected without recomputing.
    pub fn generate(&self, report_id: &str) -> Result<PathBuf> {
        let job = self
            .jobs
            .get(report_id)?
            .ok_or_else(|| UptimeError::ReportNotFound(report_id.to_string()))?;
        if job.status.is_terminal() {
            return Err(UptimeError::InvalidTransition {
                report_id: report_id.to_string(),
                from: job.status.to_string(),
                to: ReportStatus::Complete.to_string(),
            });
        }

        let outcome = self.render(report_id).and_then(|path| {
            if let Err(e) = self.jobs.complete(report_id, &path) {
                // No job will point at the file once this one is Failed.
                if let Err(rm) = std::fs::remove_file(&path) {
                    warn!(
                        report_id,
                        path = %path.display(),
                        error = %rm,
                        "unable to remove orphaned report"
                    );
                }
                return Err(e);
            }
            Ok(path)
        });
        match outcome {
            Ok(path) => {
                info!(report_id, path = %path.display(), "report complete");
                Ok(path)
            }
            Err(e) => {
                error!(report_id, error = %e, "report failed");
                if let Err(store_err) = self.jobs.fail(report_id, &e.to_string()) {
                    error!(report_id, error = %store_err, "unable to record report failure");
                }
                Err(e)
            }
        }
    }

    fn render(&self, report_id: &str) -> Result<PathBuf> {
        let now = self.current_time()?;
        let rows = Aggregator::new(self.provider.as_ref(), self.default_tz).compute(now)?;
        let path = paths::report_path(&self.reports_dir, report_id);
        artifact::write_report(&path, &rows)?;
        Ok(path)
    }

    pub fn status(&self, report_id: &str) -> Result<ReportPoll> {
        let Some(job) = self.jobs.get(report_id)? else {
            return Ok(ReportPoll::NotFound);
        };
        Ok(match (job.status, job.output_path) {
            (ReportStatus::Running, _) => ReportPoll::Running,
            (ReportStatus::Complete, Some(path)) => ReportPoll::Complete { path },
            (ReportStatus::Complete, None) => {
                return Err(UptimeError::MissingArtifact(report_id.to_string()))
            }
            (ReportStatus::Failed, _) => ReportPoll::Failed { reason: job.error },
        })
    }

    /// Read a completed report's CSV bytes.
    pub fn read_artifact(&self, report_id: &str, path: &Path) -> Result<Vec<u8>> {
        match std::fs::read(path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(UptimeError::MissingArtifact(report_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn current_time(&self) -> Result<DateTime<Utc>> {
        dataset_now(self.provider.as_ref())
    }
}

/// Latest observation in the dataset, or the wall clock when there is none.
pub fn dataset_now(provider: &dyn DataProvider) -> Result<DateTime<Utc>> {
    Ok(provider
        .max_observation_timestamp()?
        .unwrap_or_else(Utc::now))
}
