//! Report job record and the storage seam the orchestrator writes through.

use crate::error::{Result, UptimeError};
use crate::types::ReportStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ReportJob
// ---------------------------------------------------------------------------

/// One submission of the report generator.
///
/// Transitions: `Running → Complete | Failed`. `output_path` is set only
/// together with `Complete`; `error` only together with `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportJob {
    pub report_id: String,
    pub status: ReportStatus,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    /// Monotonic submission counter assigned by the store.
    pub created_order: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ReportJob {
    pub fn new(report_id: impl Into<String>, created_order: u64) -> Self {
        let now = Utc::now();
        Self {
            report_id: report_id.into(),
            status: ReportStatus::Running,
            output_path: None,
            created_order,
            created_at: now,
            updated_at: now,
            error: None,
        }
    }

    pub fn mark_complete(&mut self, output_path: &Path) -> Result<()> {
        self.ensure_running(ReportStatus::Complete)?;
        self.status = ReportStatus::Complete;
        self.output_path = Some(output_path.to_path_buf());
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<()> {
        self.ensure_running(ReportStatus::Failed)?;
        self.status = ReportStatus::Failed;
        self.error = Some(reason.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    fn ensure_running(&self, to: ReportStatus) -> Result<()> {
        if self.status != ReportStatus::Running {
            return Err(UptimeError::InvalidTransition {
                report_id: self.report_id.clone(),
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }
}

pub fn generate_report_id() -> String {
    Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// JobStore
// ---------------------------------------------------------------------------

/// Create/read/update access to report jobs, keyed by `report_id`.
pub trait JobStore: Send + Sync {
    /// Persist a new `Running` job with the next `created_order`.
    fn create(&self, report_id: &str) -> Result<ReportJob>;

    fn get(&self, report_id: &str) -> Result<Option<ReportJob>>;

    fn complete(&self, report_id: &str, output_path: &Path) -> Result<ReportJob>;

    fn fail(&self, report_id: &str, reason: &str) -> Result<ReportJob>;

    /// Newest jobs first, at most `limit`.
    fn list_recent(&self, limit: usize) -> Result<Vec<ReportJob>>;
}

// ---------------------------------------------------------------------------
// MemoryJobStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryInner {
    last_order: u64,
    jobs: HashMap<String, ReportJob>,
}

/// Process-local job store, for one-shot CLI runs and tests.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut MemoryInner) -> Result<T>) -> Result<T> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| UptimeError::JobStore("job store lock poisoned".into()))?;
        f(&mut guard)
    }

    fn update(
        &self,
        report_id: &str,
        f: impl FnOnce(&mut ReportJob) -> Result<()>,
    ) -> Result<ReportJob> {
        self.with_inner(|inner| {
            let job = inner
                .jobs
                .get_mut(report_id)
                .ok_or_else(|| UptimeError::ReportNotFound(report_id.to_string()))?;
            f(job)?;
            Ok(job.clone())
        })
    }
}

impl JobStore for MemoryJobStore {
    fn create(&self, report_id: &str) -> Result<ReportJob> {
        self.with_inner(|inner| {
            if inner.jobs.contains_key(report_id) {
                return Err(UptimeError::JobStore(format!(
                    "report already exists: {report_id}"
                )));
            }
            inner.last_order += 1;
            let job = ReportJob::new(report_id, inner.last_order);
            inner.jobs.insert(report_id.to_string(), job.clone());
            Ok(job)
        })
    }

    fn get(&self, report_id: &str) -> Result<Option<ReportJob>> {
        self.with_inner(|inner| Ok(inner.jobs.get(report_id).cloned()))
    }

    fn complete(&self, report_id: &str, output_path: &Path) -> Result<ReportJob> {
        self.update(report_id, |job| job.mark_complete(output_path))
    }

    fn fail(&self, report_id: &str, reason: &str) -> Result<ReportJob> {
        self.update(report_id, |job| job.mark_failed(reason))
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<ReportJob>> {
        self.with_inner(|inner| {
            let mut jobs: Vec<ReportJob> = inner.jobs.values().cloned().collect();
            jobs.sort_by(|a, b| b.created_order.cmp(&a.created_order));
            jobs.truncate(limit);
            Ok(jobs)
        })
    }
}
