//! Persistent storage for report jobs using redb.
//!
//! # Table design
//!
//! `REPORTS` maps `report_id` to the JSON-encoded `ReportJob`. `META` holds
//! the `next_order` counter so `created_order` survives restarts. Every
//! mutation reads and writes inside a single write transaction, so a
//! transition check and its update cannot interleave with another writer.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};
use tracing::warn;

use crate::error::{Result, UptimeError};
use crate::types::ReportStatus;

use super::job::{JobStore, ReportJob};

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

/// Key: report_id. Value: JSON-encoded ReportJob.
const REPORTS: TableDefinition<&str, &[u8]> = TableDefinition::new("reports");

const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const NEXT_ORDER: &str = "next_order";

fn db_err(e: impl std::fmt::Display) -> UptimeError {
    UptimeError::JobStore(e.to_string())
}

// ---------------------------------------------------------------------------
// ReportDb
// ---------------------------------------------------------------------------

/// Persistent store for `ReportJob` records.
pub struct ReportDb {
    db: Database,
}

impl ReportDb {
    /// Open or create the redb database at `path`, creating parent
    /// directories and both tables as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(db_err)?;
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(REPORTS).map_err(db_err)?;
        wt.open_table(META).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        Ok(Self { db })
    }

    /// Apply `f` to the stored job and write it back in one transaction.
    fn update(
        &self,
        report_id: &str,
        f: impl FnOnce(&mut ReportJob) -> Result<()>,
    ) -> Result<ReportJob> {
        let wt = self.db.begin_write().map_err(db_err)?;
        let job = {
            let mut table = wt.open_table(REPORTS).map_err(db_err)?;
            let stored = table
                .get(report_id)
                .map_err(db_err)?
                .map(|guard| guard.value().to_vec())
                .ok_or_else(|| UptimeError::ReportNotFound(report_id.to_string()))?;
            let mut job: ReportJob = serde_json::from_slice(&stored)?;
            f(&mut job)?;
            let value = serde_json::to_vec(&job)?;
            table
                .insert(report_id, value.as_slice())
                .map_err(db_err)?;
            job
        };
        wt.commit().map_err(db_err)?;
        Ok(job)
    }

    /// All jobs, newest first.
    pub fn list_all(&self) -> Result<Vec<ReportJob>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(REPORTS).map_err(db_err)?;

        let mut result = Vec::new();
        for entry in table.iter().map_err(db_err)? {
            let (_, v) = entry.map_err(db_err)?;
            let job: ReportJob = serde_json::from_slice(v.value())?;
            result.push(job);
        }
        result.sort_by(|a, b| b.created_order.cmp(&a.created_order));
        Ok(result)
    }

    /// On server startup, fail every `Running` job. The worker queue lives in
    /// process memory, so nothing left from a previous run will dequeue them.
    /// Returns the number of jobs recovered.
    pub fn startup_recovery(&self) -> Result<u32> {
        let mut count = 0u32;
        for job in self.list_all()? {
            if job.status == ReportStatus::Running {
                self.update(&job.report_id, |j| j.mark_failed("recovered from restart"))?;
                warn!(report_id = %job.report_id, "orphaned running report marked failed");
                count += 1;
            }
        }
        Ok(count)
    }
}

impl JobStore for ReportDb {
    fn create(&self, report_id: &str) -> Result<ReportJob> {
        let wt = self.db.begin_write().map_err(db_err)?;
        let job = {
            let mut meta = wt.open_table(META).map_err(db_err)?;
            let order = meta
                .get(NEXT_ORDER)
                .map_err(db_err)?
                .map(|guard| guard.value())
                .unwrap_or(1);
            meta.insert(NEXT_ORDER, order + 1).map_err(db_err)?;

            let mut table = wt.open_table(REPORTS).map_err(db_err)?;
            if table.get(report_id).map_err(db_err)?.is_some() {
                return Err(UptimeError::JobStore(format!(
                    "report already exists: {report_id}"
                )));
            }
            let job = ReportJob::new(report_id, order);
            let value = serde_json::to_vec(&job)?;
            table
                .insert(report_id, value.as_slice())
                .map_err(db_err)?;
            job
        };
        wt.commit().map_err(db_err)?;
        Ok(job)
    }

    fn get(&self, report_id: &str) -> Result<Option<ReportJob>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(REPORTS).map_err(db_err)?;
        match table.get(report_id).map_err(db_err)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    fn complete(&self, report_id: &str, output_path: &Path) -> Result<ReportJob> {
        self.update(report_id, |job| job.mark_complete(output_path))
    }

    fn fail(&self, report_id: &str, reason: &str) -> Result<ReportJob> {
        self.update(report_id, |job| job.mark_failed(reason))
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<ReportJob>> {
        let mut jobs = self.list_all()?;
        jobs.truncate(limit);
        Ok(jobs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
