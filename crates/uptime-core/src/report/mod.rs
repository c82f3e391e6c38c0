//! Report job lifecycle.
//!
//! Provides `ReportJob` and the `JobStore` seam, `ReportDb` (redb-backed
//! persistence), and `ReportService`, which submits, generates, and answers
//! polls for report jobs.

pub mod db;
pub mod job;
pub mod service;

pub use db::ReportDb;
pub use job::{generate_report_id, JobStore, MemoryJobStore, ReportJob};
pub use service::{
    dataset_now, Dispatch, Enqueue, ExecutionMode, NoQueue, ReportPoll, ReportService, Submission,
};
