//! Flat-file ingestion into a `Dataset`.
//!
//! Each row goes through a fallible parse step. Bad rows are skipped and
//! collected in the `LoadReport`; only unreadable files abort the load.

use crate::error::{Result, UptimeError};
use crate::paths;
use crate::provider::Dataset;
use crate::record::{BusinessHoursRule, StatusObservation, StoreTimezone};
use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// LoadReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub file: String,
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    pub observations: usize,
    pub rules: usize,
    pub timezones: usize,
    pub missing_files: Vec<String>,
    pub errors: Vec<RowError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.missing_files.is_empty() && self.errors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StatusRow {
    store_id: String,
    status: String,
    timestamp_utc: String,
}

#[derive(Debug, Deserialize)]
struct HoursRow {
    store_id: String,
    #[serde(rename = "dayOfWeek")]
    day_of_week: String,
    start_time_local: String,
    end_time_local: String,
}

#[derive(Debug, Deserialize)]
struct TimezoneRow {
    store_id: String,
    timezone_str: String,
}

fn parse_status_row(row: StatusRow) -> Result<StatusObservation> {
    Ok(StatusObservation {
        store_id: row.store_id.trim().to_string(),
        timestamp_utc: parse_timestamp(&row.timestamp_utc)?,
        status: row.status.parse()?,
    })
}

fn parse_hours_row(row: HoursRow) -> Result<BusinessHoursRule> {
    let day: i64 = row
        .day_of_week
        .trim()
        .parse()
        .map_err(|_| UptimeError::InvalidDayOfWeek(row.day_of_week.clone()))?;
    BusinessHoursRule::new(
        row.store_id.trim(),
        day,
        parse_time_of_day(&row.start_time_local)?,
        parse_time_of_day(&row.end_time_local)?,
    )
}

fn parse_timezone_row(row: TimezoneRow) -> Result<StoreTimezone> {
    Ok(StoreTimezone {
        store_id: row.store_id.trim().to_string(),
        tz_name: row.timezone_str.trim().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// Parse a UTC timestamp such as `2023-01-25 12:05:19.846849 UTC` or
/// `2023-01-25T12:05:19Z`. Explicit offsets are converted to UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let s = raw.trim();
    let bare = s
        .strip_suffix(" UTC")
        .or_else(|| s.strip_suffix('Z'))
        .unwrap_or(s);
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(bare, fmt) {
            return Ok(naive.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| UptimeError::InvalidTimestamp(raw.to_string()))
}

/// Parse a local time of day: `09:00:00`, `09:00`, `09:00:00 AM`, `9:00 PM`.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime> {
    let s = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| UptimeError::InvalidTimeOfDay(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load all three tables from `dir`.
pub fn load_dir(dir: &Path) -> Result<(Dataset, LoadReport)> {
    let mut report = LoadReport::default();

    let observations = read_table(
        &dir.join(paths::STORE_STATUS_CSV),
        parse_status_row,
        &mut report,
    )?;
    let rules = read_table(&dir.join(paths::MENU_HOURS_CSV), parse_hours_row, &mut report)?;
    let timezones = read_table(
        &dir.join(paths::TIMEZONE_CSV),
        parse_timezone_row,
        &mut report,
    )?;

    report.observations = observations.len();
    report.rules = rules.len();
    report.timezones = timezones.len();
    info!(
        observations = report.observations,
        rules = report.rules,
        timezones = report.timezones,
        rejected = report.errors.len(),
        dir = %dir.display(),
        "dataset loaded"
    );

    Ok((Dataset::new(observations, rules, timezones), report))
}

fn read_table<R, T>(
    path: &Path,
    parse: fn(R) -> Result<T>,
    report: &mut LoadReport,
) -> Result<Vec<T>>
where
    R: DeserializeOwned,
{
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if !path.exists() {
        warn!(path = %path.display(), "data file not found, table left empty");
        report.missing_files.push(file);
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    let rejected_before = report.errors.len();

    let mut out = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                report.errors.push(RowError {
                    file: file.clone(),
                    line,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let parsed = record
            .deserialize::<R>(Some(&headers))
            .map_err(UptimeError::from)
            .and_then(parse);
        match parsed {
            Ok(value) => out.push(value),
            Err(e) => report.errors.push(RowError {
                file: file.clone(),
                line,
                reason: e.to_string(),
            }),
        }
    }

    let rejected = report.errors.len() - rejected_before;
    if rejected > 0 {
        warn!(file = %file, rejected, "rows rejected during load");
    }
    Ok(out)
}
