//! Synthetic status feeds for local runs and demos.
//!
//! Each store gets a random walk over the week before `end`: a random
//! starting state, then polls 1 to 8 hours apart, each with a 20% chance of
//! flipping state. Output is `store_status.csv` in the loader's format.

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use tracing::info;

use crate::error::{Result, UptimeError};
use crate::record::{StatusObservation, StoreId};
use crate::types::Status;

/// Knobs for `simulate`.
#[derive(Debug, Clone, Copy)]
pub struct SimulationParams {
    pub end: DateTime<Utc>,
    pub lookback: TimeDelta,
    /// Inclusive bounds on polls per store.
    pub min_polls: u32,
    pub max_polls: u32,
    /// Gap between polls, in hours.
    pub min_gap_hours: f64,
    pub max_gap_hours: f64,
    pub flip_probability: f64,
}

impl SimulationParams {
    pub fn ending_at(end: DateTime<Utc>) -> Self {
        Self {
            end,
            lookback: TimeDelta::weeks(1),
            min_polls: 20,
            max_polls: 50,
            min_gap_hours: 1.0,
            max_gap_hours: 8.0,
            flip_probability: 0.2,
        }
    }
}

/// Generate observations for `store_ids`, sorted by timestamp then store.
///
/// Panics if a bound pair in `params` is empty or `flip_probability` is
/// outside `0..=1`.
pub fn simulate<R: Rng>(
    store_ids: &[StoreId],
    params: &SimulationParams,
    rng: &mut R,
) -> Vec<StatusObservation> {
    let start = params.end - params.lookback;
    let mut out = Vec::new();

    for store_id in store_ids {
        let mut at = start;
        let mut status = if rng.gen_bool(0.5) {
            Status::Active
        } else {
            Status::Inactive
        };
        let polls = rng.gen_range(params.min_polls..=params.max_polls);

        for _ in 0..polls {
            out.push(StatusObservation::new(store_id.clone(), at, status));

            let gap_hours = rng.gen_range(params.min_gap_hours..params.max_gap_hours);
            at += TimeDelta::microseconds((gap_hours * 3_600_000_000.0) as i64);
            if at > params.end {
                break;
            }
            if rng.gen_bool(params.flip_probability) {
                status = match status {
                    Status::Active => Status::Inactive,
                    Status::Inactive => Status::Active,
                };
            }
        }
    }

    out.sort_by(|a, b| {
        a.timestamp_utc
            .cmp(&b.timestamp_utc)
            .then_with(|| a.store_id.cmp(&b.store_id))
    });
    out
}

/// Render observations with the `store_id,status,timestamp_utc` header.
pub fn render_status_csv(observations: &[StatusObservation]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["store_id", "status", "timestamp_utc"])?;
    for obs in observations {
        let timestamp = obs
            .timestamp_utc
            .format("%Y-%m-%d %H:%M:%S%.6f UTC")
            .to_string();
        writer.write_record([obs.store_id.as_str(), obs.status.as_str(), timestamp.as_str()])?;
    }
    writer
        .into_inner()
        .map_err(|e| UptimeError::Io(e.into_error()))
}

pub fn write_status_csv(path: &Path, observations: &[StatusObservation]) -> Result<()> {
    let data = render_status_csv(observations)?;
    crate::io::atomic_write(path, &data)?;
    info!(path = %path.display(), observations = observations.len(), "status feed written");
    Ok(())
}
