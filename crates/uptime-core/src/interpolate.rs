//! Step-function interpolation of sparse status observations.
//!
//! A status holds until the next observation supersedes it. The first
//! observation's status is extended back to the interval start and the last
//! one forward to the interval end. Arithmetic is done on `TimeDelta` so the
//! two halves always sum to the interval length.

use crate::record::StatusObservation;
use chrono::{DateTime, TimeDelta, Utc};

/// Uptime/downtime split of one interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub uptime: TimeDelta,
    pub downtime: TimeDelta,
}

impl Span {
    pub fn total(&self) -> TimeDelta {
        self.uptime + self.downtime
    }
}

impl std::ops::AddAssign for Span {
    fn add_assign(&mut self, rhs: Self) {
        self.uptime += rhs.uptime;
        self.downtime += rhs.downtime;
    }
}

/// Score `[start, end]` against `observations`.
///
/// Observations outside the interval (boundaries included) are ignored. With
/// nothing inside the interval the result is zero on both sides rather than
/// all downtime.
pub fn interpolate(
    observations: &[StatusObservation],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Span {
    let mut inside: Vec<&StatusObservation> = observations
        .iter()
        .filter(|o| start <= o.timestamp_utc && o.timestamp_utc <= end)
        .collect();
    if inside.is_empty() {
        return Span::default();
    }
    inside.sort_by_key(|o| o.timestamp_utc);

    let mut uptime = TimeDelta::zero();

    let first = inside[0];
    if first.status.is_active() {
        uptime += first.timestamp_utc - start;
    }

    for pair in inside.windows(2) {
        if pair[0].status.is_active() {
            uptime += pair[1].timestamp_utc - pair[0].timestamp_utc;
        }
    }

    let last = inside[inside.len() - 1];
    if last.status.is_active() {
        uptime += end - last.timestamp_utc;
    }

    Span {
        uptime,
        downtime: (end - start) - uptime,
    }
}
