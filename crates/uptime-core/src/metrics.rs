//! Per-store uptime/downtime over the trailing hour, day, and week.

use crate::calendar::{business_intervals, parse_timezone};
use crate::error::Result;
use crate::interpolate::{interpolate, Span};
use crate::provider::DataProvider;
use crate::record::{BusinessHoursRule, StatusObservation, StoreId};
use crate::types::Window;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One report row. Hour figures are minutes, day and week figures are hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMetrics {
    pub store_id: StoreId,
    pub uptime_last_hour: f64,
    pub uptime_last_day: f64,
    pub uptime_last_week: f64,
    pub downtime_last_hour: f64,
    pub downtime_last_day: f64,
    pub downtime_last_week: f64,
}

impl StoreMetrics {
    /// Placeholder row for a store whose computation failed.
    pub fn zeroed(store_id: impl Into<StoreId>) -> Self {
        Self {
            store_id: store_id.into(),
            uptime_last_hour: 0.0,
            uptime_last_day: 0.0,
            uptime_last_week: 0.0,
            downtime_last_hour: 0.0,
            downtime_last_day: 0.0,
            downtime_last_week: 0.0,
        }
    }

    fn set(&mut self, window: Window, span: Span) {
        let unit = window.unit();
        let up = round2(unit.from_span(span.uptime));
        let down = round2(unit.from_span(span.downtime));
        match window {
            Window::LastHour => {
                self.uptime_last_hour = up;
                self.downtime_last_hour = down;
            }
            Window::LastDay => {
                self.uptime_last_day = up;
                self.downtime_last_day = down;
            }
            Window::LastWeek => {
                self.uptime_last_week = up;
                self.downtime_last_week = down;
            }
        }
    }
}

/// Round to two decimals, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

pub struct Aggregator<'a> {
    provider: &'a dyn DataProvider,
    default_tz: Tz,
}

impl<'a> Aggregator<'a> {
    pub fn new(provider: &'a dyn DataProvider, default_tz: Tz) -> Self {
        Self {
            provider,
            default_tz,
        }
    }

    /// Metrics for every known store, in the provider's enumeration order.
    ///
    /// A store that fails is reported as all zeros; only a failure to
    /// enumerate stores aborts the run.
    pub fn compute(&self, now: DateTime<Utc>) -> Result<Vec<StoreMetrics>> {
        let store_ids = self.provider.list_store_ids()?;
        info!(stores = store_ids.len(), %now, "computing store metrics");

        let mut rows = Vec::with_capacity(store_ids.len());
        for store_id in store_ids {
            match self.store_metrics(&store_id, now) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!(
                        store_id = %store_id,
                        error = %e,
                        "store metrics failed, reporting zeros"
                    );
                    rows.push(StoreMetrics::zeroed(store_id));
                }
            }
            if rows.len() % 100 == 0 {
                info!(processed = rows.len(), "store metrics progress");
            }
        }
        Ok(rows)
    }

    pub fn store_metrics(&self, store_id: &str, now: DateTime<Utc>) -> Result<StoreMetrics> {
        let tz = match self.provider.timezone(store_id)? {
            Some(name) => parse_timezone(&name)?,
            None => self.default_tz,
        };
        let rules = self.provider.business_hours(store_id)?;

        let week_ago = now - Window::LastWeek.lookback();
        let mut observations = self.provider.observations(store_id, week_ago, now)?;
        observations.sort_by_key(|o| o.timestamp_utc);
        debug!(
            store_id,
            observations = observations.len(),
            rules = rules.len(),
            %tz,
            "scoring store"
        );

        let mut row = StoreMetrics::zeroed(store_id);
        for &window in Window::all() {
            let span = window_span(&observations, &rules, tz, now - window.lookback(), now);
            row.set(window, span);
        }
        Ok(row)
    }
}

/// Uptime and downtime inside business hours for `[start, end]`.
///
/// A window with no observations at all contributes nothing, whatever the
/// schedule says.
pub fn window_span(
    observations: &[StatusObservation],
    rules: &[BusinessHoursRule],
    tz: Tz,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Span {
    let in_window: Vec<StatusObservation> = observations
        .iter()
        .filter(|o| start <= o.timestamp_utc && o.timestamp_utc <= end)
        .cloned()
        .collect();
    if in_window.is_empty() {
        return Span::default();
    }

    let mut total = Span::default();
    for interval in business_intervals(rules, tz, start, end) {
        total += interpolate(&in_window, interval.start_utc(), interval.end_utc());
    }
    total
}
