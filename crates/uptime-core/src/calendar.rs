//! Business interval construction.
//!
//! Turns a store's weekly schedule into concrete, zone-aware intervals that
//! overlap a UTC range. Each rule yields at most one interval per calendar day,
//! clipped to the range.

use crate::error::{Result, UptimeError};
use crate::record::BusinessHoursRule;
use chrono::{
    DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

/// A span during which the store is nominally open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalInterval {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl LocalInterval {
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| UptimeError::UnknownTimezone(name.to_string()))
}

/// Build the business intervals of `rules` that overlap `[start, end]`.
///
/// With no rules at all the store is open around the clock and the whole
/// range comes back as a single interval.
pub fn business_intervals(
    rules: &[BusinessHoursRule],
    tz: Tz,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<LocalInterval> {
    let start_local = start.with_timezone(&tz);
    let end_local = end.with_timezone(&tz);

    if rules.is_empty() {
        return vec![LocalInterval {
            start: start_local,
            end: end_local,
        }];
    }

    let mut intervals = Vec::new();
    let last_day = end_local.date_naive();
    let mut day = start_local.date_naive();

    while day <= last_day {
        for rule in rules.iter().filter(|r| r.applies_to(day.weekday())) {
            let open = localize(&tz, day.and_time(rule.start_local));
            let close_day = if rule.is_overnight() {
                next_day(day)
            } else {
                day
            };
            let close = localize(&tz, close_day.and_time(rule.end_local));

            let clipped_start = open.max(start_local);
            let clipped_end = close.min(end_local);
            if clipped_start < clipped_end {
                intervals.push(LocalInterval {
                    start: clipped_start,
                    end: clipped_end,
                });
            }
        }
        day = next_day(day);
    }

    intervals
}

fn next_day(day: NaiveDate) -> NaiveDate {
    day.succ_opt().unwrap_or(NaiveDate::MAX)
}

/// Pin a wall-clock time to an instant in `tz`.
///
/// Ambiguous times (clocks falling back) take the earlier instant. Times that
/// fall in a spring-forward gap keep the offset in force before the jump, so
/// 02:30 in a one-hour gap lands at 03:30 on the new offset.
pub fn localize(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(a, b) => a.min(b),
        LocalResult::None => {
            let before = naive - TimeDelta::days(1);
            let offset_secs = tz
                .from_local_datetime(&before)
                .earliest()
                .map(|dt| dt.offset().fix().local_minus_utc())
                .unwrap_or(0);
            tz.from_utc_datetime(&(naive - TimeDelta::seconds(i64::from(offset_secs))))
        }
    }
}
