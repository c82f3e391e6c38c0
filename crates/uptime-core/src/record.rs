use crate::error::{Result, UptimeError};
use crate::types::Status;
use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

pub type StoreId = String;

/// A single poll result for a store. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusObservation {
    pub store_id: StoreId,
    pub timestamp_utc: DateTime<Utc>,
    pub status: Status,
}

impl StatusObservation {
    pub fn new(store_id: impl Into<StoreId>, timestamp_utc: DateTime<Utc>, status: Status) -> Self {
        Self {
            store_id: store_id.into(),
            timestamp_utc,
            status,
        }
    }
}

/// One weekly open-hours window, in the store's local time.
///
/// `day_of_week` is 0 for Monday through 6 for Sunday. When `end_local` is
/// earlier than `start_local` the window runs past midnight into the next day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHoursRule {
    pub store_id: StoreId,
    pub day_of_week: u8,
    pub start_local: NaiveTime,
    pub end_local: NaiveTime,
}

impl BusinessHoursRule {
    pub fn new(
        store_id: impl Into<StoreId>,
        day_of_week: i64,
        start_local: NaiveTime,
        end_local: NaiveTime,
    ) -> Result<Self> {
        if !(0..=6).contains(&day_of_week) {
            return Err(UptimeError::InvalidDayOfWeek(day_of_week.to_string()));
        }
        Ok(Self {
            store_id: store_id.into(),
            day_of_week: day_of_week as u8,
            start_local,
            end_local,
        })
    }

    pub fn is_overnight(&self) -> bool {
        self.end_local < self.start_local
    }

    pub fn applies_to(&self, weekday: Weekday) -> bool {
        u32::from(self.day_of_week) == weekday.num_days_from_monday()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTimezone {
    pub store_id: StoreId,
    pub tz_name: String,
}
