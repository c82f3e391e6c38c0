//! Read-only access to observations, schedules, and timezone assignments.
//!
//! The engine only ever talks to `DataProvider`; `Dataset` is the in-memory
//! implementation the loader builds from flat files.

use crate::error::Result;
use crate::record::{BusinessHoursRule, StatusObservation, StoreId, StoreTimezone};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub trait DataProvider: Send + Sync {
    /// Every store with at least one observation, in ascending id order.
    fn list_store_ids(&self) -> Result<Vec<StoreId>>;

    /// Observations for `store_id` with `start <= timestamp <= end`. Order is unspecified.
    fn observations(
        &self,
        store_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StatusObservation>>;

    /// Weekly schedule rules. An empty list means the store never closes.
    fn business_hours(&self, store_id: &str) -> Result<Vec<BusinessHoursRule>>;

    fn timezone(&self, store_id: &str) -> Result<Option<String>>;

    /// Latest observation timestamp across all stores.
    fn max_observation_timestamp(&self) -> Result<Option<DateTime<Utc>>>;
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    observations: BTreeMap<StoreId, Vec<StatusObservation>>,
    rules: HashMap<StoreId, Vec<BusinessHoursRule>>,
    timezones: HashMap<StoreId, String>,
}

impl Dataset {
    pub fn new(
        observations: Vec<StatusObservation>,
        rules: Vec<BusinessHoursRule>,
        timezones: Vec<StoreTimezone>,
    ) -> Self {
        let mut by_store: BTreeMap<StoreId, Vec<StatusObservation>> = BTreeMap::new();
        for obs in observations {
            by_store.entry(obs.store_id.clone()).or_default().push(obs);
        }
        for list in by_store.values_mut() {
            list.sort_by_key(|o| o.timestamp_utc);
        }

        let mut rules_by_store: HashMap<StoreId, Vec<BusinessHoursRule>> = HashMap::new();
        for rule in rules {
            rules_by_store
                .entry(rule.store_id.clone())
                .or_default()
                .push(rule);
        }

        // First assignment wins when a store is listed twice.
        let mut tz_by_store = HashMap::new();
        for tz in timezones {
            tz_by_store.entry(tz.store_id).or_insert(tz.tz_name);
        }

        Self {
            observations: by_store,
            rules: rules_by_store,
            timezones: tz_by_store,
        }
    }

    pub fn store_count(&self) -> usize {
        self.observations.len()
    }

    /// Stores named by a schedule rule or a timezone assignment, ascending.
    pub fn scheduled_store_ids(&self) -> Vec<StoreId> {
        let ids: BTreeSet<&StoreId> = self.rules.keys().chain(self.timezones.keys()).collect();
        ids.into_iter().cloned().collect()
    }
}

impl DataProvider for Dataset {
    fn list_store_ids(&self) -> Result<Vec<StoreId>> {
        Ok(self.observations.keys().cloned().collect())
    }

    fn observations(
        &self,
        store_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StatusObservation>> {
        let Some(list) = self.observations.get(store_id) else {
            return Ok(Vec::new());
        };
        Ok(list
            .iter()
            .filter(|o| start <= o.timestamp_utc && o.timestamp_utc <= end)
            .cloned()
            .collect())
    }

    fn business_hours(&self, store_id: &str) -> Result<Vec<BusinessHoursRule>> {
        Ok(self.rules.get(store_id).cloned().unwrap_or_default())
    }

    fn timezone(&self, store_id: &str) -> Result<Option<String>> {
        Ok(self.timezones.get(store_id).cloned())
    }

    fn max_observation_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .observations
            .values()
            .filter_map(|list| list.last())
            .map(|o| o.timestamp_utc)
            .max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 24, h, 0, 0).unwrap()
    }

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                StatusObservation::new("b", at(5), Status::Active),
                StatusObservation::new("a", at(9), Status::Inactive),
                StatusObservation::new("a", at(3), Status::Active),
            ],
            vec![],
            vec![
                StoreTimezone {
                    store_id: "a".into(),
                    tz_name: "Asia/Tokyo".into(),
                },
                StoreTimezone {
                    store_id: "a".into(),
                    tz_name: "Europe/Paris".into(),
                },
            ],
        )
    }

    #[test]
    fn stores_enumerated_in_id_order() {
        assert_eq!(sample().list_store_ids().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn observation_range_is_inclusive() {
        let ds = sample();
        let obs = ds.observations("a", at(3), at(9)).unwrap();
        assert_eq!(obs.len(), 2);
        let obs = ds.observations("a", at(4), at(9)).unwrap();
        assert_eq!(obs.len(), 1);
        assert!(ds.observations("zzz", at(0), at(23)).unwrap().is_empty());
    }

    #[test]
    fn max_timestamp_spans_all_stores() {
        assert_eq!(sample().max_observation_timestamp().unwrap(), Some(at(9)));
        assert_eq!(Dataset::default().max_observation_timestamp().unwrap(), None);
    }

    #[test]
    fn first_timezone_assignment_wins() {
        let ds = sample();
        assert_eq!(ds.timezone("a").unwrap().as_deref(), Some("Asia/Tokyo"));
        assert_eq!(ds.timezone("b").unwrap(), None);
    }

    #[test]
    fn scheduled_ids_merge_rules_and_timezones() {
        let rule = BusinessHoursRule::new(
            "c",
            0,
            chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        )
        .unwrap();
        let ds = Dataset::new(
            vec![],
            vec![rule],
            vec![StoreTimezone {
                store_id: "a".into(),
                tz_name: "Asia/Tokyo".into(),
            }],
        );
        assert_eq!(ds.scheduled_store_ids(), vec!["a", "c"]);
        assert_eq!(ds.store_count(), 0);
    }
}
