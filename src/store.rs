//! Local log store
//!
//! In-memory mirror of the remote `daily_logs` table, persisted as JSON by the
//! host for offline use. The analytics read immutable snapshots taken from it
//! through [`LogProvider`]; they never hold a reference to the store itself.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::types::{DailyLog, GoalSettings, LogCollection, UnitPreference, UserSettings};

/// Cache format version written into persisted stores
pub const CACHE_VERSION: &str = "v1";

/// Source of a user's daily logs
pub trait LogProvider {
    /// All logs, sorted ascending by date
    fn all_logs(&self) -> Vec<DailyLog>;

    /// The log recorded for `date`, if any
    fn log_for_date(&self, date: NaiveDate) -> Option<DailyLog>;

    /// Snapshot keyed by date
    fn collection(&self) -> LogCollection {
        self.all_logs().into_iter().map(|log| (log.date, log)).collect()
    }
}

/// Source of the user's unit preferences and goals
pub trait SettingsProvider {
    fn unit_preference(&self) -> UnitPreference;

    fn goals(&self) -> GoalSettings;
}

impl SettingsProvider for UserSettings {
    fn unit_preference(&self) -> UnitPreference {
        self.units
    }

    fn goals(&self) -> GoalSettings {
        self.goals.clone()
    }
}

/// Offline cache of daily logs, at most one per date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogStore {
    cache_version: String,
    logs: LogCollection,
    #[serde(default)]
    last_synced_at: Option<DateTime<Utc>>,
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStore {
    pub fn new() -> Self {
        Self {
            cache_version: CACHE_VERSION.to_string(),
            logs: LogCollection::new(),
            last_synced_at: None,
        }
    }

    /// Insert or fully replace the log for its date.
    ///
    /// Logs created offline have no remote id yet; they get a local one.
    pub fn upsert(&mut self, mut log: DailyLog) -> Option<DailyLog> {
        if log.id.is_none() {
            log.id = Some(Uuid::new_v4());
        }
        debug!(date = %log.date, "upserting daily log");
        self.logs.insert(log.date, log)
    }

    /// Delete the log for `date`, returning it if it existed
    pub fn remove(&mut self, date: NaiveDate) -> Option<DailyLog> {
        self.logs.remove(&date)
    }

    /// Replace the whole store with a freshly fetched list.
    ///
    /// When the list has several logs for one date the last one wins.
    pub fn hydrate(&mut self, logs: Vec<DailyLog>) {
        self.logs = logs.into_iter().map(|log| (log.date, log)).collect();
        debug!(count = self.logs.len(), "hydrated log store");
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    pub fn mark_synced(&mut self, at: DateTime<Utc>) {
        self.last_synced_at = Some(at);
    }

    /// Borrow the underlying collection without cloning
    pub fn as_collection(&self) -> &LogCollection {
        &self.logs
    }

    /// Load a store from JSON, discarding caches written by another version
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let store: Self = serde_json::from_str(json)?;
        Ok(store.checked())
    }

    /// Replace a store written under another cache version with an empty one
    pub(crate) fn checked(self) -> Self {
        if self.cache_version != CACHE_VERSION {
            debug!(found = %self.cache_version, "discarding stale log cache");
            return Self::new();
        }
        self
    }

    /// Serialize the store to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl LogProvider for LogStore {
    fn all_logs(&self) -> Vec<DailyLog> {
        self.logs.values().cloned().collect()
    }

    fn log_for_date(&self, date: NaiveDate) -> Option<DailyLog> {
        self.logs.get(&date).cloned()
    }

    fn collection(&self) -> LogCollection {
        self.logs.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn make_log(day: u32, calories: f64) -> DailyLog {
        DailyLog {
            calories,
            ..DailyLog::empty(date(day))
        }
    }

    #[test]
    fn test_upsert_replaces_in_full() {
        let mut store = LogStore::new();
        let mut first = make_log(3, 1800.0);
        first.protein = 120.0;
        assert!(store.upsert(first).is_none());

        let replaced = store.upsert(make_log(3, 2100.0));
        assert_eq!(replaced.unwrap().protein, 120.0);

        let current = store.log_for_date(date(3)).unwrap();
        assert_eq!(current.calories, 2100.0);
        assert_eq!(current.protein, 0.0);
        assert!(current.id.is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_upsert_keeps_remote_id() {
        let mut store = LogStore::new();
        let id = Uuid::new_v4();
        let mut log = make_log(1, 2000.0);
        log.id = Some(id);
        store.upsert(log);
        assert_eq!(store.log_for_date(date(1)).unwrap().id, Some(id));
    }

    #[test]
    fn test_remove() {
        let mut store = LogStore::new();
        store.upsert(make_log(1, 2000.0));
        assert!(store.remove(date(1)).is_some());
        assert!(store.remove(date(1)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_hydrate_sorts_and_dedups() {
        let mut store = LogStore::new();
        store.upsert(make_log(20, 1000.0));
        store.hydrate(vec![make_log(9, 2200.0), make_log(2, 1900.0), make_log(9, 2300.0)]);

        let logs = store.all_logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].date, date(2));
        assert_eq!(logs[1].calories, 2300.0);
        assert!(store.log_for_date(date(20)).is_none());
    }

    #[test]
    fn test_serialization() {
        let mut store = LogStore::new();
        store.upsert(make_log(4, 2050.0));
        let synced = Utc::now();
        store.mark_synced(synced);

        let json = store.to_json().unwrap();
        let loaded = LogStore::from_json(&json).unwrap();

        assert_eq!(loaded.all_logs(), store.all_logs());
        assert_eq!(loaded.last_synced_at(), Some(synced));
    }

    #[test]
    fn test_stale_cache_version_is_discarded() {
        let json = r#"{"cache_version":"v0","logs":{"2024-06-01":{"date":"2024-06-01","calories":2000}}}"#;
        let loaded = LogStore::from_json(json).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_settings_provider() {
        let settings = UserSettings::default();
        assert_eq!(settings.goals().calories, 2000.0);
        assert_eq!(settings.unit_preference(), UnitPreference::default());
    }
}
