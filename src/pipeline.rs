//! Pipeline orchestration
//!
//! This module provides the JSON-facing API used by host bindings, and a
//! stateful processor that owns the offline log store and user settings.

use chrono::NaiveDate;

use crate::error::ComputeError;
use crate::schema::LogAdapter;
use crate::series::build_series_at;
use crate::store::{LogProvider, LogStore, SettingsProvider};
use crate::tdee::estimate_tdee;
use crate::types::{
    DailyLog, GoalProgress, SeriesResult, SeriesWindow, TdeeResult, TdeeWindow, UserSettings,
    WeightUnit,
};

/// Build the analytics series from a JSON array of daily logs.
///
/// # Arguments
/// * `logs_json` - JSON array of daily logs in the client's shape
/// * `window_days` - 7, 14 or 30
/// * `today` - date used when there are no logs
///
/// # Returns
/// The series result serialized as JSON
pub fn series_from_json(
    logs_json: &str,
    window_days: u32,
    today: NaiveDate,
) -> Result<String, ComputeError> {
    let window = SeriesWindow::try_from(window_days)?;
    let logs = LogAdapter::to_collection(LogAdapter::parse_array(logs_json)?);
    let result = build_series_at(&logs, window, today);
    Ok(serde_json::to_string(&result)?)
}

/// Estimate TDEE from a JSON array of daily logs.
///
/// # Arguments
/// * `logs_json` - JSON array of daily logs, any order
/// * `window_days` - 14, 21 or 30
/// * `weight_unit` - "kg" or "lbs"
///
/// # Example
/// ```ignore
/// let result = tdee_from_json(logs_json, 14, "kg")?;
/// ```
pub fn tdee_from_json(
    logs_json: &str,
    window_days: u32,
    weight_unit: &str,
) -> Result<String, ComputeError> {
    let window = TdeeWindow::try_from(window_days)?;
    let unit: WeightUnit = weight_unit.parse()?;
    let logs = LogAdapter::parse_array(logs_json)?;
    let result = estimate_tdee(&logs, window, unit);
    Ok(serde_json::to_string(&result)?)
}

/// Persisted processor state
#[derive(serde::Serialize, serde::Deserialize)]
struct ProcessorState {
    store: LogStore,
    settings: UserSettings,
}

/// Stateful processor holding the offline store and settings.
///
/// Every read takes a fresh snapshot of the store, so results always reflect
/// the latest upserts.
#[derive(Default)]
pub struct PulseProcessor {
    store: LogStore,
    settings: UserSettings,
}

impl PulseProcessor {
    /// Create a processor with an empty store and default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: UserSettings) -> Self {
        Self {
            store: LogStore::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: UserSettings) {
        self.settings = settings;
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    /// Validate and store a log, replacing any log for the same date
    pub fn upsert_log(&mut self, log: DailyLog) -> Result<(), ComputeError> {
        log.validate()?;
        self.store.upsert(log);
        Ok(())
    }

    pub fn remove_log(&mut self, date: NaiveDate) -> Option<DailyLog> {
        self.store.remove(date)
    }

    /// Replace the store contents with a freshly fetched list
    pub fn hydrate(&mut self, logs: Vec<DailyLog>) {
        self.store.hydrate(logs);
    }

    pub fn series(&self, window: SeriesWindow, today: NaiveDate) -> SeriesResult {
        build_series_at(self.store.as_collection(), window, today)
    }

    /// Estimate TDEE in the user's configured weight unit
    pub fn tdee(&self, window: TdeeWindow) -> TdeeResult {
        let logs = self.store.all_logs();
        estimate_tdee(&logs, window, self.settings.unit_preference().weight)
    }

    pub fn progress_for(&self, date: NaiveDate) -> Option<GoalProgress> {
        GoalProgress::for_date(&self.store, date, &self.settings.goals())
    }

    /// Load store and settings from JSON
    pub fn load_state(&mut self, json: &str) -> Result<(), ComputeError> {
        let state: ProcessorState =
            serde_json::from_str(json).map_err(|e| ComputeError::ParseError(e.to_string()))?;
        self.store = state.store.checked();
        self.settings = state.settings;
        Ok(())
    }

    /// Save store and settings to JSON
    pub fn save_state(&self) -> Result<String, ComputeError> {
        let state = ProcessorState {
            store: self.store.clone(),
            settings: self.settings.clone(),
        };
        serde_json::to_string(&state).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}
