//! Goal progress
//!
//! Ratios of a day's intake and activity against the user's daily targets,
//! as shown by the dashboard rings and bars.

use chrono::NaiveDate;

use crate::store::LogProvider;
use crate::types::{DailyLog, GoalProgress, GoalSettings};

impl GoalProgress {
    /// Progress of a single log against `goals`
    pub fn for_log(log: &DailyLog, goals: &GoalSettings) -> Self {
        Self {
            date: log.date,
            calories: ratio(log.calories, goals.calories),
            protein: ratio(log.protein, goals.protein),
            carbs: ratio(log.carbs, goals.carbs),
            fat: ratio(log.fat, goals.fat),
            water: ratio(log.water, goals.water),
            steps: ratio(log.steps, goals.steps),
        }
    }

    /// Progress for `date`, or `None` when nothing was logged that day
    pub fn for_date(
        provider: &dyn LogProvider,
        date: NaiveDate,
        goals: &GoalSettings,
    ) -> Option<Self> {
        provider
            .log_for_date(date)
            .map(|log| Self::for_log(&log, goals))
    }
}

/// value / goal clamped to [0, 1]; non-positive goals give 0
fn ratio(value: f64, goal: f64) -> f64 {
    if goal > 0.0 && value.is_finite() {
        (value / goal).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LogStore;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 14).unwrap()
    }

    #[test]
    fn test_progress_ratios() {
        let log = DailyLog {
            calories: 1500.0,
            protein: 200.0,
            carbs: 110.0,
            fat: 35.0,
            water: 1.5,
            steps: 2500.0,
            ..DailyLog::empty(day())
        };

        let progress = GoalProgress::for_log(&log, &GoalSettings::default());

        assert!((progress.calories - 0.75).abs() < 1e-9);
        assert_eq!(progress.protein, 1.0);
        assert!((progress.carbs - 0.5).abs() < 1e-9);
        assert!((progress.fat - 0.5).abs() < 1e-9);
        assert!((progress.water - 0.5).abs() < 1e-9);
        assert!((progress.steps - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_zero_goal_gives_zero_progress() {
        let log = DailyLog {
            calories: 1500.0,
            ..DailyLog::empty(day())
        };
        let goals = GoalSettings {
            calories: 0.0,
            ..GoalSettings::default()
        };

        let progress = GoalProgress::for_log(&log, &goals);
        assert_eq!(progress.calories, 0.0);
    }

    #[test]
    fn test_for_date_without_log() {
        let mut store = LogStore::new();
        assert!(GoalProgress::for_date(&store, day(), &GoalSettings::default()).is_none());

        store.upsert(DailyLog {
            steps: 10000.0,
            ..DailyLog::empty(day())
        });
        let progress = GoalProgress::for_date(&store, day(), &GoalSettings::default()).unwrap();
        assert_eq!(progress.steps, 1.0);
    }
}
