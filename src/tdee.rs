//! TDEE (Total Daily Energy Expenditure) estimation from intake and weight change.
//!
//! Energy balance over the trailing window of logged observations:
//!
//! ```text
//! tdee = average_calories + (weight_change_kg * KCAL_PER_KG) / effective_window
//! ```
//!
//! The window never reaches further back than the logged history: when the
//! history spans fewer calendar days than requested, the window shrinks to
//! that span instead of failing.

use tracing::{debug, warn};

use crate::types::{DailyLog, TdeeResult, TdeeWindow, WeightUnit};

// === Constants ===

/// Energy density of body mass (kcal per kg).
///
/// Changing this shifts every historical estimate.
pub const KCAL_PER_KG: f64 = 7700.0;

/// Pounds per kilogram.
pub const LBS_PER_KG: f64 = 2.20462;

/// Observations required before an estimate is flagged as valid.
pub const MIN_VALID_OBSERVATIONS: usize = 7;

/// Estimates maintenance calories from the trailing window of logs.
///
/// `logs` is the sparse list of recorded days in any order. Weights are read
/// in `weight_unit` and converted to kilograms before applying
/// [`KCAL_PER_KG`]. The returned `weight_change` stays in `weight_unit`.
pub fn estimate_tdee(logs: &[DailyLog], window: TdeeWindow, weight_unit: WeightUnit) -> TdeeResult {
    if logs.is_empty() {
        return TdeeResult {
            tdee: 0,
            average_calories: 0,
            weight_change: 0.0,
            weight_unit,
            requested_window: window,
            effective_window: window.days(),
            period_label: period_label(window.days()),
            valid: false,
            deficit: 0,
            surplus: 0,
        };
    }

    let mut sorted: Vec<&DailyLog> = logs.iter().collect();
    sorted.sort_by_key(|log| log.date);

    let first = sorted[0].date;
    let last = sorted[sorted.len() - 1].date;
    let span_days = (last - first).num_days() + 1;
    let effective_window = i64::from(window.days()).min(span_days) as u32;

    // Trailing observations by count, not by calendar day
    let take = (effective_window as usize).min(sorted.len());
    let slice = &sorted[sorted.len() - take..];

    let total_calories: f64 = slice.iter().map(|log| log.calories).sum();
    let average_calories = total_calories / slice.len() as f64;

    let weight_change = match (slice.first(), slice.last()) {
        (Some(a), Some(b)) if slice.len() >= 2 => b.weight - a.weight,
        _ => 0.0,
    };
    let weight_change_kg = weight_unit.to_kg(weight_change);

    let tdee = average_calories + (weight_change_kg * KCAL_PER_KG) / f64::from(effective_window);

    let valid = slice.len() >= MIN_VALID_OBSERVATIONS;
    if !valid {
        warn!(
            observations = slice.len(),
            required = MIN_VALID_OBSERVATIONS,
            "insufficient history for a reliable TDEE estimate"
        );
    }

    debug!(
        requested = window.days(),
        effective_window,
        span_days,
        average_calories,
        weight_change_kg,
        tdee,
        "estimated TDEE"
    );

    // Deficit and surplus are taken from the rounded values
    let tdee = round_half_up(tdee);
    let average_calories = round_half_up(average_calories);

    TdeeResult {
        tdee,
        average_calories,
        weight_change,
        weight_unit,
        requested_window: window,
        effective_window,
        period_label: period_label(effective_window),
        valid,
        deficit: (tdee - average_calories).max(0),
        surplus: (average_calories - tdee).max(0),
    }
}

/// Nearest integer with halves rounded towards positive infinity
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn period_label(days: u32) -> String {
    format!("{} days", days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_log(day: NaiveDate, calories: f64, weight: f64) -> DailyLog {
        DailyLog {
            calories,
            weight,
            ..DailyLog::empty(day)
        }
    }

    fn week_of_logs() -> Vec<DailyLog> {
        let calories = [2000.0, 2100.0, 1900.0, 2200.0, 2000.0, 2100.0, 1950.0];
        let start = date(2024, 1, 1);
        calories
            .iter()
            .enumerate()
            .map(|(i, &kcal)| {
                let weight = 80.0 - (i as f64) / 6.0;
                make_log(start + Duration::days(i as i64), kcal, weight)
            })
            .collect()
    }

    #[test]
    fn test_empty_logs() {
        let result = estimate_tdee(&[], TdeeWindow::ThreeWeeks, WeightUnit::Lbs);

        assert_eq!(result.tdee, 0);
        assert_eq!(result.average_calories, 0);
        assert_eq!(result.weight_change, 0.0);
        assert!(!result.valid);
        assert_eq!(result.deficit, 0);
        assert_eq!(result.surplus, 0);
        assert_eq!(result.period_label, "21 days");
    }

    #[test]
    fn test_one_week_losing_a_kilo() {
        let result = estimate_tdee(&week_of_logs(), TdeeWindow::TwoWeeks, WeightUnit::Kg);

        assert_eq!(result.effective_window, 7);
        assert_eq!(result.average_calories, 2036);
        assert!((result.weight_change + 1.0).abs() < 1e-9);
        // 2035.71 - 7700 / 7
        assert_eq!(result.tdee, 936);
        assert!(result.valid);
        assert_eq!(result.period_label, "7 days");
        assert_eq!(result.deficit, 0);
        assert_eq!(result.surplus, 1100);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let mut logs = week_of_logs();
        logs.reverse();
        let result = estimate_tdee(&logs, TdeeWindow::TwoWeeks, WeightUnit::Kg);
        assert_eq!(result.tdee, 936);
    }

    #[test]
    fn test_window_shrinks_to_history_span() {
        let start = date(2024, 3, 1);
        let logs: Vec<DailyLog> = (0..10)
            .map(|i| make_log(start + Duration::days(i), 2000.0, 75.0))
            .collect();

        let result = estimate_tdee(&logs, TdeeWindow::Month, WeightUnit::Kg);

        assert_eq!(result.effective_window, 10);
        assert_eq!(result.requested_window, TdeeWindow::Month);
        assert_eq!(result.tdee, 2000);
    }

    #[test]
    fn test_trailing_slice_counts_observations_not_days() {
        // 20 logs every other day: span 39 days, window 14 takes the last 14 logs
        let start = date(2024, 3, 1);
        let logs: Vec<DailyLog> = (0..20)
            .map(|i| {
                let calories = if i < 6 { 4000.0 } else { 2000.0 };
                make_log(start + Duration::days(i * 2), calories, 70.0)
            })
            .collect();

        let result = estimate_tdee(&logs, TdeeWindow::TwoWeeks, WeightUnit::Kg);

        assert_eq!(result.effective_window, 14);
        assert_eq!(result.average_calories, 2000);
        assert!(result.valid);
    }

    #[test]
    fn test_sparse_history_fewer_logs_than_window() {
        // Three logs spanning 20 days with a 14-day request
        let logs = vec![
            make_log(date(2024, 3, 1), 1800.0, 70.0),
            make_log(date(2024, 3, 10), 2000.0, 70.5),
            make_log(date(2024, 3, 20), 2200.0, 71.0),
        ];

        let result = estimate_tdee(&logs, TdeeWindow::TwoWeeks, WeightUnit::Kg);

        assert_eq!(result.effective_window, 14);
        assert_eq!(result.average_calories, 2000);
        assert!((result.weight_change - 1.0).abs() < 1e-9);
        // 2000 + 7700 / 14 = 2550
        assert_eq!(result.tdee, 2550);
        assert!(!result.valid);
        assert_eq!(result.deficit, 550);
        assert_eq!(result.surplus, 0);
    }

    #[test]
    fn test_single_log() {
        let logs = vec![make_log(date(2024, 3, 1), 2300.0, 70.0)];
        let result = estimate_tdee(&logs, TdeeWindow::TwoWeeks, WeightUnit::Kg);

        assert_eq!(result.effective_window, 1);
        assert_eq!(result.tdee, 2300);
        assert_eq!(result.average_calories, 2300);
        assert_eq!(result.deficit, 0);
        assert_eq!(result.surplus, 0);
        assert!(!result.valid);
    }

    #[test]
    fn test_unit_consistency_kg_vs_lbs() {
        let kg_logs = week_of_logs();
        let lbs_logs: Vec<DailyLog> = kg_logs
            .iter()
            .map(|log| DailyLog {
                weight: log.weight * LBS_PER_KG,
                ..log.clone()
            })
            .collect();

        let kg = estimate_tdee(&kg_logs, TdeeWindow::TwoWeeks, WeightUnit::Kg);
        let lbs = estimate_tdee(&lbs_logs, TdeeWindow::TwoWeeks, WeightUnit::Lbs);

        assert!((kg.tdee - lbs.tdee).abs() <= 1);
        assert_eq!(kg.average_calories, lbs.average_calories);
        assert!((lbs.weight_change + LBS_PER_KG).abs() < 1e-9);
    }

    #[test]
    fn test_halves_round_up_for_negative_estimates() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(2035.714), 2036);
    }

    /// 14 flat-intake days with the weight change spread so that the raw
    /// estimate lands `offset` kcal above the raw average
    fn fortnight_with_offset(calories: f64, offset: f64) -> Vec<DailyLog> {
        let start = date(2024, 6, 1);
        let gain_kg = offset * 14.0 / KCAL_PER_KG;
        (0..14)
            .map(|i| {
                let weight = if i == 13 { 80.0 + gain_kg } else { 80.0 };
                make_log(start + Duration::days(i), calories, weight)
            })
            .collect()
    }

    #[test]
    fn test_balance_follows_rounded_values_across_half_boundary() {
        // raw average 2000.3, raw estimate 2000.6
        let result = estimate_tdee(
            &fortnight_with_offset(2000.3, 0.3),
            TdeeWindow::TwoWeeks,
            WeightUnit::Kg,
        );
        assert_eq!((result.tdee, result.average_calories), (2001, 2000));
        assert_eq!((result.deficit, result.surplus), (1, 0));

        // raw average 1999.6, raw estimate 2000.4: both display as 2000
        let result = estimate_tdee(
            &fortnight_with_offset(1999.6, 0.8),
            TdeeWindow::TwoWeeks,
            WeightUnit::Kg,
        );
        assert_eq!((result.tdee, result.average_calories), (2000, 2000));
        assert_eq!((result.deficit, result.surplus), (0, 0));
    }

    #[test]
    fn test_deficit_and_surplus_are_exclusive() {
        let start = date(2024, 5, 1);
        for delta in [-2.0, -0.3, 0.0, 0.4, 1.5] {
            let logs: Vec<DailyLog> = (0..14)
                .map(|i| {
                    let weight = 80.0 + delta * (i as f64) / 13.0;
                    make_log(start + Duration::days(i), 2100.0, weight)
                })
                .collect();

            let result = estimate_tdee(&logs, TdeeWindow::TwoWeeks, WeightUnit::Kg);

            if result.tdee == result.average_calories {
                assert_eq!((result.deficit, result.surplus), (0, 0));
            } else {
                assert!((result.deficit == 0) != (result.surplus == 0));
            }
        }
    }
}
