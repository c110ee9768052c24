//! Analytics series builder
//!
//! Turns a sparse log collection into a contiguous, gap-filled daily series
//! ending at the latest logged date, plus summary averages and the hydration
//! scatter projection used by the analytics dashboard.
//!
//! Missing days are zero-filled. A skipped day is indistinguishable from a
//! zero-calorie day in the output, and zero weights on gap days pull down the
//! weight line and `weight_delta`. Callers rely on this shape.

use chrono::{Duration, Local, NaiveDate};
use tracing::debug;

use crate::types::{
    HydrationPoint, LogCollection, SeriesAverages, SeriesPoint, SeriesResult, SeriesWindow,
};

/// Build the series ending at the latest log, or at today's local date when
/// there are no logs.
pub fn build_series(logs: &LogCollection, window: SeriesWindow) -> SeriesResult {
    build_series_at(logs, window, Local::now().date_naive())
}

/// Build the series with an explicit "today" used only for empty collections.
pub fn build_series_at(
    logs: &LogCollection,
    window: SeriesWindow,
    today: NaiveDate,
) -> SeriesResult {
    let end = logs.keys().next_back().copied().unwrap_or(today);
    let start = end - Duration::days(i64::from(window.days()) - 1);

    let mut daily_series = Vec::with_capacity(window.days() as usize);
    let mut hydration_scatter = Vec::new();

    for date in start.iter_days().take(window.days() as usize) {
        match logs.get(&date) {
            Some(log) => {
                daily_series.push(SeriesPoint {
                    date,
                    calories: log.calories,
                    water: log.water,
                    steps: log.steps,
                    weight: log.weight,
                });

                if let Some(bowel) = log.bowel_movement.as_ref().filter(|_| log.water > 0.0) {
                    hydration_scatter.push(HydrationPoint {
                        date,
                        hydration: log.water,
                        quality_scale: bowel.bristol_scale,
                    });
                }
            }
            None => daily_series.push(SeriesPoint {
                date,
                calories: 0.0,
                water: 0.0,
                steps: 0.0,
                weight: 0.0,
            }),
        }
    }

    let averages = compute_averages(&daily_series);

    debug!(
        %start,
        %end,
        window = window.days(),
        scatter_points = hydration_scatter.len(),
        "built analytics series"
    );

    SeriesResult {
        window,
        start,
        end,
        daily_series,
        averages,
        hydration_scatter,
    }
}

/// Averages over the logged days only (`calories > 0`), divisor floored at 1
fn compute_averages(series: &[SeriesPoint]) -> SeriesAverages {
    let (mut calories, mut water, mut steps, mut logged) = (0.0, 0.0, 0.0, 0usize);

    for point in series.iter().filter(|p| p.calories > 0.0) {
        calories += point.calories;
        water += point.water;
        steps += point.steps;
        logged += 1;
    }

    let n = logged.max(1) as f64;

    let weight_delta = match (series.first(), series.last()) {
        (Some(first), Some(last)) if series.len() >= 2 => last.weight - first.weight,
        _ => 0.0,
    };

    SeriesAverages {
        calories: (calories / n).round() as i64,
        water: round_to(water / n, 2),
        steps: (steps / n).round() as i64,
        weight_delta,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
