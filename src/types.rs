//! Core types for MacroPulse analytics
//!
//! This module defines the daily log record mirrored from the remote store,
//! user settings, the window presets the analytics accept, and the value
//! objects handed back to the presentation layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ComputeError;

/// Snapshot of a user's logs keyed by calendar date.
pub type LogCollection = BTreeMap<NaiveDate, DailyLog>;

/// Bowel movement sub-record logged alongside hydration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowelMovement {
    /// Clock time as entered by the user (free-form, may be empty)
    #[serde(default)]
    pub time: String,
    /// Bristol stool scale (1-7)
    pub bristol_scale: u8,
    /// Urgency (0-5, 0 = not recorded)
    #[serde(default)]
    pub urgency: u8,
    /// Discomfort (0-5, 0 = not recorded)
    #[serde(default)]
    pub discomfort: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One user's log for a single calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    /// Remote row identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    /// Calendar date (YYYY-MM-DD), unique per user
    pub date: NaiveDate,
    /// Energy intake (kcal)
    #[serde(default)]
    pub calories: f64,
    /// Protein (g)
    #[serde(default)]
    pub protein: f64,
    /// Carbohydrates (g)
    #[serde(default)]
    pub carbs: f64,
    /// Fat (g)
    #[serde(default)]
    pub fat: f64,
    /// Fiber (g)
    #[serde(default)]
    pub fiber: f64,
    /// Step count
    #[serde(default)]
    pub steps: f64,
    /// Active cardio minutes
    #[serde(default)]
    pub cardio: f64,
    /// Hydration in the user's preferred unit
    #[serde(default)]
    pub water: f64,
    /// Body weight in the user's preferred unit
    #[serde(default)]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bowel_movement: Option<BowelMovement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DailyLog {
    /// Create an empty log for a date with every quantity at zero
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            id: None,
            user_id: None,
            date,
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            fiber: 0.0,
            steps: 0.0,
            cardio: 0.0,
            water: 0.0,
            weight: 0.0,
            bowel_movement: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Body weight unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
        }
    }

    /// Convert a mass expressed in this unit to kilograms
    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lbs => value / crate::tdee::LBS_PER_KG,
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightUnit {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kg" => Ok(WeightUnit::Kg),
            "lbs" | "lb" => Ok(WeightUnit::Lbs),
            other => Err(ComputeError::InvalidUnit(other.to_string())),
        }
    }
}

/// Hydration unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HydrationUnit {
    #[default]
    #[serde(rename = "L")]
    Liters,
    #[serde(rename = "oz")]
    Ounces,
}

impl HydrationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            HydrationUnit::Liters => "L",
            HydrationUnit::Ounces => "oz",
        }
    }
}

impl fmt::Display for HydrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HydrationUnit {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "L" | "l" => Ok(HydrationUnit::Liters),
            "oz" => Ok(HydrationUnit::Ounces),
            other => Err(ComputeError::InvalidUnit(other.to_string())),
        }
    }
}

/// Display units chosen by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitPreference {
    pub weight: WeightUnit,
    pub hydration: HydrationUnit,
}

/// Daily targets configured by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalSettings {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub water: f64,
    pub steps: f64,
}

impl Default for GoalSettings {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 150.0,
            carbs: 220.0,
            fat: 70.0,
            water: 3.0,
            steps: 10000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// User settings row, as stored remotely and cached locally
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub units: UnitPreference,
    #[serde(default)]
    pub goals: GoalSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Window presets for the analytics series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SeriesWindow {
    #[default]
    Week,
    Fortnight,
    Month,
}

impl SeriesWindow {
    pub const ALLOWED: &'static str = "7, 14, 30";

    pub fn days(&self) -> u32 {
        match self {
            SeriesWindow::Week => 7,
            SeriesWindow::Fortnight => 14,
            SeriesWindow::Month => 30,
        }
    }
}

impl TryFrom<u32> for SeriesWindow {
    type Error = ComputeError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            7 => Ok(SeriesWindow::Week),
            14 => Ok(SeriesWindow::Fortnight),
            30 => Ok(SeriesWindow::Month),
            _ => Err(ComputeError::InvalidWindow {
                days,
                allowed: Self::ALLOWED,
            }),
        }
    }
}

impl From<SeriesWindow> for u32 {
    fn from(window: SeriesWindow) -> Self {
        window.days()
    }
}

/// Window presets for the TDEE estimator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TdeeWindow {
    #[default]
    TwoWeeks,
    ThreeWeeks,
    Month,
}

impl TdeeWindow {
    pub const ALLOWED: &'static str = "14, 21, 30";

    pub fn days(&self) -> u32 {
        match self {
            TdeeWindow::TwoWeeks => 14,
            TdeeWindow::ThreeWeeks => 21,
            TdeeWindow::Month => 30,
        }
    }
}

impl TryFrom<u32> for TdeeWindow {
    type Error = ComputeError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            14 => Ok(TdeeWindow::TwoWeeks),
            21 => Ok(TdeeWindow::ThreeWeeks),
            30 => Ok(TdeeWindow::Month),
            _ => Err(ComputeError::InvalidWindow {
                days,
                allowed: Self::ALLOWED,
            }),
        }
    }
}

impl From<TdeeWindow> for u32 {
    fn from(window: TdeeWindow) -> Self {
        window.days()
    }
}

/// One gap-filled day of the analytics series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub calories: f64,
    pub water: f64,
    pub steps: f64,
    pub weight: f64,
}

/// Summary averages over the logged days of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesAverages {
    /// Mean calories, rounded to the nearest kcal
    pub calories: i64,
    /// Mean hydration, rounded to two decimals
    pub water: f64,
    /// Mean steps, rounded to the nearest step
    pub steps: i64,
    /// Last minus first weight of the gap-filled series
    pub weight_delta: f64,
}

/// Hydration vs. stool quality scatter point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationPoint {
    pub date: NaiveDate,
    pub hydration: f64,
    pub quality_scale: u8,
}

/// Output of the series builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResult {
    pub window: SeriesWindow,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub daily_series: Vec<SeriesPoint>,
    pub averages: SeriesAverages,
    pub hydration_scatter: Vec<HydrationPoint>,
}

/// Output of the TDEE estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TdeeResult {
    /// Estimated maintenance intake (kcal/day)
    pub tdee: i64,
    /// Mean intake over the observations used (kcal/day)
    pub average_calories: i64,
    /// Weight change over the observations used, in `weight_unit`
    pub weight_change: f64,
    pub weight_unit: WeightUnit,
    pub requested_window: TdeeWindow,
    /// Window actually applied after shrinking to the history span
    pub effective_window: u32,
    pub period_label: String,
    /// False when fewer than seven observations were available
    pub valid: bool,
    pub deficit: i64,
    pub surplus: i64,
}

/// Progress towards each daily goal (0-1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub date: NaiveDate,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub water: f64,
    pub steps: f64,
}
