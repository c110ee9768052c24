//! MacroPulse Core - On-device analytics for the MacroPulse wellness tracker
//!
//! The core turns a snapshot of a user's daily logs into the numbers the
//! client renders: a gap-filled rolling series with summary averages, a
//! maintenance-calorie (TDEE) estimate, and progress against daily goals.
//! Every computation is a pure function over the snapshot it is given.
//!
//! ## Modules
//!
//! - **Series Builder** ([`series`]): contiguous daily series for charts
//! - **TDEE Estimator** ([`tdee`]): energy-balance estimate over a trailing window
//! - **Store** ([`store`]): offline log cache and the provider interfaces it implements

pub mod error;
pub mod format;
pub mod pipeline;
pub mod progress;
pub mod schema;
pub mod series;
pub mod store;
pub mod tdee;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::ComputeError;
pub use pipeline::{series_from_json, tdee_from_json, PulseProcessor};
pub use series::{build_series, build_series_at};
pub use store::{LogProvider, LogStore, SettingsProvider};
pub use tdee::{estimate_tdee, KCAL_PER_KG, LBS_PER_KG};
pub use types::{
    DailyLog, GoalProgress, LogCollection, SeriesResult, SeriesWindow, TdeeResult, TdeeWindow,
    UserSettings, WeightUnit,
};

/// Library version
pub const PULSE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI and bindings
pub const PRODUCER_NAME: &str = "macropulse-core";
