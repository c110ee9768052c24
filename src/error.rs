//! Error types for MacroPulse core
//!
//! The analytics functions themselves are total and never fail. These errors
//! only surface at the boundaries: parsing log payloads, resolving window
//! presets and unit discriminators, and entry validation.

use thiserror::Error;

/// Errors that can occur while preparing input for computation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse log payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Unsupported window length: {days} days (expected one of {allowed})")]
    InvalidWindow { days: u32, allowed: &'static str },

    #[error("Unsupported unit: {0}")]
    InvalidUnit(String),

    #[error("Invalid daily log: {0}")]
    InvalidLog(#[from] crate::schema::ValidationError),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
