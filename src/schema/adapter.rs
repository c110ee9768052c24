//! Adapter for converting exported log payloads into daily logs

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::error::ComputeError;
use crate::schema::ValidationError;
use crate::types::{DailyLog, LogCollection};

/// Adapter for parsing and validating daily log payloads
pub struct LogAdapter;

impl LogAdapter {
    /// Parse a JSON string containing an array of DailyLogs
    pub fn parse_array(json: &str) -> Result<Vec<DailyLog>, ComputeError> {
        let logs: Vec<DailyLog> = serde_json::from_str(json)?;
        Ok(logs)
    }

    /// Parse NDJSON (newline-delimited JSON) containing DailyLogs
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<DailyLog>, ComputeError> {
        let mut logs = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<DailyLog>(trimmed) {
                Ok(log) => logs.push(log),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(logs)
    }

    /// Parse an ISO 8601 calendar date (YYYY-MM-DD)
    pub fn parse_date(value: &str) -> Result<NaiveDate, ComputeError> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|e| ComputeError::DateParseError(format!("{}: {}", value, e)))
    }

    /// Key logs by date; a later log for the same date replaces an earlier one
    pub fn to_collection(logs: Vec<DailyLog>) -> LogCollection {
        logs.into_iter().map(|log| (log.date, log)).collect()
    }

    /// Validate every log and report the failures
    pub fn validate_logs(logs: &[DailyLog]) -> Vec<ValidationResult> {
        let mut seen = HashSet::new();

        logs.iter()
            .enumerate()
            .filter_map(|(idx, log)| {
                let result = match log.validate() {
                    Err(e) => Some(e),
                    Ok(()) if !seen.insert(log.date) => {
                        Some(ValidationError::DuplicateDate(log.date))
                    }
                    Ok(()) => None,
                };

                result.map(|error| ValidationResult {
                    index: idx,
                    date: log.date.to_string(),
                    error,
                })
            })
            .collect()
    }
}

/// A log that failed validation
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub date: String,
    pub error: ValidationError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array() {
        let json = r#"[
            {"date": "2024-01-01", "calories": 2000, "weight": 80},
            {"date": "2024-01-02", "calories": 2100, "weight": 79.8}
        ]"#;

        let logs = LogAdapter::parse_array(json).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].weight, 79.8);
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let ndjson = "{\"date\": \"2024-01-01\", \"calories\": 2000}\n\n{\"date\": \"2024-01-02\"}\n";
        let logs = LogAdapter::parse_ndjson(ndjson).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].calories, 0.0);
    }

    #[test]
    fn test_parse_ndjson_reports_line() {
        let ndjson = "{\"date\": \"2024-01-01\"}\n{\"date\": \"01/02/2024\"}\n";
        let err = LogAdapter::parse_ndjson(ndjson).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_validate_logs_flags_duplicates_and_bad_values() {
        let json = r#"[
            {"date": "2024-01-01", "calories": 2000},
            {"date": "2024-01-02", "calories": -5},
            {"date": "2024-01-01", "calories": 1900}
        ]"#;
        let logs = LogAdapter::parse_array(json).unwrap();

        let results = LogAdapter::validate_logs(&logs);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].index, 1);
        assert!(matches!(
            results[1].error,
            ValidationError::DuplicateDate(_)
        ));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            LogAdapter::parse_date(" 2024-02-29 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(matches!(
            LogAdapter::parse_date("2023-02-29"),
            Err(ComputeError::DateParseError(_))
        ));
    }

    #[test]
    fn test_to_collection_last_wins() {
        let json = r#"[
            {"date": "2024-01-01", "calories": 2000},
            {"date": "2024-01-01", "calories": 1900}
        ]"#;
        let collection = LogAdapter::to_collection(LogAdapter::parse_array(json).unwrap());
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.values().next().unwrap().calories, 1900.0);
    }
}
