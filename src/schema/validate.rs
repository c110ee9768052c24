//! Entry validation for daily logs
//!
//! The analytics accept any collection; these checks belong to the data-entry
//! side and are applied by the adapter, the store front-ends and the CLI.

use chrono::NaiveDate;

use crate::types::{BowelMovement, DailyLog};

/// Valid range of the Bristol stool scale
pub const BRISTOL_RANGE: std::ops::RangeInclusive<u8> = 1..=7;

/// Valid range of the urgency and discomfort scales
pub const SEVERITY_RANGE: std::ops::RangeInclusive<u8> = 0..=5;

/// Validation errors for daily logs
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidQuantity { field: &'static str, value: f64 },

    #[error("Bristol scale must be between 1 and 7 (got {0})")]
    BristolOutOfRange(u8),

    #[error("{field} must be between 0 and 5 (got {value})")]
    SeverityOutOfRange { field: &'static str, value: u8 },

    #[error("Duplicate log for {0}")]
    DuplicateDate(NaiveDate),
}

impl DailyLog {
    /// Validate the log as entered by the user
    pub fn validate(&self) -> Result<(), ValidationError> {
        let quantities = [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
            ("fiber", self.fiber),
            ("steps", self.steps),
            ("cardio", self.cardio),
            ("water", self.water),
            ("weight", self.weight),
        ];

        for (field, value) in quantities {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidQuantity { field, value });
            }
        }

        match &self.bowel_movement {
            Some(bowel) => bowel.validate(),
            None => Ok(()),
        }
    }
}

impl BowelMovement {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !BRISTOL_RANGE.contains(&self.bristol_scale) {
            return Err(ValidationError::BristolOutOfRange(self.bristol_scale));
        }
        if !SEVERITY_RANGE.contains(&self.urgency) {
            return Err(ValidationError::SeverityOutOfRange {
                field: "urgency",
                value: self.urgency,
            });
        }
        if !SEVERITY_RANGE.contains(&self.discomfort) {
            return Err(ValidationError::SeverityOutOfRange {
                field: "discomfort",
                value: self.discomfort,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> DailyLog {
        DailyLog {
            calories: 2000.0,
            weight: 72.5,
            ..DailyLog::empty(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
        }
    }

    #[test]
    fn test_valid_log() {
        assert!(log().validate().is_ok());
    }

    #[test]
    fn test_negative_quantity() {
        let bad = DailyLog {
            fat: -3.0,
            ..log()
        };
        assert_eq!(
            bad.validate(),
            Err(ValidationError::InvalidQuantity {
                field: "fat",
                value: -3.0
            })
        );
    }

    #[test]
    fn test_steps_checked_like_other_quantities() {
        let fractional = DailyLog {
            steps: 8000.5,
            ..log()
        };
        assert!(fractional.validate().is_ok());

        let negative = DailyLog {
            steps: -1.0,
            ..log()
        };
        assert!(matches!(
            negative.validate(),
            Err(ValidationError::InvalidQuantity { field: "steps", .. })
        ));
    }

    #[test]
    fn test_non_finite_quantity() {
        let bad = DailyLog {
            water: f64::NAN,
            ..log()
        };
        assert!(matches!(
            bad.validate(),
            Err(ValidationError::InvalidQuantity { field: "water", .. })
        ));
    }

    #[test]
    fn test_bowel_ranges() {
        let mut bowel = BowelMovement {
            time: String::new(),
            bristol_scale: 0,
            urgency: 0,
            discomfort: 0,
            notes: None,
        };
        assert_eq!(bowel.validate(), Err(ValidationError::BristolOutOfRange(0)));

        bowel.bristol_scale = 7;
        assert!(bowel.validate().is_ok());

        bowel.discomfort = 6;
        assert!(matches!(
            bowel.validate(),
            Err(ValidationError::SeverityOutOfRange { field: "discomfort", value: 6 })
        ));
    }
}
