//! Display formatting helpers
//!
//! Unit-aware labels for reports. Values are never converted here; a weight
//! logged in pounds is shown in pounds.

use chrono::NaiveDate;

use crate::types::{HydrationUnit, WeightUnit};

/// "Mar 2, 2024"
pub fn format_date_label(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Format with thousands separators and at most `max_decimals` fraction digits
pub fn format_number(value: f64, max_decimals: usize) -> String {
    let fixed = format!("{:.*}", max_decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        "-"
    } else {
        ""
    };

    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

pub fn format_weight(value: f64, unit: WeightUnit) -> String {
    format!("{} {}", format_number(value, 1), unit)
}

pub fn format_water(value: f64, unit: HydrationUnit) -> String {
    format!("{} {}", format_number(value, 1), unit)
}

pub fn to_percentage(value: f64, digits: usize) -> String {
    format!("{:.*}%", digits, value)
}
