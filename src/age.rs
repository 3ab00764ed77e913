//! Age calculation and display formatting
//!
//! Ages are whole days between two calendar dates. Only the date portion of
//! the inputs matters: `2023-01-31T23:59:00Z` and `2023-01-31` are the same
//! day.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::error::{GrowthError, Result};

/// Average days per month
pub const DAYS_PER_MONTH: f64 = 30.44;

/// Parse a date-only or ISO-8601 timestamp string into a calendar date
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(timestamp.date());
    }

    Err(GrowthError::InvalidDate {
        input: input.to_string(),
    })
}

/// Days from `birth_date` to `measurement_date`, or an error if either
/// input is not a date
pub fn try_calculate_age_in_days(birth_date: &str, measurement_date: &str) -> Result<i64> {
    let birth = parse_date(birth_date)?;
    let measurement = parse_date(measurement_date)?;
    Ok(age_in_days_between(birth, measurement))
}

/// Days from `birth_date` to `measurement_date`.
///
/// Negative when the measurement precedes birth. Unparseable input yields
/// `0`; use [`try_calculate_age_in_days`] to tell that apart from a newborn.
pub fn calculate_age_in_days(birth_date: &str, measurement_date: &str) -> i64 {
    match try_calculate_age_in_days(birth_date, measurement_date) {
        Ok(days) => days,
        Err(err) => {
            warn!(
                birth_date,
                measurement_date,
                error = %err,
                "Age calculation fell back to 0 days"
            );
            0
        }
    }
}

pub fn age_in_days_between(birth: NaiveDate, measurement: NaiveDate) -> i64 {
    (measurement - birth).num_days()
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Render an age in days as `"15 days"`, `"1m 15d"`, `"1y 1m"` and so on.
///
/// From 30 days on, ages are split into 30.44-day months with the leftover
/// rounded to whole days; a leftover that rounds up to a full month carries
/// into the month count. Twelve such months make a year.
pub fn format_age(age_in_days: i64) -> String {
    if age_in_days < 0 {
        return "0 days".to_string();
    }

    if age_in_days < 30 {
        return format!("{} day{}", age_in_days, plural(age_in_days));
    }

    let days = age_in_days as f64;
    let mut months = (days / DAYS_PER_MONTH).floor() as i64;
    let mut remaining_days = (days - months as f64 * DAYS_PER_MONTH).round() as i64;

    if remaining_days >= DAYS_PER_MONTH.round() as i64 {
        months += 1;
        remaining_days = 0;
    }

    if months < 12 {
        if remaining_days == 0 {
            return format!("{} month{}", months, plural(months));
        }
        return format!("{}m {}d", months, remaining_days);
    }

    let years = months / 12;
    let remaining_months = months % 12;

    if remaining_months == 0 {
        format!("{} year{}", years, plural(years))
    } else {
        format!("{}y {}m", years, remaining_months)
    }
}

/// Format a date string for display as `"Jan 05, 2023"`.
///
/// Input that is not a date is returned unchanged.
pub fn format_date(date: &str) -> String {
    match parse_date(date) {
        Ok(parsed) => parsed.format("%b %d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}
