use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{GrowthError, Result};
use crate::history::MeasurementInput;
use crate::models::{Measurement, MeasurementType, Units};

/// Plausibility limits for a measurement type, exclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlausibleRange {
    pub min_exclusive: f64,
    pub max_exclusive: f64,
}

impl PlausibleRange {
    pub fn contains(&self, value: f64) -> bool {
        value > self.min_exclusive && value < self.max_exclusive
    }
}

/// Accepted range for a value typed in by the user, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputRange {
    pub min: f64,
    pub max: f64,
}

impl InputRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A single problem found while checking a measurement record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub value: String,
    pub message: String,
}

/// Range checks that flag physiologically implausible values.
///
/// The stored-value gates (`weight`, `height`, `head`) are plausibility
/// checks, not clinical bounds. Entry ranges are narrower and depend on the
/// unit system the value was typed in.
pub struct MeasurementValidator;

impl MeasurementValidator {
    pub fn range(measurement: MeasurementType) -> PlausibleRange {
        let max_exclusive = match measurement {
            MeasurementType::Weight => 50.0,
            MeasurementType::Height => 200.0,
            MeasurementType::Head => 80.0,
        };
        PlausibleRange {
            min_exclusive: 0.0,
            max_exclusive,
        }
    }

    /// `0 < kg < 50`
    pub fn weight(kg: f64) -> bool {
        Self::is_valid(MeasurementType::Weight, kg)
    }

    /// `0 < cm < 200`
    pub fn height(cm: f64) -> bool {
        Self::is_valid(MeasurementType::Height, cm)
    }

    /// `0 < cm < 80`
    pub fn head(cm: f64) -> bool {
        Self::is_valid(MeasurementType::Head, cm)
    }

    pub fn is_valid(measurement: MeasurementType, value: f64) -> bool {
        Self::range(measurement).contains(value)
    }

    /// Check all three values and the age of a measurement record
    pub fn validate_measurement(record: &Measurement) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for measurement in MeasurementType::ALL {
            let value = record.value(measurement);
            if !Self::is_valid(measurement, value) {
                let range = Self::range(measurement);
                issues.push(ValidationIssue {
                    field: measurement.to_string(),
                    value: value.to_string(),
                    message: format!(
                        "{} should be between {} and {} {}",
                        measurement,
                        range.min_exclusive,
                        range.max_exclusive,
                        measurement.metric_unit()
                    ),
                });
            }
        }

        if record.age_in_days < 0 {
            issues.push(ValidationIssue {
                field: "age_in_days".to_string(),
                value: record.age_in_days.to_string(),
                message: "Measurement is dated before birth".to_string(),
            });
        }

        issues
    }

    /// Entry range for a value in the unit system it was typed in
    pub fn input_range(measurement: MeasurementType, units: Units) -> InputRange {
        let (min, max) = match (measurement, units) {
            (MeasurementType::Weight, Units::Metric) => (0.5, 50.0),
            (MeasurementType::Weight, Units::Imperial) => (1.0, 110.0),
            (MeasurementType::Height, Units::Metric) => (20.0, 200.0),
            (MeasurementType::Height, Units::Imperial) => (8.0, 79.0),
            (MeasurementType::Head, Units::Metric) => (20.0, 80.0),
            (MeasurementType::Head, Units::Imperial) => (8.0, 31.0),
        };
        InputRange { min, max }
    }

    /// Check one entered value against its entry range
    pub fn validate_input_value(
        measurement: MeasurementType,
        value: f64,
        units: Units,
    ) -> Option<ValidationIssue> {
        let (label, title) = match measurement {
            MeasurementType::Weight => ("weight", "Weight"),
            MeasurementType::Height => ("height", "Height"),
            MeasurementType::Head => ("head circumference", "Head circumference"),
        };

        let message = if value.is_nan() || value <= 0.0 {
            format!("Please enter a valid {}", label)
        } else {
            let range = Self::input_range(measurement, units);
            if range.contains(value) {
                return None;
            }
            let unit = match (measurement, units) {
                (MeasurementType::Weight, Units::Metric) => "kg",
                (MeasurementType::Weight, Units::Imperial) => "lbs",
                (_, Units::Metric) => "cm",
                (_, Units::Imperial) => "inches",
            };
            format!("{} should be between {}-{} {}", title, range.min, range.max, unit)
        };

        Some(ValidationIssue {
            field: measurement.to_string(),
            value: value.to_string(),
            message,
        })
    }

    /// Entry-range issues for all three values of an input
    pub fn validate_input(input: &MeasurementInput) -> Vec<ValidationIssue> {
        [
            (MeasurementType::Weight, input.weight),
            (MeasurementType::Height, input.height),
            (MeasurementType::Head, input.head),
        ]
        .into_iter()
        .filter_map(|(measurement, value)| {
            Self::validate_input_value(measurement, value, input.units)
        })
        .collect()
    }

    /// Reject an input with any entry-range issue
    pub fn check_input(input: &MeasurementInput) -> Result<()> {
        let issues = Self::validate_input(input);
        if issues.is_empty() {
            return Ok(());
        }

        let messages: Vec<_> = issues.into_iter().map(|issue| issue.message).collect();
        Err(GrowthError::Validation(messages.join("; ")))
    }

    /// A measurement date must not precede birth or lie in the future
    pub fn validate_measurement_date(
        birth_date: NaiveDate,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Option<ValidationIssue> {
        let message = if date < birth_date {
            "Date cannot be before birth date"
        } else if date > today {
            "Date cannot be in the future"
        } else {
            return None;
        };

        Some(ValidationIssue {
            field: "date".to_string(),
            value: date.to_string(),
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_bounds() {
        assert!(MeasurementValidator::weight(3.5));
        assert!(MeasurementValidator::weight(49.99));
        assert!(!MeasurementValidator::weight(0.0));
        assert!(!MeasurementValidator::weight(-1.0));
        assert!(!MeasurementValidator::weight(50.0));
        assert!(!MeasurementValidator::weight(100.0));
    }

    #[test]
    fn test_height_bounds() {
        assert!(MeasurementValidator::height(50.0));
        assert!(!MeasurementValidator::height(0.0));
        assert!(!MeasurementValidator::height(-1.0));
        assert!(!MeasurementValidator::height(200.0));
        assert!(!MeasurementValidator::height(300.0));
    }

    #[test]
    fn test_head_bounds() {
        assert!(MeasurementValidator::head(35.0));
        assert!(!MeasurementValidator::head(0.0));
        assert!(!MeasurementValidator::head(-1.0));
        assert!(!MeasurementValidator::head(80.0));
        assert!(!MeasurementValidator::head(100.0));
    }

    #[test]
    fn test_nan_is_invalid() {
        assert!(!MeasurementValidator::weight(f64::NAN));
    }

    #[test]
    fn test_validate_record() {
        let mut record = Measurement {
            id: "m1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            age_in_days: 31,
            weight_kg: 4.4,
            height_cm: 54.0,
            head_cm: 37.0,
            weight_percentile: None,
            height_percentile: None,
            head_percentile: None,
            notes: None,
        };
        assert!(MeasurementValidator::validate_measurement(&record).is_empty());

        record.head_cm = 120.0;
        record.age_in_days = -2;
        let issues = MeasurementValidator::validate_measurement(&record);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].field, "head");
        assert_eq!(issues[1].field, "age_in_days");
    }

    fn entered(weight: f64, height: f64, head: f64, units: Units) -> MeasurementInput {
        MeasurementInput {
            id: None,
            date: "2024-02-01".to_string(),
            weight,
            height,
            head,
            units,
            notes: None,
        }
    }

    #[test]
    fn test_metric_input_ranges() {
        let lowest = entered(0.5, 20.0, 20.0, Units::Metric);
        let highest = entered(50.0, 200.0, 80.0, Units::Metric);
        assert!(MeasurementValidator::validate_input(&lowest).is_empty());
        assert!(MeasurementValidator::validate_input(&highest).is_empty());

        let out_of_range = entered(0.4, 201.0, 35.0, Units::Metric);
        let issues = MeasurementValidator::validate_input(&out_of_range);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].message, "Weight should be between 0.5-50 kg");
        assert_eq!(issues[1].message, "Height should be between 20-200 cm");
    }

    #[test]
    fn test_imperial_input_ranges() {
        // 100 lb and 70 in are fine imperial entries but out of range as kg/cm
        let imperial = entered(100.0, 70.0, 15.0, Units::Imperial);
        assert!(MeasurementValidator::validate_input(&imperial).is_empty());
        assert!(MeasurementValidator::check_input(&imperial).is_ok());

        let out_of_range = entered(111.0, 7.9, 32.0, Units::Imperial);
        let issues = MeasurementValidator::validate_input(&out_of_range);
        let messages: Vec<_> = issues.iter().map(|issue| issue.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Weight should be between 1-110 lbs",
                "Height should be between 8-79 inches",
                "Head circumference should be between 8-31 inches",
            ]
        );
    }

    #[test]
    fn test_non_positive_input() {
        let issue = MeasurementValidator::validate_input_value(
            MeasurementType::Head,
            0.0,
            Units::Metric,
        )
        .unwrap();
        assert_eq!(issue.message, "Please enter a valid head circumference");

        let nan = MeasurementValidator::validate_input_value(
            MeasurementType::Weight,
            f64::NAN,
            Units::Imperial,
        );
        assert_eq!(nan.unwrap().message, "Please enter a valid weight");

        match MeasurementValidator::check_input(&entered(-1.0, 50.0, 35.0, Units::Metric)) {
            Err(GrowthError::Validation(message)) => {
                assert_eq!(message, "Please enter a valid weight")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_measurement_date() {
        let birth = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let ok = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(MeasurementValidator::validate_measurement_date(birth, ok, today).is_none());
        assert!(MeasurementValidator::validate_measurement_date(birth, birth, today).is_none());

        let early = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let issue = MeasurementValidator::validate_measurement_date(birth, early, today).unwrap();
        assert!(issue.message.contains("before birth"));

        let future = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let issue = MeasurementValidator::validate_measurement_date(birth, future, today).unwrap();
        assert!(issue.message.contains("future"));
    }
}
