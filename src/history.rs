//! Measurement history: turning raw form or CSV input into annotated
//! measurements, and pairing them with trends for display.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, info};

use crate::age::{age_in_days_between, format_age, parse_date};
use crate::error::{GrowthError, Result};
use crate::models::{BabyProfile, Measurement, MeasurementType, Units};
use crate::percentile::PercentileCalculator;
use crate::reference::ReferenceTable;
use crate::trend::{measurement_trends, MeasurementTrends};
use crate::units::to_metric;
use crate::validation::{MeasurementValidator, ValidationIssue};

/// Raw measurement as entered, in either unit system
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementInput {
    /// Existing id when editing a stored measurement
    pub id: Option<String>,
    pub date: String,
    pub weight: f64,
    pub height: f64,
    pub head: f64,
    pub units: Units,
    pub notes: Option<String>,
}

/// Convert an input to SI units and attach its age and percentiles
pub fn annotate_measurement(
    profile: &BabyProfile,
    input: &MeasurementInput,
    table: &ReferenceTable,
) -> Result<Measurement> {
    let date = parse_date(&input.date)?;
    let age_in_days = age_in_days_between(profile.birth_date, date);

    let weight_kg = to_metric(input.weight, MeasurementType::Weight, input.units);
    let height_cm = to_metric(input.height, MeasurementType::Height, input.units);
    let head_cm = to_metric(input.head, MeasurementType::Head, input.units);

    let percentile = |value: f64, measurement: MeasurementType| {
        PercentileCalculator::percentile_in_table(
            table,
            value,
            age_in_days,
            measurement,
            profile.sex,
        )
    };

    let measurement = Measurement {
        id: input
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        date,
        age_in_days,
        weight_kg,
        height_cm,
        head_cm,
        weight_percentile: Some(percentile(weight_kg, MeasurementType::Weight)),
        height_percentile: Some(percentile(height_cm, MeasurementType::Height)),
        head_percentile: Some(percentile(head_cm, MeasurementType::Head)),
        notes: input
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(str::to_string),
    };

    debug!(id = %measurement.id, age_in_days, "Annotated measurement");
    Ok(measurement)
}

/// Insert or replace a measurement by id, keeping the history newest first
pub fn upsert_measurement(history: &mut Vec<Measurement>, measurement: Measurement) {
    match history.iter_mut().find(|existing| existing.id == measurement.id) {
        Some(existing) => *existing = measurement,
        None => history.push(measurement),
    }
    sort_newest_first(history);
}

pub fn sort_newest_first(history: &mut [Measurement]) {
    history.sort_by(|a, b| b.date.cmp(&a.date));
}

/// One line of a history view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub measurement: Measurement,
    pub age: String,
    pub trends: MeasurementTrends,
    pub issues: Vec<ValidationIssue>,
}

/// Pair each measurement with its display age, trends and validation issues
pub fn build_history_rows(
    history: &[Measurement],
    birth_date: NaiveDate,
    today: NaiveDate,
    trend_threshold_percent: f64,
) -> Vec<HistoryRow> {
    let trends = measurement_trends(history, trend_threshold_percent);

    history
        .iter()
        .zip(trends)
        .map(|(measurement, trends)| {
            let mut issues = MeasurementValidator::validate_measurement(measurement);
            if let Some(issue) =
                MeasurementValidator::validate_measurement_date(birth_date, measurement.date, today)
            {
                issues.push(issue);
            }

            HistoryRow {
                measurement: measurement.clone(),
                age: format_age(measurement.age_in_days),
                trends,
                issues,
            }
        })
        .collect()
}

/// Maps the many header spellings seen in exported spreadsheets to the
/// fields a history CSV needs
struct ColumnMap {
    aliases: HashMap<String, &'static str>,
}

impl ColumnMap {
    fn new() -> Self {
        let mut aliases = HashMap::new();
        let mut add = |standard: &'static str, variations: &[&str]| {
            for variation in variations {
                aliases.insert(variation.to_string(), standard);
            }
        };

        add("id", &["id", "measurement_id"]);
        add("date", &["date", "measurement_date", "measured_on"]);
        add("weight", &["weight", "weight_kg", "weight_lb", "kg", "lb", "lbs"]);
        add("height", &["height", "height_cm", "height_in", "length", "length_cm"]);
        add("head", &["head", "head_cm", "head_in", "head_circumference", "hc"]);
        add("notes", &["notes", "note", "comment", "comments"]);

        Self { aliases }
    }

    fn resolve(&self, headers: &StringRecord) -> HashMap<&'static str, usize> {
        headers
            .iter()
            .enumerate()
            .filter_map(|(index, header)| {
                let normalized = header.trim().to_lowercase().replace([' ', '-'], "_");
                self.aliases.get(normalized.as_str()).map(|field| (*field, index))
            })
            .collect()
    }
}

/// Read measurement inputs from CSV with a header row.
///
/// `date`, `weight`, `height` and `head` columns are required; `id` and
/// `notes` are optional. All values are read in `units` and must lie in the
/// entry ranges for that unit system.
pub fn read_measurements_csv<R: Read>(reader: R, units: Units) -> Result<Vec<MeasurementInput>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| GrowthError::Import(e.to_string()))?
        .clone();
    let columns = ColumnMap::new().resolve(&headers);

    for required in ["date", "weight", "height", "head"] {
        if !columns.contains_key(required) {
            return Err(GrowthError::Import(format!(
                "Missing required column: {}",
                required
            )));
        }
    }

    let mut inputs = Vec::new();
    for (row_index, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| GrowthError::Import(e.to_string()))?;
        let line = row_index + 2;

        let field = |name: &str| column(&columns, &record, name).map(str::to_string);
        let number = |name: &str| -> Result<f64> {
            let raw = column(&columns, &record, name).ok_or_else(|| {
                GrowthError::Import(format!("Line {}: missing {}", line, name))
            })?;
            raw.parse::<f64>().map_err(|_| {
                GrowthError::Import(format!("Line {}: invalid {} '{}'", line, name, raw))
            })
        };

        let date = field("date")
            .ok_or_else(|| GrowthError::Import(format!("Line {}: missing date", line)))?;

        let input = MeasurementInput {
            id: field("id"),
            date,
            weight: number("weight")?,
            height: number("height")?,
            head: number("head")?,
            units,
            notes: field("notes"),
        };

        MeasurementValidator::check_input(&input).map_err(|err| match err {
            GrowthError::Validation(message) => {
                GrowthError::Validation(format!("Line {}: {}", line, message))
            }
            other => other,
        })?;
        inputs.push(input);
    }

    info!(rows = inputs.len(), "Read measurement history CSV");
    Ok(inputs)
}

fn column<'r>(
    columns: &HashMap<&'static str, usize>,
    record: &'r StringRecord,
    name: &str,
) -> Option<&'r str> {
    columns
        .get(name)
        .and_then(|&index| record.get(index))
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BabyProfile {
        BabyProfile::new(
            "Test Baby",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            crate::models::Sex::Male,
        )
    }

    fn input(date: &str, weight: f64, height: f64, head: f64) -> MeasurementInput {
        MeasurementInput {
            id: None,
            date: date.to_string(),
            weight,
            height,
            head,
            units: Units::Metric,
            notes: None,
        }
    }

    #[test]
    fn test_annotate_at_birth_medians() {
        let measurement = annotate_measurement(
            &profile(),
            &input("2024-01-01", 3.3464, 49.8842, 34.4618),
            ReferenceTable::who(),
        )
        .unwrap();

        assert_eq!(measurement.age_in_days, 0);
        for measurement_type in MeasurementType::ALL {
            let p = measurement.percentile(measurement_type).unwrap();
            assert!((p - 50.0).abs() <= 1.0);
        }
        assert!(!measurement.id.is_empty());
    }

    #[test]
    fn test_annotate_imperial_input() {
        let mut raw = input("2024-02-01", 10.0, 21.0, 15.0);
        raw.units = Units::Imperial;
        raw.id = Some("keep-me".to_string());
        raw.notes = Some("   ".to_string());

        let measurement = annotate_measurement(&profile(), &raw, ReferenceTable::who()).unwrap();
        assert_eq!(measurement.id, "keep-me");
        assert_eq!(measurement.age_in_days, 31);
        assert_eq!(measurement.weight_kg, 4.536);
        assert_eq!(measurement.height_cm, 53.3);
        assert_eq!(measurement.head_cm, 38.1);
        assert_eq!(measurement.notes, None);
    }

    #[test]
    fn test_annotate_rejects_bad_date() {
        let result = annotate_measurement(
            &profile(),
            &input("01/02/2024", 4.0, 54.0, 37.0),
            ReferenceTable::who(),
        );
        assert!(matches!(result, Err(GrowthError::InvalidDate { .. })));
    }

    #[test]
    fn test_upsert_keeps_newest_first() {
        let table = ReferenceTable::who();
        let baby = profile();
        let mut history = Vec::new();

        let first = input("2024-01-15", 3.9, 52.0, 35.5);
        let second = input("2024-02-15", 4.9, 56.0, 38.0);
        let first = annotate_measurement(&baby, &first, table).unwrap();
        let second = annotate_measurement(&baby, &second, table).unwrap();
        upsert_measurement(&mut history, first.clone());
        upsert_measurement(&mut history, second.clone());
        assert_eq!(history[0].id, second.id);

        let mut edited = first.clone();
        edited.notes = Some("re-weighed".to_string());
        upsert_measurement(&mut history, edited);
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].notes.as_deref(), Some("re-weighed"));
    }

    #[test]
    fn test_history_rows() {
        let table = ReferenceTable::who();
        let baby = profile();
        let mut history = vec![
            annotate_measurement(&baby, &input("2024-01-15", 3.9, 52.0, 35.5), table).unwrap(),
            annotate_measurement(&baby, &input("2024-02-15", 4.9, 56.0, 38.0), table).unwrap(),
            annotate_measurement(&baby, &input("2024-09-15", 4.9, 56.0, 99.0), table).unwrap(),
        ];
        sort_newest_first(&mut history);

        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let rows = build_history_rows(&history, baby.birth_date, today, 2.0);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].trends.weight, crate::models::Trend::None);
        assert_eq!(rows[1].trends.weight, crate::models::Trend::Up);
        assert_eq!(rows[1].age, "1m 15d");
        assert!(rows[1].issues.is_empty());
        assert_eq!(rows[0].issues.len(), 2);
    }

    #[test]
    fn test_read_csv() {
        let data = "\
Date,weight_kg,Length,HC,Notes
2024-01-15,3.9,52.0,35.5,
2024-02-15,4.9,56.0,38.0,after vaccination
";
        let inputs = read_measurements_csv(data.as_bytes(), Units::Metric).unwrap();

        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].date, "2024-01-15");
        assert_eq!(inputs[0].notes, None);
        assert_eq!(inputs[1].head, 38.0);
        assert_eq!(inputs[1].notes.as_deref(), Some("after vaccination"));
    }

    #[test]
    fn test_read_csv_errors() {
        let missing_column = "date,weight,height\n2024-01-15,3.9,52.0\n";
        assert!(matches!(
            read_measurements_csv(missing_column.as_bytes(), Units::Metric),
            Err(GrowthError::Import(_))
        ));

        let bad_number = "date,weight,height,head\n2024-01-15,heavy,52.0,35\n";
        match read_measurements_csv(bad_number.as_bytes(), Units::Metric) {
            Err(GrowthError::Import(message)) => assert!(message.contains("Line 2")),
            other => panic!("expected import error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_csv_checks_entry_ranges() {
        let imperial = "date,weight,height,head\n2024-02-01,10.5,21.0,15.0\n";
        let inputs = read_measurements_csv(imperial.as_bytes(), Units::Imperial).unwrap();
        assert_eq!(inputs[0].weight, 10.5);

        // inch-sized length and head values are too small as centimetres
        let metric = "\
date,weight,height,head
2024-01-15,3.9,52.0,35.5
2024-02-01,10.5,15.0,15.0
";
        match read_measurements_csv(metric.as_bytes(), Units::Metric) {
            Err(GrowthError::Validation(message)) => {
                assert!(message.starts_with("Line 3:"));
                assert!(message.contains("Height should be between 20-200 cm"));
                assert!(message.contains("Head circumference should be between 20-80 cm"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let too_heavy = "date,weight,height,head\n2024-02-01,120,30,15\n";
        assert!(matches!(
            read_measurements_csv(too_heavy.as_bytes(), Units::Imperial),
            Err(GrowthError::Validation(_))
        ));
    }
}
