//! LMS reference tables
//!
//! A reference table holds one [`ReferencePoint`] series per
//! (sex, measurement type). The bundled WHO subset is built once per process
//! and shared read-only; custom tables can be loaded from JSON files with
//! the same shape (`{"male": {"weight": [{"ageInDays": 0, "L": .., "M": ..,
//! "S": ..}, ..], "height": [..], "head": [..]}, "female": {..}}`).

mod who;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::error::ReferenceError;
use crate::models::{MeasurementType, Sex};

/// One row of an LMS table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Age in days since birth
    #[serde(rename = "ageInDays")]
    pub age_in_days: u32,

    /// Box-Cox power
    #[serde(rename = "L")]
    pub l: f64,

    /// Median
    #[serde(rename = "M")]
    pub m: f64,

    /// Coefficient of variation
    #[serde(rename = "S")]
    pub s: f64,
}

/// Weight, height and head series for one sex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SexSeries {
    pub weight: Vec<ReferencePoint>,
    pub height: Vec<ReferencePoint>,
    pub head: Vec<ReferencePoint>,
}

impl SexSeries {
    pub fn get(&self, measurement: MeasurementType) -> &[ReferencePoint] {
        match measurement {
            MeasurementType::Weight => &self.weight,
            MeasurementType::Height => &self.height,
            MeasurementType::Head => &self.head,
        }
    }

    fn get_mut(&mut self, measurement: MeasurementType) -> &mut Vec<ReferencePoint> {
        match measurement {
            MeasurementType::Weight => &mut self.weight,
            MeasurementType::Height => &mut self.height,
            MeasurementType::Head => &mut self.head,
        }
    }
}

/// Complete reference dataset keyed by sex and measurement type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTable {
    pub male: SexSeries,
    pub female: SexSeries,
}

static WHO_TABLE: OnceLock<ReferenceTable> = OnceLock::new();

impl ReferenceTable {
    /// The bundled WHO 0-24 month subset
    pub fn who() -> &'static ReferenceTable {
        WHO_TABLE.get_or_init(|| {
            debug!("Initializing bundled WHO reference table");
            who::who_table()
        })
    }

    /// Series for a (sex, measurement type) pair
    pub fn series(&self, sex: Sex, measurement: MeasurementType) -> &[ReferencePoint] {
        self.for_sex(sex).get(measurement)
    }

    pub fn for_sex(&self, sex: Sex) -> &SexSeries {
        match sex {
            Sex::Male => &self.male,
            Sex::Female => &self.female,
        }
    }

    /// Youngest and oldest tabulated ages of a series
    pub fn age_range(&self, sex: Sex, measurement: MeasurementType) -> Option<(u32, u32)> {
        let series = self.series(sex, measurement);
        let min = series.iter().map(|p| p.age_in_days).min()?;
        let max = series.iter().map(|p| p.age_in_days).max()?;
        Some((min, max))
    }

    /// Parse a table from JSON, sort every series by age and validate it
    pub fn from_json_str(json: &str) -> Result<Self, ReferenceError> {
        let mut table: ReferenceTable =
            serde_json::from_str(json).map_err(|e| ReferenceError::Malformed {
                reason: e.to_string(),
            })?;

        for sex in [Sex::Male, Sex::Female] {
            let series = match sex {
                Sex::Male => &mut table.male,
                Sex::Female => &mut table.female,
            };
            for measurement in MeasurementType::ALL {
                series
                    .get_mut(measurement)
                    .sort_by_key(|point| point.age_in_days);
            }
        }

        table.validate()?;
        Ok(table)
    }

    /// Load a custom table from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ReferenceError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|_| ReferenceError::FileNotFound {
            path: path.to_path_buf(),
        })?;

        let table = Self::from_json_str(&content)?;
        info!(path = %path.display(), "Loaded custom reference table");
        Ok(table)
    }

    /// Check every series against the reference point invariants
    pub fn validate(&self) -> Result<(), ReferenceError> {
        for sex in [Sex::Male, Sex::Female] {
            for measurement in MeasurementType::ALL {
                validate_series(self.series(sex, measurement)).map_err(|reason| {
                    ReferenceError::InvalidSeries {
                        sex,
                        measurement,
                        reason,
                    }
                })?;
            }
        }
        Ok(())
    }
}

fn validate_series(series: &[ReferencePoint]) -> Result<(), String> {
    if series.is_empty() {
        return Err("series is empty".to_string());
    }

    for point in series {
        if !point.l.is_finite() {
            return Err(format!("L is not finite at {} days", point.age_in_days));
        }
        if !(point.m.is_finite() && point.m > 0.0) {
            return Err(format!("M must be positive at {} days", point.age_in_days));
        }
        if !(point.s.is_finite() && point.s > 0.0) {
            return Err(format!("S must be positive at {} days", point.age_in_days));
        }
    }

    if let Some(pair) = series
        .windows(2)
        .find(|pair| pair[0].age_in_days >= pair[1].age_in_days)
    {
        return Err(format!(
            "ages must be strictly increasing ({} then {})",
            pair[0].age_in_days, pair[1].age_in_days
        ));
    }

    Ok(())
}
