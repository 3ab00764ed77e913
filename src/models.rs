use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sex used to select the WHO reference series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "boy" => Ok(Sex::Male),
            "female" | "f" | "girl" => Ok(Sex::Female),
            _ => Err(format!("Invalid sex: {}", s)),
        }
    }
}

/// Kinds of growth measurement tracked against the reference standards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementType {
    /// Body weight in kilograms
    Weight,
    /// Recumbent length / height in centimeters
    Height,
    /// Head circumference in centimeters
    Head,
}

impl MeasurementType {
    pub const ALL: [MeasurementType; 3] = [
        MeasurementType::Weight,
        MeasurementType::Height,
        MeasurementType::Head,
    ];

    /// SI unit the core stores this measurement in
    pub fn metric_unit(&self) -> &'static str {
        match self {
            MeasurementType::Weight => "kg",
            MeasurementType::Height | MeasurementType::Head => "cm",
        }
    }

    /// Unit used for display in the imperial system
    pub fn imperial_unit(&self) -> &'static str {
        match self {
            MeasurementType::Weight => "lb",
            MeasurementType::Height | MeasurementType::Head => "in",
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementType::Weight => write!(f, "weight"),
            MeasurementType::Height => write!(f, "height"),
            MeasurementType::Head => write!(f, "head"),
        }
    }
}

impl FromStr for MeasurementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weight" | "w" => Ok(MeasurementType::Weight),
            "height" | "length" | "h" => Ok(MeasurementType::Height),
            "head" | "hc" | "head_circumference" => Ok(MeasurementType::Head),
            _ => Err(format!("Invalid measurement type: {}", s)),
        }
    }
}

/// Unit preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "si" => Ok(Units::Metric),
            "imperial" | "us" => Ok(Units::Imperial),
            _ => Err(format!("Invalid unit system: {}", s)),
        }
    }
}

/// Direction of change between two consecutive measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
    None,
}

impl Trend {
    /// Single-character marker used in terminal tables
    pub fn symbol(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Stable => "→",
            Trend::None => "",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
            Trend::Stable => write!(f, "stable"),
            Trend::None => write!(f, "none"),
        }
    }
}

/// Baby profile supplying the birth date and sex for percentile lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BabyProfile {
    /// Unique profile identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Date of birth
    pub birth_date: NaiveDate,

    /// Sex used to pick the reference series
    pub sex: Sex,

    /// Birth weight in kilograms
    pub birth_weight: Option<f64>,

    /// Birth length in centimeters
    pub birth_height: Option<f64>,

    /// Birth head circumference in centimeters
    pub birth_head: Option<f64>,
}

impl BabyProfile {
    pub fn new(name: impl Into<String>, birth_date: NaiveDate, sex: Sex) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            birth_date,
            sex,
            birth_weight: None,
            birth_height: None,
            birth_head: None,
        }
    }
}

/// A single growth measurement, stored in SI units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Unique identifier for the measurement
    pub id: String,

    /// Measurement date
    pub date: NaiveDate,

    /// Age at measurement, derived from the birth date
    pub age_in_days: i64,

    /// Weight in kilograms
    pub weight_kg: f64,

    /// Length / height in centimeters
    pub height_cm: f64,

    /// Head circumference in centimeters
    pub head_cm: f64,

    /// Weight-for-age percentile
    pub weight_percentile: Option<f64>,

    /// Length-for-age percentile
    pub height_percentile: Option<f64>,

    /// Head-circumference-for-age percentile
    pub head_percentile: Option<f64>,

    /// Optional free-form notes
    pub notes: Option<String>,
}

impl Measurement {
    /// Stored SI value for the given measurement type
    pub fn value(&self, measurement: MeasurementType) -> f64 {
        match measurement {
            MeasurementType::Weight => self.weight_kg,
            MeasurementType::Height => self.height_cm,
            MeasurementType::Head => self.head_cm,
        }
    }

    /// Percentile previously computed for the given measurement type
    pub fn percentile(&self, measurement: MeasurementType) -> Option<f64> {
        match measurement {
            MeasurementType::Weight => self.weight_percentile,
            MeasurementType::Height => self.height_percentile,
            MeasurementType::Head => self.head_percentile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Male".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("girl".parse::<Sex>().unwrap(), Sex::Female);
        assert!("other".parse::<Sex>().is_err());

        assert_eq!("length".parse::<MeasurementType>().unwrap(), MeasurementType::Height);
        assert_eq!("hc".parse::<MeasurementType>().unwrap(), MeasurementType::Head);
        assert_eq!("imperial".parse::<Units>().unwrap(), Units::Imperial);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&MeasurementType::Head).unwrap();
        assert_eq!(json, "\"head\"");
        let trend: Trend = serde_json::from_str("\"stable\"").unwrap();
        assert_eq!(trend, Trend::Stable);
    }

    #[test]
    fn test_measurement_accessors() {
        let m = Measurement {
            id: "m1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            age_in_days: 60,
            weight_kg: 5.4,
            height_cm: 58.0,
            head_cm: 39.0,
            weight_percentile: Some(45.2),
            height_percentile: None,
            head_percentile: Some(50.1),
            notes: None,
        };

        assert_eq!(m.value(MeasurementType::Height), 58.0);
        assert_eq!(m.percentile(MeasurementType::Weight), Some(45.2));
        assert_eq!(m.percentile(MeasurementType::Height), None);
    }
}
