//! Metric / imperial conversions for growth measurements
//!
//! Conversions are rounded for display and storage, so they are lossy:
//! kilograms keep three decimals, pounds two, centimeters and inches one.

use crate::models::{MeasurementType, Units};

/// Pounds per kilogram
pub const LB_PER_KG: f64 = 2.20462;

/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;

/// Round to a fixed number of decimal places
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn kg_to_lb(kg: f64) -> f64 {
    round_to(kg * LB_PER_KG, 2)
}

pub fn lb_to_kg(lb: f64) -> f64 {
    round_to(lb / LB_PER_KG, 3)
}

pub fn cm_to_in(cm: f64) -> f64 {
    round_to(cm / CM_PER_INCH, 1)
}

pub fn in_to_cm(inches: f64) -> f64 {
    round_to(inches * CM_PER_INCH, 1)
}

/// Convert a value entered in `units` into the SI unit stored for `measurement`
pub fn to_metric(value: f64, measurement: MeasurementType, units: Units) -> f64 {
    match (units, measurement) {
        (Units::Metric, _) => value,
        (Units::Imperial, MeasurementType::Weight) => lb_to_kg(value),
        (Units::Imperial, MeasurementType::Height | MeasurementType::Head) => in_to_cm(value),
    }
}

/// Convert a stored SI value for display in `units`
pub fn from_metric(value: f64, measurement: MeasurementType, units: Units) -> f64 {
    match (units, measurement) {
        (Units::Metric, _) => value,
        (Units::Imperial, MeasurementType::Weight) => kg_to_lb(value),
        (Units::Imperial, MeasurementType::Height | MeasurementType::Head) => cm_to_in(value),
    }
}

/// Unit label for a measurement type in a unit system
pub fn unit_label(measurement: MeasurementType, units: Units) -> &'static str {
    match units {
        Units::Metric => measurement.metric_unit(),
        Units::Imperial => measurement.imperial_unit(),
    }
}
