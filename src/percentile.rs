//! LMS percentile estimation against growth reference tables
//!
//! For a measurement at a given age the estimator:
//! 1. brackets the age between two tabulated reference points (ages outside
//!    the table reuse the nearest boundary point, there is no extrapolation),
//! 2. linearly interpolates L, M and S,
//! 3. converts the value to a Z-score with the LMS (Box-Cox normal) transform,
//! 4. maps the Z-score to a percentile with the Abramowitz–Stegun 26.2.17
//!    normal CDF approximation,
//! 5. rounds to one decimal and clamps to `[0.1, 99.9]`.
//!
//! [`PercentileCalculator::calculate_percentile`] never fails: any error
//! yields [`FALLBACK_PERCENTILE`]. The `try_` and `_with_diagnostics`
//! variants expose the reason for callers that must tell a true median from
//! a fallback.

use serde::Serialize;
use std::borrow::Cow;
use tracing::{debug, warn};

use crate::error::CalculationError;
use crate::models::{MeasurementType, Sex};
use crate::reference::{ReferencePoint, ReferenceTable};
use crate::units::round_to;

/// Returned whenever a percentile cannot be computed
pub const FALLBACK_PERCENTILE: f64 = 50.0;

/// Lowest percentile ever reported
pub const MIN_PERCENTILE: f64 = 0.1;

/// Highest percentile ever reported
pub const MAX_PERCENTILE: f64 = 99.9;

/// Interpolated LMS parameters at a specific age
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LmsParameters {
    pub l: f64,
    pub m: f64,
    pub s: f64,
}

impl LmsParameters {
    fn from_point(point: &ReferencePoint) -> Self {
        Self {
            l: point.l,
            m: point.m,
            s: point.s,
        }
    }

    fn check(self, age_in_days: i64) -> Result<Self, CalculationError> {
        let invalid = |parameter: &'static str, value: f64| CalculationError::InvalidParameter {
            parameter,
            value,
            age_in_days,
        };

        if !self.l.is_finite() {
            return Err(invalid("L", self.l));
        }
        if !(self.m.is_finite() && self.m > 0.0) {
            return Err(invalid("M", self.m));
        }
        if !(self.s.is_finite() && self.s > 0.0) {
            return Err(invalid("S", self.s));
        }
        Ok(self)
    }

    /// Z-score of `value` under these parameters
    ///
    /// `z = ((value/M)^L - 1) / (L·S)`, or `ln(value/M) / S` when `L = 0`.
    pub fn z_score(&self, value: f64) -> Result<f64, CalculationError> {
        if !value.is_finite() {
            return Err(CalculationError::NonFinite {
                calculation: "measurement value",
            });
        }
        if value <= 0.0 {
            return Err(CalculationError::NonPositiveValue { value });
        }

        let ratio = value / self.m;
        let z = if self.l == 0.0 {
            ratio.ln() / self.s
        } else {
            (ratio.powf(self.l) - 1.0) / (self.l * self.s)
        };

        if z.is_finite() {
            Ok(z)
        } else {
            Err(CalculationError::NonFinite {
                calculation: "z-score",
            })
        }
    }

    /// Measurement value that sits at Z-score `z` (inverse LMS transform)
    pub fn value_at_z(&self, z: f64) -> Result<f64, CalculationError> {
        let value = if self.l == 0.0 {
            self.m * (self.s * z).exp()
        } else {
            let base = 1.0 + self.l * self.s * z;
            if base <= 0.0 {
                return Err(CalculationError::NonFinite {
                    calculation: "inverse LMS transform",
                });
            }
            self.m * base.powf(1.0 / self.l)
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(CalculationError::NonFinite {
                calculation: "inverse LMS transform",
            })
        }
    }
}

/// Percentile together with how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileOutcome {
    /// Reported percentile; [`FALLBACK_PERCENTILE`] when `fallback` is set
    pub percentile: f64,

    /// Raw Z-score, when the computation got that far
    pub z_score: Option<f64>,

    /// Why the fallback value was returned
    pub fallback: Option<CalculationError>,
}

impl PercentileOutcome {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Abramowitz–Stegun approximation of the standard normal CDF
pub fn normal_cdf(z: f64) -> f64 {
    let t = 1.0 / (1.0 + 0.2316419 * z.abs());
    let d = 0.3989423 * (-z * z / 2.0).exp();
    let mut prob =
        d * t * (0.3193815 + t * (-0.3565638 + t * (1.781478 + t * (-1.821256 + t * 1.330274))));

    if z > 0.0 {
        prob = 1.0 - prob;
    }

    prob
}

/// Z-score whose [`normal_cdf`] equals `probability`, found by bisection so
/// that it inverts the same approximation the estimator uses
pub fn inverse_normal_cdf(probability: f64) -> f64 {
    let (mut low, mut high) = (-10.0_f64, 10.0_f64);
    for _ in 0..100 {
        let mid = (low + high) / 2.0;
        if normal_cdf(mid) < probability {
            low = mid;
        } else {
            high = mid;
        }
    }
    (low + high) / 2.0
}

/// LMS percentile calculator
pub struct PercentileCalculator;

impl PercentileCalculator {
    /// Percentile of `value` for a child of `age_in_days`, clamped to
    /// `[0.1, 99.9]` and rounded to one decimal.
    ///
    /// Returns exactly [`FALLBACK_PERCENTILE`] when the series is empty, the
    /// value is not positive, or the math does not produce a finite result.
    pub fn calculate_percentile(
        value: f64,
        age_in_days: i64,
        measurement: MeasurementType,
        sex: Sex,
        series: &[ReferencePoint],
    ) -> f64 {
        Self::calculate_percentile_with_diagnostics(value, age_in_days, measurement, sex, series)
            .percentile
    }

    /// Same as [`Self::calculate_percentile`] but also reports the Z-score
    /// and the reason for a fallback
    pub fn calculate_percentile_with_diagnostics(
        value: f64,
        age_in_days: i64,
        measurement: MeasurementType,
        sex: Sex,
        series: &[ReferencePoint],
    ) -> PercentileOutcome {
        match Self::z_score_for(value, age_in_days, measurement, sex, series) {
            Ok(z) => PercentileOutcome {
                percentile: Self::percentile_from_z(z),
                z_score: Some(z),
                fallback: None,
            },
            Err(err) => {
                warn!(
                    value,
                    age_in_days,
                    %measurement,
                    %sex,
                    error = %err,
                    "Percentile calculation fell back to the median"
                );
                PercentileOutcome {
                    percentile: FALLBACK_PERCENTILE,
                    z_score: None,
                    fallback: Some(err),
                }
            }
        }
    }

    /// Fallible percentile calculation
    pub fn try_calculate_percentile(
        value: f64,
        age_in_days: i64,
        measurement: MeasurementType,
        sex: Sex,
        series: &[ReferencePoint],
    ) -> Result<f64, CalculationError> {
        let z = Self::z_score_for(value, age_in_days, measurement, sex, series)?;
        Ok(Self::percentile_from_z(z))
    }

    /// Percentile looked up in the series of a full reference table
    pub fn percentile_in_table(
        table: &ReferenceTable,
        value: f64,
        age_in_days: i64,
        measurement: MeasurementType,
        sex: Sex,
    ) -> f64 {
        Self::calculate_percentile(
            value,
            age_in_days,
            measurement,
            sex,
            table.series(sex, measurement),
        )
    }

    /// Z-score of `value` at `age_in_days`
    pub fn z_score_for(
        value: f64,
        age_in_days: i64,
        measurement: MeasurementType,
        sex: Sex,
        series: &[ReferencePoint],
    ) -> Result<f64, CalculationError> {
        let lms = Self::interpolate_lms(series, age_in_days)
            .ok_or(CalculationError::EmptySeries { sex, measurement })?
            .check(age_in_days)?;
        lms.z_score(value)
    }

    /// Convert a Z-score to the reported percentile
    pub fn percentile_from_z(z: f64) -> f64 {
        let percentile = normal_cdf(z) * 100.0;
        round_to(percentile, 1).clamp(MIN_PERCENTILE, MAX_PERCENTILE)
    }

    /// LMS parameters at `age_in_days`, interpolated linearly between the
    /// bracketing reference points. `None` for an empty series.
    pub fn interpolate_lms(series: &[ReferencePoint], age_in_days: i64) -> Option<LmsParameters> {
        let sorted = sorted_by_age(series);
        let (lower_index, upper_index) = bracket(&sorted, age_in_days)?;

        let lower = &sorted[lower_index];
        let upper = &sorted[upper_index];
        let span = i64::from(upper.age_in_days) - i64::from(lower.age_in_days);

        if lower_index == upper_index || span == 0 {
            return Some(LmsParameters::from_point(lower));
        }

        let ratio = (age_in_days - i64::from(lower.age_in_days)) as f64 / span as f64;
        let lms = LmsParameters {
            l: lower.l + ratio * (upper.l - lower.l),
            m: lower.m + ratio * (upper.m - lower.m),
            s: lower.s + ratio * (upper.s - lower.s),
        };

        debug!(
            age_in_days,
            lower_age = lower.age_in_days,
            upper_age = upper.age_in_days,
            ratio,
            "Interpolated LMS parameters"
        );

        Some(lms)
    }

    /// Interpolated median (the 50th percentile curve) at `age_in_days`
    pub fn median_at_age(series: &[ReferencePoint], age_in_days: i64) -> Option<f64> {
        Self::interpolate_lms(series, age_in_days).map(|lms| lms.m)
    }

    /// Measurement value that lies on the given percentile at `age_in_days`
    pub fn value_at_percentile(
        percentile: f64,
        age_in_days: i64,
        measurement: MeasurementType,
        sex: Sex,
        series: &[ReferencePoint],
    ) -> Result<f64, CalculationError> {
        if !(percentile > 0.0 && percentile < 100.0) {
            return Err(CalculationError::PercentileOutOfRange { percentile });
        }

        let lms = Self::interpolate_lms(series, age_in_days)
            .ok_or(CalculationError::EmptySeries { sex, measurement })?
            .check(age_in_days)?;
        lms.value_at_z(inverse_normal_cdf(percentile / 100.0))
    }
}

fn sorted_by_age(series: &[ReferencePoint]) -> Cow<'_, [ReferencePoint]> {
    if series
        .windows(2)
        .all(|pair| pair[0].age_in_days <= pair[1].age_in_days)
    {
        Cow::Borrowed(series)
    } else {
        let mut owned = series.to_vec();
        owned.sort_by_key(|point| point.age_in_days);
        Cow::Owned(owned)
    }
}

/// Indices of the first adjacent pair enclosing `age_in_days`; both indices
/// collapse onto the first or last point outside the tabulated range
fn bracket(series: &[ReferencePoint], age_in_days: i64) -> Option<(usize, usize)> {
    let first = series.first()?;
    let last_index = series.len() - 1;

    if age_in_days <= i64::from(first.age_in_days) {
        return Some((0, 0));
    }
    if age_in_days >= i64::from(series[last_index].age_in_days) {
        return Some((last_index, last_index));
    }

    let bracket = series
        .windows(2)
        .position(|pair| {
            age_in_days >= i64::from(pair[0].age_in_days)
                && age_in_days <= i64::from(pair[1].age_in_days)
        })
        .map(|index| (index, index + 1))
        .unwrap_or((0, last_index));

    Some(bracket)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn male_weight() -> &'static [ReferencePoint] {
        ReferenceTable::who().series(Sex::Male, MeasurementType::Weight)
    }

    fn percentile(value: f64, age: i64) -> f64 {
        PercentileCalculator::calculate_percentile(
            value,
            age,
            MeasurementType::Weight,
            Sex::Male,
            male_weight(),
        )
    }

    #[test]
    fn test_median_at_birth() {
        let p = percentile(3.3464, 0);
        assert!((p - 50.0).abs() <= 1.0, "got {}", p);
    }

    #[test]
    fn test_median_at_every_tabulated_age() {
        let table = ReferenceTable::who();
        for sex in [Sex::Male, Sex::Female] {
            for measurement in MeasurementType::ALL {
                let series = table.series(sex, measurement);
                for point in series {
                    let p = PercentileCalculator::calculate_percentile(
                        point.m,
                        i64::from(point.age_in_days),
                        measurement,
                        sex,
                        series,
                    );
                    assert!(
                        (p - 50.0).abs() <= 1.0,
                        "{} {} at {} days gave {}",
                        sex,
                        measurement,
                        point.age_in_days,
                        p
                    );
                }
            }
        }
    }

    #[test]
    fn test_interpolation_between_ages() {
        let p = percentile(4.0, 15);
        assert!(p > 0.0 && p < 100.0);

        let lms = PercentileCalculator::interpolate_lms(male_weight(), 15).unwrap();
        assert!((lms.m - (3.3464 + 4.4709) / 2.0).abs() < 1e-9);
        assert!((lms.l - (0.3487 + 0.2581) / 2.0).abs() < 1e-9);
        assert!((lms.s - (0.14602 + 0.13395) / 2.0).abs() < 1e-9);

        let median = PercentileCalculator::median_at_age(male_weight(), 15).unwrap();
        assert!((median - lms.m).abs() < 1e-12);
    }

    #[test]
    fn test_low_and_high_values() {
        assert!(percentile(2.5, 0) < 50.0);
        assert!(percentile(4.5, 0) > 50.0);
        assert_eq!(percentile(0.5, 0), MIN_PERCENTILE);
        assert_eq!(percentile(30.0, 0), MAX_PERCENTILE);
    }

    #[test]
    fn test_boundary_clamping() {
        for value in [2.8, 3.3464, 4.1] {
            assert_eq!(percentile(value, -10), percentile(value, 0));
        }
        for value in [10.5, 12.1515, 14.0] {
            assert_eq!(percentile(value, 10_000), percentile(value, 731));
        }

        let before = PercentileCalculator::interpolate_lms(male_weight(), -10).unwrap();
        assert_eq!(before.m, 3.3464);
        let after = PercentileCalculator::interpolate_lms(male_weight(), 900).unwrap();
        assert_eq!(after.m, 12.1515);
    }

    #[test]
    fn test_unsorted_series_is_sorted_first() {
        let mut shuffled = male_weight().to_vec();
        shuffled.reverse();
        shuffled.swap(3, 17);

        for (value, age) in [(4.0, 15), (8.0, 200), (11.0, 600)] {
            let expected = percentile(value, age);
            let actual = PercentileCalculator::calculate_percentile(
                value,
                age,
                MeasurementType::Weight,
                Sex::Male,
                &shuffled,
            );
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_single_point_series() {
        let series = [ReferencePoint {
            age_in_days: 100,
            l: 1.0,
            m: 60.0,
            s: 0.05,
        }];
        let lms = PercentileCalculator::interpolate_lms(&series, 5).unwrap();
        assert_eq!(lms.m, 60.0);
        assert_eq!(
            PercentileCalculator::calculate_percentile(
                60.0,
                500,
                MeasurementType::Height,
                Sex::Female,
                &series
            ),
            50.0
        );
    }

    #[test]
    fn test_box_cox_zero_lambda() {
        let series = [ReferencePoint {
            age_in_days: 0,
            l: 0.0,
            m: 10.0,
            s: 0.1,
        }];
        let value = 10.0 * (0.1_f64).exp();
        let z = PercentileCalculator::z_score_for(
            value,
            0,
            MeasurementType::Weight,
            Sex::Male,
            &series,
        )
        .unwrap();
        assert!((z - 1.0).abs() < 1e-12);
        assert_eq!(PercentileCalculator::percentile_from_z(z), 84.1);
    }

    #[test]
    fn test_fallbacks_return_median() {
        let empty: [ReferencePoint; 0] = [];
        assert_eq!(
            PercentileCalculator::calculate_percentile(
                0.0,
                0,
                MeasurementType::Weight,
                Sex::Male,
                &empty
            ),
            FALLBACK_PERCENTILE
        );
        assert_eq!(percentile(0.0, 30), FALLBACK_PERCENTILE);
        assert_eq!(percentile(-3.0, 30), FALLBACK_PERCENTILE);
        assert_eq!(percentile(f64::NAN, 30), FALLBACK_PERCENTILE);
        assert_eq!(percentile(f64::INFINITY, 30), FALLBACK_PERCENTILE);

        let broken = [ReferencePoint {
            age_in_days: 0,
            l: 0.5,
            m: 0.0,
            s: 0.1,
        }];
        assert_eq!(
            PercentileCalculator::calculate_percentile(
                3.0,
                0,
                MeasurementType::Weight,
                Sex::Male,
                &broken
            ),
            FALLBACK_PERCENTILE
        );
    }

    #[test]
    fn test_diagnostics_distinguish_fallback() {
        let outcome = PercentileCalculator::calculate_percentile_with_diagnostics(
            3.3464,
            0,
            MeasurementType::Weight,
            Sex::Male,
            male_weight(),
        );
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.z_score, Some(0.0));

        let outcome = PercentileCalculator::calculate_percentile_with_diagnostics(
            3.0,
            0,
            MeasurementType::Head,
            Sex::Female,
            &[],
        );
        assert!(outcome.is_fallback());
        assert_eq!(outcome.percentile, 50.0);
        assert_eq!(
            outcome.fallback,
            Some(CalculationError::EmptySeries {
                sex: Sex::Female,
                measurement: MeasurementType::Head,
            })
        );

        let result = PercentileCalculator::try_calculate_percentile(
            -1.0,
            0,
            MeasurementType::Weight,
            Sex::Male,
            male_weight(),
        );
        assert_eq!(result, Err(CalculationError::NonPositiveValue { value: -1.0 }));
    }

    #[test]
    fn test_normal_cdf_shape() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-4);
        assert!((normal_cdf(1.96) - 0.975).abs() < 1e-4);
        assert!((normal_cdf(-1.96) - 0.025).abs() < 1e-4);
        for z in [0.3, 1.0, 2.5, 4.0] {
            assert!((normal_cdf(z) + normal_cdf(-z) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_value_at_percentile_inverts_estimator() {
        let series = male_weight();
        for target in [3.0, 15.0, 50.0, 85.0, 97.0] {
            let value = PercentileCalculator::value_at_percentile(
                target,
                183,
                MeasurementType::Weight,
                Sex::Male,
                series,
            )
            .unwrap();
            let p = percentile(value, 183);
            assert!((p - target).abs() <= 0.1, "{} -> {} -> {}", target, value, p);
        }

        let median = PercentileCalculator::value_at_percentile(
            50.0,
            183,
            MeasurementType::Weight,
            Sex::Male,
            series,
        )
        .unwrap();
        assert!((median - 7.9340).abs() < 0.01);

        assert!(matches!(
            PercentileCalculator::value_at_percentile(
                100.0,
                183,
                MeasurementType::Weight,
                Sex::Male,
                series
            ),
            Err(CalculationError::PercentileOutOfRange { .. })
        ));
    }
}
