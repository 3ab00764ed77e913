//! Trend classification between consecutive measurements

use serde::Serialize;

use crate::models::{Measurement, MeasurementType, Trend};

/// Percent change beyond which a measurement counts as moving up or down
pub const DEFAULT_TREND_THRESHOLD_PERCENT: f64 = 2.0;

/// Classify `current` against `previous` with the default 2% threshold.
///
/// A missing or zero `previous` value gives [`Trend::None`].
pub fn get_measurement_trend(current: f64, previous: Option<f64>) -> Trend {
    trend_with_threshold(current, previous, DEFAULT_TREND_THRESHOLD_PERCENT)
}

pub fn trend_with_threshold(current: f64, previous: Option<f64>, threshold_percent: f64) -> Trend {
    let previous = match previous {
        Some(previous) if previous != 0.0 => previous,
        _ => return Trend::None,
    };

    let percent_change = (current - previous) / previous * 100.0;

    if percent_change > threshold_percent {
        Trend::Up
    } else if percent_change < -threshold_percent {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Per-field trends of one measurement against its predecessor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasurementTrends {
    pub weight: Trend,
    pub height: Trend,
    pub head: Trend,
}

impl MeasurementTrends {
    pub fn get(&self, measurement: MeasurementType) -> Trend {
        match measurement {
            MeasurementType::Weight => self.weight,
            MeasurementType::Height => self.height,
            MeasurementType::Head => self.head,
        }
    }
}

/// Trends for every record of a history, compared with the chronologically
/// previous record. The result is aligned with the input order, which may
/// be newest-first or oldest-first.
pub fn measurement_trends(
    history: &[Measurement],
    threshold_percent: f64,
) -> Vec<MeasurementTrends> {
    let mut order: Vec<usize> = (0..history.len()).collect();
    order.sort_by_key(|&index| history[index].date);

    let mut trends = vec![
        MeasurementTrends {
            weight: Trend::None,
            height: Trend::None,
            head: Trend::None,
        };
        history.len()
    ];

    for pair in order.windows(2) {
        let previous = &history[pair[0]];
        let current = &history[pair[1]];
        let trend_for = |measurement: MeasurementType| {
            trend_with_threshold(
                current.value(measurement),
                Some(previous.value(measurement)),
                threshold_percent,
            )
        };

        trends[pair[1]] = MeasurementTrends {
            weight: trend_for(MeasurementType::Weight),
            height: trend_for(MeasurementType::Height),
            head: trend_for(MeasurementType::Head),
        };
    }

    trends
}
