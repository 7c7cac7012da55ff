//! Forecast result snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::{mean, Metrics, Quality};
use crate::params::{Algorithm, ForecastParams};

/// A completed forecast: predictions, backtest metrics and advisories.
///
/// This is a snapshot with a generation timestamp; consumers must not assume
/// freshness beyond their own refresh cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub algorithm: Algorithm,
    pub label: String,
    /// One prediction per future period; length equals the horizon.
    pub predictions: Vec<f64>,
    /// Sum of predictions over the horizon.
    pub total_predicted: f64,
    pub metrics: Metrics,
    pub quality: Quality,
    pub advisories: Vec<String>,
    pub has_trend: bool,
    pub has_seasonality: bool,
    pub seasonal_period: Option<usize>,
    /// Parameters actually used (after clamping).
    pub params: ForecastParams,
    pub generated_at: DateTime<Utc>,
}

/// Relative mean shift beyond which an increase/decrease advisory is raised.
pub(crate) const LEVEL_SHIFT_THRESHOLD: f64 = 0.20;

/// Compare predicted mean against historical mean and describe the shift.
pub(crate) fn level_shift_advisory(history: &[f64], predictions: &[f64]) -> Option<String> {
    let hist_mean = mean(history);
    if hist_mean == 0.0 {
        return None;
    }
    let pred_mean = mean(predictions);
    let change = (pred_mean - hist_mean) / hist_mean;
    let advisory = if change > LEVEL_SHIFT_THRESHOLD {
        format!(
            "expected demand increase of {:.0}% vs recent history",
            change * 100.0
        )
    } else if change < -LEVEL_SHIFT_THRESHOLD {
        format!(
            "expected demand decrease of {:.0}% vs recent history",
            -change * 100.0
        )
    } else {
        "demand expected to remain stable".to_string()
    };
    Some(advisory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_forecast_notes_stability() {
        let advisory = level_shift_advisory(&[10.0, 10.0], &[10.5, 9.5]).unwrap();
        assert!(advisory.contains("stable"));
    }

    #[test]
    fn large_increase_is_flagged() {
        let advisory = level_shift_advisory(&[10.0, 10.0], &[15.0, 15.0]).unwrap();
        assert!(advisory.contains("increase of 50%"));
    }

    #[test]
    fn large_decrease_is_flagged() {
        let advisory = level_shift_advisory(&[10.0, 10.0], &[5.0, 5.0]).unwrap();
        assert!(advisory.contains("decrease of 50%"));
    }

    #[test]
    fn zero_history_yields_no_advisory() {
        assert!(level_shift_advisory(&[0.0, 0.0], &[5.0]).is_none());
    }
}
