//! Forecast-error metrics shared by all algorithms.
//!
//! Metrics compare a trailing slice of actual history against
//! model-predicted values for that same slice (an in-sample backtest).

use serde::{Deserialize, Serialize};

/// MAE / MAPE / RMSE over the backtest slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub mae: f64,
    /// Mean absolute percentage error, over points with non-zero actuals.
    pub mape: f64,
    pub rmse: f64,
    /// False when MAPE could not be computed meaningfully (all actuals zero,
    /// or no backtest slice was available).
    pub mape_reliable: bool,
}

impl Metrics {
    /// Placeholder metrics when no backtest slice exists.
    pub fn unreliable_zero() -> Self {
        Self {
            mae: 0.0,
            mape: 0.0,
            rmse: 0.0,
            mape_reliable: false,
        }
    }

    /// Compare actuals against predictions (equal, non-zero length).
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        debug_assert_eq!(actual.len(), predicted.len());
        if actual.is_empty() {
            return Self::unreliable_zero();
        }
        let n = actual.len() as f64;

        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut pct_sum = 0.0;
        let mut pct_count = 0usize;
        for (a, p) in actual.iter().zip(predicted) {
            let err = a - p;
            abs_sum += err.abs();
            sq_sum += err * err;
            if *a != 0.0 {
                pct_sum += (err.abs() / a.abs()) * 100.0;
                pct_count += 1;
            }
        }

        let (mape, mape_reliable) = if pct_count > 0 {
            (pct_sum / pct_count as f64, true)
        } else {
            (0.0, false)
        };

        Self {
            mae: abs_sum / n,
            mape,
            rmse: (sq_sum / n).sqrt(),
            mape_reliable,
        }
    }
}

/// Forecast quality label derived from MAPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Quality {
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl Quality {
    pub fn from_mape(mape: f64) -> Self {
        if mape < 10.0 {
            Quality::Excellent
        } else if mape < 20.0 {
            Quality::Good
        } else if mape < 50.0 {
            Quality::Acceptable
        } else {
            Quality::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Excellent => "EXCELLENT",
            Quality::Good => "GOOD",
            Quality::Acceptable => "ACCEPTABLE",
            Quality::Poor => "POOR",
        }
    }
}

/// Arithmetic mean; 0 for an empty slice.
pub(crate) fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Sample standard deviation (n-1), deterministic.
pub(crate) fn stddev_sample(xs: &[f64], mean: f64) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let var = xs
        .iter()
        .map(|x| {
            let d = x - mean;
            d * d
        })
        .sum::<f64>()
        / ((xs.len() - 1) as f64);
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_forecast_has_zero_errors() {
        let m = Metrics::compute(&[10.0, 20.0, 30.0], &[10.0, 20.0, 30.0]);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.mape, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert!(m.mape_reliable);
    }

    #[test]
    fn known_errors() {
        // errors: |10-12|=2, |20-18|=2 -> MAE 2, RMSE 2
        let m = Metrics::compute(&[10.0, 20.0], &[12.0, 18.0]);
        assert_eq!(m.mae, 2.0);
        assert_eq!(m.rmse, 2.0);
        // MAPE = (20% + 10%) / 2 = 15%
        assert!((m.mape - 15.0).abs() < 1e-9);
    }

    #[test]
    fn mape_skips_zero_actuals() {
        let m = Metrics::compute(&[0.0, 10.0], &[5.0, 11.0]);
        assert!(m.mape_reliable);
        assert!((m.mape - 10.0).abs() < 1e-9);
    }

    #[test]
    fn all_zero_actuals_flag_mape_unreliable() {
        let m = Metrics::compute(&[0.0, 0.0], &[1.0, 2.0]);
        assert_eq!(m.mape, 0.0);
        assert!(!m.mape_reliable);
    }

    #[test]
    fn quality_thresholds() {
        assert_eq!(Quality::from_mape(9.9), Quality::Excellent);
        assert_eq!(Quality::from_mape(10.0), Quality::Good);
        assert_eq!(Quality::from_mape(19.9), Quality::Good);
        assert_eq!(Quality::from_mape(20.0), Quality::Acceptable);
        assert_eq!(Quality::from_mape(49.9), Quality::Acceptable);
        assert_eq!(Quality::from_mape(50.0), Quality::Poor);
        assert_eq!(Quality::Poor.as_str(), "POOR");
    }
}
