//! Shared forecasting flow: validate, dispatch, backtest, package.

use chrono::Utc;

use stockcast_core::{PipelineError, PipelineResult, ProductId};

use crate::metrics::{Metrics, Quality};
use crate::moving_average;
use crate::params::{Algorithm, ForecastParams};
use crate::result::{level_shift_advisory, ForecastResult};
use crate::single_smoothing;
use crate::triple_smoothing;

/// Raw output of one algorithm run, before packaging.
#[derive(Debug)]
pub(crate) struct AlgorithmRun {
    pub predictions: Vec<f64>,
    pub advisories: Vec<String>,
    pub has_trend: bool,
    pub has_seasonality: bool,
    pub seasonal_period: Option<usize>,
    /// Parameters actually used (after clamping).
    pub params: ForecastParams,
}

/// Validate a series against an algorithm's requirements.
pub(crate) fn validate(values: &[f64], algorithm: Algorithm) -> PipelineResult<()> {
    let needed = algorithm.min_points();
    if values.len() < needed {
        return Err(PipelineError::insufficient_data(
            needed,
            values.len(),
            algorithm.label().to_lowercase(),
        ));
    }
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(PipelineError::invalid_parameter(
            "demand values must be finite and non-negative",
        ));
    }
    Ok(())
}

/// Pure prediction dispatch for already-clamped parameters.
fn predict_with(params: &ForecastParams, values: &[f64], horizon: usize) -> Vec<f64> {
    match params {
        ForecastParams::MovingAverage(p) => moving_average::predict(values, p.window, horizon),
        ForecastParams::SingleSmoothing(p) => single_smoothing::predict(values, p.alpha, horizon),
        ForecastParams::TripleSmoothing(p) => triple_smoothing::predict(values, *p, horizon),
    }
}

/// In-sample backtest: refit on the training prefix and score the last
/// `min(horizon, len / 4)` points, keeping the prefix at or above
/// `min_prefix`. No usable slice yields zero metrics flagged unreliable.
///
/// `min_prefix` is normally the algorithm's own minimum; AUTO selection
/// passes the largest candidate minimum so every candidate is scored over
/// the same slice.
pub(crate) fn backtest_with_min(
    values: &[f64],
    params: &ForecastParams,
    horizon: usize,
    min_prefix: usize,
) -> Metrics {
    let len = values.len();
    let k = horizon.min(len / 4).min(len.saturating_sub(min_prefix));
    if k == 0 {
        return Metrics::unreliable_zero();
    }
    let train = &values[..len - k];
    let predicted = predict_with(params, train, k);
    Metrics::compute(&values[len - k..], &predicted)
}

fn backtest(values: &[f64], params: &ForecastParams, horizon: usize) -> Metrics {
    backtest_with_min(values, params, horizon, params.algorithm().min_points())
}

/// Run one algorithm over a demand value sequence.
pub fn forecast_values(
    product_id: ProductId,
    values: &[f64],
    params: ForecastParams,
    horizon: usize,
) -> PipelineResult<ForecastResult> {
    if horizon == 0 {
        return Err(PipelineError::invalid_parameter("horizon must be at least 1"));
    }
    let algorithm = params.algorithm();
    validate(values, algorithm)?;

    let run = match params {
        ForecastParams::MovingAverage(p) => moving_average::run(values, p, horizon),
        ForecastParams::SingleSmoothing(p) => single_smoothing::run(values, p, horizon)?,
        ForecastParams::TripleSmoothing(p) => triple_smoothing::run(values, p, horizon)?,
    };

    if run.predictions.iter().any(|p| !p.is_finite()) {
        return Err(PipelineError::computation(
            product_id,
            algorithm.code(),
            "non-finite prediction",
        ));
    }

    let metrics = backtest(values, &run.params, horizon);
    let quality = Quality::from_mape(metrics.mape);

    let mut advisories = run.advisories;
    if let Some(advisory) = level_shift_advisory(values, &run.predictions) {
        advisories.push(advisory);
    }
    if !metrics.mape_reliable {
        advisories.push(
            "backtest MAPE is unreliable (no usable validation slice or all actuals zero)"
                .to_string(),
        );
    }

    Ok(ForecastResult {
        algorithm,
        label: algorithm.label().to_string(),
        total_predicted: run.predictions.iter().sum(),
        predictions: run.predictions,
        metrics,
        quality,
        advisories,
        has_trend: run.has_trend,
        has_seasonality: run.has_seasonality,
        seasonal_period: run.seasonal_period,
        params: run.params,
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{MovingAverageParams, SingleSmoothingParams, TripleSmoothingParams};

    fn ten_days() -> Vec<f64> {
        vec![10.0, 12.0, 11.0, 13.0, 12.0, 14.0, 13.0, 15.0, 14.0, 16.0]
    }

    #[test]
    fn moving_average_end_to_end_example() {
        let params = ForecastParams::MovingAverage(MovingAverageParams { window: 3 });
        let result = forecast_values(ProductId::new(), &ten_days(), params, 2).unwrap();

        assert_eq!(result.algorithm, Algorithm::MovingAverage);
        assert_eq!(result.predictions.len(), 2);
        assert!((result.predictions[0] - 15.0).abs() < 1e-9);
        assert!((result.predictions[1] - 15.0).abs() < 1e-9);
        assert!((result.total_predicted - 30.0).abs() < 1e-9);

        // Backtest: 2-point tail, train on the first 8.
        // Window-3 predictions from the prefix are 14.0 then 14.0;
        // actuals are 14 and 16 -> MAPE = (0% + 12.5%) / 2 = 6.25%.
        assert!(result.metrics.mape_reliable);
        assert!((result.metrics.mape - 6.25).abs() < 1e-9);
        assert_eq!(result.quality, Quality::Excellent);
    }

    #[test]
    fn backtest_prefix_floor_controls_the_slice() {
        // 16 rising values, horizon 7: a floor of 7 leaves a 4-point tail,
        // a floor of 14 leaves 2. Window-3 rolling predictions on the
        // 2-point tail give MAPE = (25/3 + 32/3) / 2 = 9.5 exactly.
        let values: Vec<f64> = (0..16).map(|i| 10.0 + i as f64).collect();
        let params = ForecastParams::MovingAverage(MovingAverageParams { window: 3 });

        let floored = backtest_with_min(&values, &params, 7, 14);
        assert!(floored.mape_reliable);
        assert!((floored.mape - 9.5).abs() < 1e-9);

        let own = backtest_with_min(&values, &params, 7, 7);
        assert!(own.mape_reliable);
        assert!(own.mape > floored.mape);

        // Floor leaving no tail at all: unreliable zero metrics.
        let none = backtest_with_min(&values, &params, 7, 16);
        assert!(!none.mape_reliable);
    }

    #[test]
    fn insufficient_history_names_the_requirement() {
        let params = ForecastParams::SingleSmoothing(SingleSmoothingParams::default());
        let err = forecast_values(ProductId::new(), &[1.0, 2.0, 3.0], params, 5).unwrap_err();
        assert_eq!(
            err,
            PipelineError::insufficient_data(5, 3, "single exponential smoothing")
        );
    }

    #[test]
    fn negative_values_are_rejected() {
        let mut values = ten_days();
        values[4] = -1.0;
        let params = ForecastParams::MovingAverage(MovingAverageParams::default());
        let err = forecast_values(ProductId::new(), &values, params, 2).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter(_)));
    }

    #[test]
    fn nan_values_are_rejected() {
        let mut values = ten_days();
        values[0] = f64::NAN;
        let params = ForecastParams::SingleSmoothing(SingleSmoothingParams::default());
        let err = forecast_values(ProductId::new(), &values, params, 2).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter(_)));
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let params = ForecastParams::MovingAverage(MovingAverageParams::default());
        let err = forecast_values(ProductId::new(), &ten_days(), params, 0).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter(_)));
    }

    #[test]
    fn stable_series_notes_stability() {
        let values = vec![20.0; 30];
        let params = ForecastParams::SingleSmoothing(SingleSmoothingParams::default());
        let result = forecast_values(ProductId::new(), &values, params, 7).unwrap();
        assert!(result.advisories.iter().any(|a| a.contains("stable")));
    }

    #[test]
    fn all_zero_series_flags_unreliable_mape() {
        let values = vec![0.0; 20];
        let params = ForecastParams::MovingAverage(MovingAverageParams::default());
        let result = forecast_values(ProductId::new(), &values, params, 5).unwrap();
        assert!(!result.metrics.mape_reliable);
        assert!(result.advisories.iter().any(|a| a.contains("unreliable")));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: predictions from every algorithm are non-negative
            /// for any non-negative demand series.
            #[test]
            fn all_algorithms_predict_non_negative(
                values in proptest::collection::vec(0.0f64..1000.0, 14..50),
                horizon in 1usize..20,
            ) {
                let id = ProductId::new();
                for params in [
                    ForecastParams::MovingAverage(MovingAverageParams::default()),
                    ForecastParams::SingleSmoothing(SingleSmoothingParams::default()),
                    ForecastParams::TripleSmoothing(TripleSmoothingParams::default()),
                ] {
                    let result = forecast_values(id, &values, params, horizon).unwrap();
                    prop_assert_eq!(result.predictions.len(), horizon);
                    prop_assert!(result.predictions.iter().all(|p| *p >= 0.0));
                }
            }
        }
    }
}
