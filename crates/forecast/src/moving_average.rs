//! Moving-average forecasting.
//!
//! Rolling forecast: each step predicts the mean of the last `window`
//! known-or-predicted values, then appends the prediction to the working
//! series so the next step's window includes it. Not a flat repeat of
//! history.

use tracing::warn;

use crate::engine::AlgorithmRun;
use crate::metrics::mean;
use crate::params::{ForecastParams, MovingAverageParams};

/// Smallest permitted window.
const MIN_WINDOW: usize = 3;

fn clamped_window(window: usize, len: usize) -> usize {
    window.clamp(MIN_WINDOW, len.max(MIN_WINDOW))
}

/// Rolling moving-average predictions, clamped to >= 0.
pub(crate) fn predict(values: &[f64], window: usize, horizon: usize) -> Vec<f64> {
    let mut working: Vec<f64> = values.to_vec();
    let mut predictions = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        let w = clamped_window(window, working.len()).min(working.len());
        let tail = &working[working.len() - w..];
        let prediction = mean(tail).max(0.0);
        predictions.push(prediction);
        working.push(prediction);
    }
    predictions
}

pub(crate) fn run(values: &[f64], params: MovingAverageParams, horizon: usize) -> AlgorithmRun {
    let mut advisories = Vec::new();
    let window = clamped_window(params.window, values.len());
    if window != params.window {
        warn!(
            requested = params.window,
            used = window,
            len = values.len(),
            "moving-average window adjusted"
        );
        advisories.push(format!(
            "window adjusted from {} to {} to fit the series",
            params.window, window
        ));
    }

    AlgorithmRun {
        predictions: predict(values, window, horizon),
        advisories,
        has_trend: false,
        has_seasonality: false,
        seasonal_period: None,
        params: ForecastParams::MovingAverage(MovingAverageParams { window }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_series_predicts_the_constant() {
        let values = vec![8.0; 12];
        let predictions = predict(&values, 5, 6);
        assert!(predictions.iter().all(|p| (p - 8.0).abs() < 1e-12));
    }

    #[test]
    fn rolling_window_includes_prior_predictions() {
        // 10-day example: window 3, horizon 2.
        let values = vec![10.0, 12.0, 11.0, 13.0, 12.0, 14.0, 13.0, 15.0, 14.0, 16.0];
        let predictions = predict(&values, 3, 2);
        // First step: mean(15, 14, 16) = 15.
        assert!((predictions[0] - 15.0).abs() < 1e-9);
        // Second step rolls the prediction in: mean(14, 16, 15) = 15.
        assert!((predictions[1] - 15.0).abs() < 1e-9);
    }

    #[test]
    fn window_is_clamped_with_advisory() {
        let values = vec![5.0; 8];
        let run = run(&values, MovingAverageParams { window: 100 }, 3);
        assert_eq!(
            run.params,
            ForecastParams::MovingAverage(MovingAverageParams { window: 8 })
        );
        assert_eq!(run.advisories.len(), 1);
        assert!(run.advisories[0].contains("adjusted from 100 to 8"));

        let run = run_small_window(&values);
        assert_eq!(
            run.params,
            ForecastParams::MovingAverage(MovingAverageParams { window: 3 })
        );
    }

    fn run_small_window(values: &[f64]) -> AlgorithmRun {
        run(values, MovingAverageParams { window: 1 }, 3)
    }

    #[test]
    fn predictions_never_negative() {
        let values = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        let predictions = predict(&values, 3, 5);
        assert!(predictions.iter().all(|p| *p >= 0.0));
    }
}
