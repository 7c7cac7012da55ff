//! Triple exponential smoothing (additive Holt-Winters).
//!
//! Level + trend + additive seasonal components over a fixed cycle length.
//! Needs at least two full cycles; a too-long period is adjusted downward
//! rather than rejected, as long as the absolute minimum history is met.

use tracing::warn;

use stockcast_core::{PipelineError, PipelineResult};

use crate::engine::AlgorithmRun;
use crate::metrics::{mean, stddev_sample};
use crate::params::{ForecastParams, TripleSmoothingParams};
use crate::single_smoothing::clamp_smoothing;

/// Maximum number of cycles used for seasonal initialization.
const INIT_CYCLES: usize = 4;

/// Coefficient of variation below which the series is considered low
/// variance (a simpler algorithm is likely adequate).
const LOW_VARIANCE_CV: f64 = 0.1;

/// Period actually usable for the given history length: unchanged when two
/// full cycles fit, otherwise shrunk to `max(7, len / 2)`.
pub(crate) fn effective_period(period: usize, len: usize) -> usize {
    if len >= period * 2 {
        period
    } else {
        (len / 2).max(7)
    }
}

struct Fit {
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
}

fn fit(values: &[f64], alpha: f64, beta: f64, gamma: f64, period: usize) -> Fit {
    let n = values.len();
    let cycles = n / period;
    let cycle_mean = |c: usize| mean(&values[c * period..(c + 1) * period]);

    let mut level = cycle_mean(0);
    let mut trend = if cycles >= 2 {
        (cycle_mean(1) - cycle_mean(0)) / period as f64
    } else {
        0.0
    };

    // Seasonal factors: mean deviation from the cycle level at each
    // position, across up to four cycles.
    let init_cycles = cycles.clamp(1, INIT_CYCLES);
    let mut seasonal = vec![0.0; period];
    for (i, factor) in seasonal.iter_mut().enumerate() {
        let mut acc = 0.0;
        for c in 0..init_cycles {
            acc += values[c * period + i] - cycle_mean(c);
        }
        *factor = acc / init_cycles as f64;
    }

    for (t, &observation) in values.iter().enumerate().skip(period) {
        let idx = t % period;
        let prev_level = level;
        level = alpha * (observation - seasonal[idx]) + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
        seasonal[idx] = gamma * (observation - level) + (1.0 - gamma) * seasonal[idx];
    }

    Fit {
        level,
        trend,
        seasonal,
    }
}

/// Holt-Winters predictions with the coefficient-clamped parameters,
/// clamped to >= 0. The period is re-fit to the series length.
pub(crate) fn predict(values: &[f64], params: TripleSmoothingParams, horizon: usize) -> Vec<f64> {
    let period = effective_period(params.period, values.len());
    let fit = fit(values, params.alpha, params.beta, params.gamma, period);
    (1..=horizon)
        .map(|h| {
            let idx = (values.len() - 1 + h) % period;
            (fit.level + h as f64 * fit.trend + fit.seasonal[idx]).max(0.0)
        })
        .collect()
}

pub(crate) fn run(
    values: &[f64],
    params: TripleSmoothingParams,
    horizon: usize,
) -> PipelineResult<AlgorithmRun> {
    let mut advisories = Vec::new();
    let alpha = clamp_smoothing(params.alpha, "alpha", &mut advisories)?;
    let beta = clamp_smoothing(params.beta, "beta", &mut advisories)?;
    let gamma = clamp_smoothing(params.gamma, "gamma", &mut advisories)?;

    if params.period < 2 {
        return Err(PipelineError::invalid_parameter(format!(
            "seasonal period must be at least 2, got {}",
            params.period
        )));
    }

    let n = values.len();
    let period = effective_period(params.period, n);
    if period != params.period {
        warn!(requested = params.period, used = period, len = n, "seasonal period adjusted");
        advisories.push(format!(
            "seasonal period adjusted from {} to {}: history covers fewer than two full cycles",
            params.period, period
        ));
    }

    let cycles = n / period;
    if cycles < 3 {
        advisories.push(format!(
            "only {cycles} full seasonal cycles available; seasonal estimates may be unstable"
        ));
    }

    let hist_mean = mean(values);
    if hist_mean > 0.0 && stddev_sample(values, hist_mean) / hist_mean < LOW_VARIANCE_CV {
        advisories
            .push("low demand variance; a simpler algorithm is likely adequate".to_string());
    }

    let used = TripleSmoothingParams {
        alpha,
        beta,
        gamma,
        period,
    };
    let fit = fit(values, alpha, beta, gamma, period);

    // Trend counted as present when it moves the level by more than 1% of
    // its magnitude over one full cycle.
    let has_trend = fit.trend.abs() * period as f64 / fit.level.abs().max(1.0) > 0.01;
    if has_trend {
        let direction = if fit.trend > 0.0 { "upward" } else { "downward" };
        advisories.push(format!(
            "{direction} trend of {:.2} units per period",
            fit.trend.abs()
        ));
    }

    let (peak, peak_value) = argmax(&fit.seasonal);
    let (trough, trough_value) = argmin(&fit.seasonal);
    advisories.push(format!(
        "seasonal amplitude {:.2} (peak at position {}, trough at position {} of the cycle)",
        peak_value - trough_value,
        peak + 1,
        trough + 1
    ));

    Ok(AlgorithmRun {
        predictions: predict(values, used, horizon),
        advisories,
        has_trend,
        has_seasonality: true,
        seasonal_period: Some(period),
        params: ForecastParams::TripleSmoothing(used),
    })
}

fn argmax(xs: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, &x) in xs.iter().enumerate() {
        if x > best.1 {
            best = (i, x);
        }
    }
    best
}

fn argmin(xs: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, &x) in xs.iter().enumerate() {
        if x < best.1 {
            best = (i, x);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Additive synthetic series: level + trend + zero-sum weekly pattern.
    fn synthetic(cycles: usize) -> Vec<f64> {
        let pattern = [8.0, 3.0, -2.0, -8.0, -4.0, 1.0, 2.0];
        (0..cycles * 7)
            .map(|t| 100.0 + 0.3 * t as f64 + pattern[t % 7])
            .collect()
    }

    #[test]
    fn constant_series_predicts_the_constant() {
        let values = vec![25.0; 28];
        let predictions = predict(&values, TripleSmoothingParams::default(), 7);
        assert!(predictions.iter().all(|p| (p - 25.0).abs() < 1e-9));
    }

    #[test]
    fn recovers_known_level_trend_seasonal_components() {
        let values = synthetic(8);
        let predictions = predict(&values, TripleSmoothingParams::default(), 7);

        let pattern = [8.0, 3.0, -2.0, -8.0, -4.0, 1.0, 2.0];
        let n = values.len();
        let mut pct_sum = 0.0;
        for (h, p) in predictions.iter().enumerate() {
            let t = n + h;
            let expected = 100.0 + 0.3 * t as f64 + pattern[t % 7];
            pct_sum += (expected - p).abs() / expected * 100.0;
        }
        let mape = pct_sum / predictions.len() as f64;
        assert!(mape < 5.0, "expected MAPE < 5%, got {mape:.2}%");
    }

    #[test]
    fn oversized_period_is_adjusted_downward() {
        let values = synthetic(3); // 21 points
        let params = TripleSmoothingParams {
            period: 30,
            ..TripleSmoothingParams::default()
        };
        let run = run(&values, params, 5).unwrap();
        // max(7, 21 / 2) = 10
        assert_eq!(run.seasonal_period, Some(10));
        assert!(run.advisories.iter().any(|a| a.contains("period adjusted")));
    }

    #[test]
    fn period_below_two_is_rejected() {
        let values = synthetic(4);
        let params = TripleSmoothingParams {
            period: 1,
            ..TripleSmoothingParams::default()
        };
        let err = run(&values, params, 5).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter(_)));
    }

    #[test]
    fn trend_and_amplitude_advisories_are_emitted() {
        let values = synthetic(8);
        let run = run(&values, TripleSmoothingParams::default(), 7).unwrap();
        assert!(run.has_trend);
        assert!(run.advisories.iter().any(|a| a.contains("upward trend")));
        assert!(run.advisories.iter().any(|a| a.contains("seasonal amplitude")));
    }

    #[test]
    fn low_variance_is_advised() {
        let values = vec![50.0; 28];
        let run = run(&values, TripleSmoothingParams::default(), 7).unwrap();
        assert!(run.advisories.iter().any(|a| a.contains("low demand variance")));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: predictions are never negative for non-negative
            /// history, whatever the parameters.
            #[test]
            fn predictions_are_non_negative(
                values in proptest::collection::vec(0.0f64..200.0, 14..60),
                period in 2usize..20,
            ) {
                let params = TripleSmoothingParams {
                    period,
                    ..TripleSmoothingParams::default()
                };
                let predictions = predict(&values, params, 10);
                prop_assert!(predictions.iter().all(|p| *p >= 0.0));
            }
        }
    }
}
