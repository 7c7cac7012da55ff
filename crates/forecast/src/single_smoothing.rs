//! Single exponential smoothing.
//!
//! Level-only model: the forecast is flat at the final smoothed level. No
//! trend component, so a trend in the history is detected and advised on
//! rather than modelled.

use tracing::warn;

use stockcast_core::{PipelineError, PipelineResult};

use crate::engine::AlgorithmRun;
use crate::metrics::mean;
use crate::params::{ForecastParams, SingleSmoothingParams};

/// Clamp bounds for smoothing factors outside (0, 1).
pub(crate) const SMOOTHING_MIN: f64 = 0.01;
pub(crate) const SMOOTHING_MAX: f64 = 0.99;

/// Relative first-half/second-half difference that counts as a trend.
const TREND_THRESHOLD: f64 = 0.15;

/// Clamp a smoothing factor into the open unit interval.
pub(crate) fn clamp_smoothing(
    value: f64,
    name: &str,
    advisories: &mut Vec<String>,
) -> PipelineResult<f64> {
    if !value.is_finite() {
        return Err(PipelineError::invalid_parameter(format!(
            "{name} must be a finite number, got {value}"
        )));
    }
    if value > 0.0 && value < 1.0 {
        return Ok(value);
    }
    let clamped = value.clamp(SMOOTHING_MIN, SMOOTHING_MAX);
    warn!(factor = name, requested = value, used = clamped, "smoothing factor clamped");
    advisories.push(format!("{name} clamped from {value} to {clamped}"));
    Ok(clamped)
}

/// Final smoothed level repeated over the horizon, clamped to >= 0.
pub(crate) fn predict(values: &[f64], alpha: f64, horizon: usize) -> Vec<f64> {
    let seed = values.len().min(3);
    let mut level = mean(&values[..seed]);
    for &observation in &values[seed..] {
        level = alpha * observation + (1.0 - alpha) * level;
    }
    vec![level.max(0.0); horizon]
}

/// First half vs second half mean comparison; Some(change) when a trend is
/// present.
pub(crate) fn detect_trend(values: &[f64]) -> Option<f64> {
    let half = values.len() / 2;
    if half == 0 {
        return None;
    }
    let first = mean(&values[..half]);
    let second = mean(&values[values.len() - half..]);
    if first == 0.0 {
        return None;
    }
    let change = (second - first) / first;
    (change.abs() > TREND_THRESHOLD).then_some(change)
}

pub(crate) fn run(
    values: &[f64],
    params: SingleSmoothingParams,
    horizon: usize,
) -> PipelineResult<AlgorithmRun> {
    let mut advisories = Vec::new();
    let alpha = clamp_smoothing(params.alpha, "alpha", &mut advisories)?;

    let trend = detect_trend(values);
    if let Some(change) = trend {
        let direction = if change > 0.0 { "upward" } else { "downward" };
        advisories.push(format!(
            "{direction} trend of {:.0}% detected; consider a trend-aware algorithm",
            change.abs() * 100.0
        ));
    }

    Ok(AlgorithmRun {
        predictions: predict(values, alpha, horizon),
        advisories,
        has_trend: trend.is_some(),
        has_seasonality: false,
        seasonal_period: None,
        params: ForecastParams::SingleSmoothing(SingleSmoothingParams { alpha }),
    })
}
