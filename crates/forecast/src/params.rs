//! Algorithm identifiers and typed per-algorithm parameters.
//!
//! The algorithm family is a closed set: three variants dispatched over one
//! shared computation path. Parameters are typed value objects with
//! documented defaults and clamping rules, not a key/value bag.

use serde::{Deserialize, Serialize};

/// The forecasting algorithm family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    MovingAverage,
    SingleSmoothing,
    TripleSmoothing,
}

impl Algorithm {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Algorithm::MovingAverage => "moving_average",
            Algorithm::SingleSmoothing => "single_smoothing",
            Algorithm::TripleSmoothing => "triple_smoothing",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::MovingAverage => "Moving average",
            Algorithm::SingleSmoothing => "Single exponential smoothing",
            Algorithm::TripleSmoothing => "Triple exponential smoothing (seasonal)",
        }
    }

    /// Minimum history length the algorithm accepts.
    pub fn min_points(&self) -> usize {
        match self {
            Algorithm::MovingAverage => 7,
            Algorithm::SingleSmoothing => 5,
            Algorithm::TripleSmoothing => 14,
        }
    }

    /// Simplicity rank for AUTO tie-breaking: lower = simpler. Ties on the
    /// comparison metric prefer the simpler algorithm to avoid overfitting
    /// noisy short histories.
    pub fn simplicity_rank(&self) -> u8 {
        match self {
            Algorithm::MovingAverage => 0,
            Algorithm::SingleSmoothing => 1,
            Algorithm::TripleSmoothing => 2,
        }
    }
}

impl core::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// Moving-average parameters.
///
/// `window` defaults to 14 and is clamped into `[3, series length]` with a
/// logged adjustment (never an error).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageParams {
    pub window: usize,
}

impl Default for MovingAverageParams {
    fn default() -> Self {
        Self { window: 14 }
    }
}

/// Single-exponential-smoothing parameters.
///
/// `alpha` must lie in (0, 1) exclusive; out-of-range values are clamped to
/// `[0.01, 0.99]` with a logged warning rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleSmoothingParams {
    pub alpha: f64,
}

impl Default for SingleSmoothingParams {
    fn default() -> Self {
        Self { alpha: 0.3 }
    }
}

/// Triple-exponential-smoothing (additive Holt-Winters) parameters.
///
/// `alpha`/`beta`/`gamma` follow the same clamping rule as single smoothing.
/// `period` is the seasonal cycle length; values below 2 cannot be clamped
/// and are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripleSmoothingParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub period: usize,
}

impl Default for TripleSmoothingParams {
    fn default() -> Self {
        Self {
            alpha: 0.4,
            beta: 0.2,
            gamma: 0.3,
            period: 7,
        }
    }
}

/// Tagged parameter set: one variant per algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum ForecastParams {
    MovingAverage(MovingAverageParams),
    SingleSmoothing(SingleSmoothingParams),
    TripleSmoothing(TripleSmoothingParams),
}

impl ForecastParams {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            ForecastParams::MovingAverage(_) => Algorithm::MovingAverage,
            ForecastParams::SingleSmoothing(_) => Algorithm::SingleSmoothing,
            ForecastParams::TripleSmoothing(_) => Algorithm::TripleSmoothing,
        }
    }

    /// Default parameters for the given algorithm.
    pub fn defaults_for(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::MovingAverage => {
                ForecastParams::MovingAverage(MovingAverageParams::default())
            }
            Algorithm::SingleSmoothing => {
                ForecastParams::SingleSmoothing(SingleSmoothingParams::default())
            }
            Algorithm::TripleSmoothing => {
                ForecastParams::TripleSmoothing(TripleSmoothingParams::default())
            }
        }
    }
}
