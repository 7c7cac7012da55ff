//! `stockcast-forecast` — Forecasting Core.
//!
//! Three algorithms over per-product daily demand series: moving average,
//! single exponential smoothing, and triple exponential smoothing (additive
//! Holt-Winters). One shared flow validates the series, dispatches the
//! algorithm, backtests in-sample for MAPE/MAE/RMSE, and packages the result
//! with quality rating and advisories. Seasonality analysis and automatic
//! algorithm selection live here too.

pub mod engine;
pub mod metrics;
mod moving_average;
pub mod params;
pub mod result;
pub mod seasonality;
pub mod selector;
mod single_smoothing;
mod triple_smoothing;

pub use engine::forecast_values;
pub use metrics::{Metrics, Quality};
pub use params::{
    Algorithm, ForecastParams, MovingAverageParams, SingleSmoothingParams, TripleSmoothingParams,
};
pub use result::ForecastResult;
pub use seasonality::{
    AnalysisSummary, InMemorySeasonalProfileStore, SeasonalProfile, SeasonalProfileStore,
    SeasonalityAnalyzer, DEFAULT_LOOKBACK_MONTHS, SEASONALITY_THRESHOLD,
};
pub use selector::{
    automatic_horizon, forecast_product, select_and_forecast, AlgorithmChoice, HorizonBounds,
    SelectedForecast,
};
