//! Algorithm selection and the forecasting entry points.
//!
//! AUTO mode runs every algorithm the history can support and keeps the one
//! with the lowest backtest MAPE; candidates are tried simplest-first so a
//! tie falls back to the simpler model.

use tracing::{debug, warn};

use stockcast_core::{PipelineError, PipelineResult, Product, ProductId};
use stockcast_series::{DemandPointStore, DemandSeries};

use crate::engine::{backtest_with_min, forecast_values};
use crate::metrics::{mean, stddev_sample, Metrics};
use crate::params::{Algorithm, ForecastParams};
use crate::result::ForecastResult;

/// How the algorithm is chosen for a forecast request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmChoice {
    /// Compare all viable algorithms by backtest MAPE.
    Auto,
    /// Run exactly the requested algorithm.
    Fixed(Algorithm),
}

/// A forecast together with the reason its algorithm was chosen.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SelectedForecast {
    pub result: ForecastResult,
    pub reason: String,
}

/// Candidates in simplicity order.
const CANDIDATES: [Algorithm; 3] = [
    Algorithm::MovingAverage,
    Algorithm::SingleSmoothing,
    Algorithm::TripleSmoothing,
];

/// Forecast one product's series with the given algorithm choice.
///
/// `params` overrides the defaults for a fixed algorithm, or for the matching
/// candidate in AUTO mode.
pub fn select_and_forecast(
    product_id: ProductId,
    series: &DemandSeries,
    horizon: usize,
    choice: AlgorithmChoice,
    params: Option<ForecastParams>,
) -> PipelineResult<SelectedForecast> {
    let values = series.values();
    match choice {
        AlgorithmChoice::Fixed(algorithm) => {
            let params = match params {
                Some(p) if p.algorithm() == algorithm => p,
                Some(p) => {
                    return Err(PipelineError::invalid_parameter(format!(
                        "parameters are for {}, requested algorithm is {}",
                        p.algorithm(),
                        algorithm
                    )));
                }
                None => ForecastParams::defaults_for(algorithm),
            };
            let result = forecast_values(product_id, &values, params, horizon)?;
            Ok(SelectedForecast {
                result,
                reason: format!("{algorithm} requested explicitly"),
            })
        }
        AlgorithmChoice::Auto => auto_select(product_id, &values, horizon, params),
    }
}

fn auto_select(
    product_id: ProductId,
    values: &[f64],
    horizon: usize,
    params: Option<ForecastParams>,
) -> PipelineResult<SelectedForecast> {
    let viable: Vec<Algorithm> = CANDIDATES
        .into_iter()
        .filter(|a| values.len() >= a.min_points())
        .collect();
    if viable.is_empty() {
        let needed = CANDIDATES.iter().map(|a| a.min_points()).min().unwrap_or(5);
        return Err(PipelineError::insufficient_data(
            needed,
            values.len(),
            "automatic algorithm selection",
        ));
    }

    // Score every candidate over the same backtest slice: the largest
    // candidate minimum caps the tail, so near the seasonal floor a
    // short-slice score never competes against a longer-slice one.
    let common_min = viable.iter().map(|a| a.min_points()).max().unwrap_or(0);

    let mut best: Option<(ForecastResult, Metrics)> = None;
    let mut tried = 0usize;
    for algorithm in &viable {
        let candidate_params = match params {
            Some(p) if p.algorithm() == *algorithm => p,
            _ => ForecastParams::defaults_for(*algorithm),
        };
        match forecast_values(product_id, values, candidate_params, horizon) {
            Ok(result) => {
                tried += 1;
                let score = backtest_with_min(values, &result.params, horizon, common_min);
                debug!(
                    product_id = %product_id,
                    algorithm = %algorithm,
                    mape = score.mape,
                    reliable = score.mape_reliable,
                    "candidate scored"
                );
                // Strict improvement only: earlier (simpler) wins ties, and
                // an unreliable score never displaces a reliable one.
                let improves = match &best {
                    None => true,
                    Some((_, current)) => {
                        (score.mape_reliable, current.mape_reliable) == (true, false)
                            || (score.mape_reliable == current.mape_reliable
                                && score.mape < current.mape)
                    }
                };
                if improves {
                    best = Some((result, score));
                }
            }
            Err(e) => {
                warn!(product_id = %product_id, algorithm = %algorithm, error = %e, "candidate failed");
            }
        }
    }

    let (result, score) = best.ok_or_else(|| {
        PipelineError::computation(
            product_id,
            "auto",
            "every candidate algorithm failed",
        )
    })?;
    let reason = if score.mape_reliable {
        format!(
            "{} selected: lowest backtest MAPE {:.2}% among {} candidate(s)",
            result.algorithm, score.mape, tried
        )
    } else {
        format!(
            "{} selected among {} candidate(s); backtest MAPE unreliable",
            result.algorithm, tried
        )
    };
    Ok(SelectedForecast { result, reason })
}

/// Forecast straight from the stored series of one product.
pub fn forecast_product<S: DemandPointStore>(
    store: &S,
    product_id: ProductId,
    horizon: usize,
    choice: AlgorithmChoice,
    params: Option<ForecastParams>,
) -> PipelineResult<SelectedForecast> {
    let series = store.series(product_id)?;
    select_and_forecast(product_id, &series, horizon, choice, params)
}

/// Clamp bounds for automatically derived horizons, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizonBounds {
    pub min: usize,
    pub max: usize,
}

impl Default for HorizonBounds {
    fn default() -> Self {
        Self { min: 7, max: 90 }
    }
}

/// Coefficient of variation above which demand counts as volatile.
const VOLATILE_CV: f64 = 0.5;

/// Derive a forecast horizon from supplier lead time and demand shape:
/// twice the lead time, plus a week for volatile demand, plus two weeks
/// when the product is seasonal, clamped into `bounds`.
pub fn automatic_horizon(
    product: &Product,
    values: &[f64],
    is_seasonal: bool,
    bounds: HorizonBounds,
) -> usize {
    let mut horizon = 2 * product.lead_time_days as usize;
    let avg = mean(values);
    if avg > 0.0 && stddev_sample(values, avg) / avg > VOLATILE_CV {
        horizon += 7;
    }
    if is_seasonal {
        horizon += 14;
    }
    horizon.clamp(bounds.min, bounds.max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SingleSmoothingParams;
    use chrono::NaiveDate;
    use stockcast_series::{DemandPoint, InMemoryDemandPointStore};

    fn series_of(values: &[f64]) -> DemandSeries {
        let id = ProductId::new();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &q)| DemandPoint::new(id, start + chrono::Days::new(i as u64), q))
            .collect();
        DemandSeries::from_points(id, points)
    }

    /// Strong additive weekly pattern on a rising level.
    fn weekly(cycles: usize) -> Vec<f64> {
        let pattern = [16.0, 6.0, -4.0, -16.0, -8.0, 2.0, 4.0];
        (0..cycles * 7)
            .map(|t| 100.0 + 0.3 * t as f64 + pattern[t % 7])
            .collect()
    }

    #[test]
    fn fixed_choice_runs_the_requested_algorithm() {
        let series = series_of(&[10.0, 12.0, 11.0, 13.0, 12.0, 14.0, 13.0, 15.0]);
        let selected = select_and_forecast(
            series.product_id(),
            &series,
            3,
            AlgorithmChoice::Fixed(Algorithm::SingleSmoothing),
            None,
        )
        .unwrap();
        assert_eq!(selected.result.algorithm, Algorithm::SingleSmoothing);
        assert!(selected.reason.contains("requested explicitly"));
    }

    #[test]
    fn fixed_choice_rejects_mismatched_params() {
        let series = series_of(&[10.0; 10]);
        let err = select_and_forecast(
            series.product_id(),
            &series,
            3,
            AlgorithmChoice::Fixed(Algorithm::MovingAverage),
            Some(ForecastParams::SingleSmoothing(
                SingleSmoothingParams::default(),
            )),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter(_)));
    }

    #[test]
    fn auto_on_a_stable_series_prefers_the_simplest_algorithm() {
        // All candidates score a perfect backtest; the tie goes to the
        // moving average.
        let series = series_of(&[50.0; 28]);
        let selected = select_and_forecast(
            series.product_id(),
            &series,
            5,
            AlgorithmChoice::Auto,
            None,
        )
        .unwrap();
        assert_eq!(selected.result.algorithm, Algorithm::MovingAverage);
        assert!(selected.reason.contains("lowest backtest MAPE"));
    }

    #[test]
    fn auto_picks_the_seasonal_model_for_strongly_weekly_demand() {
        let series = series_of(&weekly(8));
        let selected = select_and_forecast(
            series.product_id(),
            &series,
            7,
            AlgorithmChoice::Auto,
            None,
        )
        .unwrap();
        assert_eq!(selected.result.algorithm, Algorithm::TripleSmoothing);
    }

    #[test]
    fn auto_skips_algorithms_the_history_cannot_support() {
        // 10 points: triple smoothing (needs 14) must not be selected even
        // though the series is weekly.
        let series = series_of(&weekly(8)[..10].to_vec());
        let selected = select_and_forecast(
            series.product_id(),
            &series,
            3,
            AlgorithmChoice::Auto,
            None,
        )
        .unwrap();
        assert_ne!(selected.result.algorithm, Algorithm::TripleSmoothing);
    }

    #[test]
    fn auto_near_the_seasonal_minimum_scores_candidates_on_equal_slices() {
        // 16 points is just above the triple-smoothing floor of 14. Every
        // candidate is scored over the same 2-point tail (prefix capped by
        // the largest candidate minimum), so the seasonal model's score is
        // directly comparable and wins on this strongly weekly series.
        let mut values = weekly(2);
        values.extend_from_slice(&weekly(3)[14..16]);
        let series = series_of(&values);
        let selected = select_and_forecast(
            series.product_id(),
            &series,
            7,
            AlgorithmChoice::Auto,
            None,
        )
        .unwrap();
        assert_eq!(selected.result.algorithm, Algorithm::TripleSmoothing);
        assert!(selected.reason.contains("lowest backtest MAPE"));
    }

    #[test]
    fn auto_with_too_little_history_fails() {
        let series = series_of(&[4.0, 5.0, 6.0]);
        let err = select_and_forecast(
            series.product_id(),
            &series,
            3,
            AlgorithmChoice::Auto,
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PipelineError::insufficient_data(5, 3, "automatic algorithm selection")
        );
    }

    #[test]
    fn forecast_product_reads_the_stored_series() {
        let store = InMemoryDemandPointStore::new();
        let id = ProductId::new();
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        for i in 0..14u64 {
            store
                .upsert(DemandPoint::new(id, start + chrono::Days::new(i), 20.0))
                .unwrap();
        }
        let selected =
            forecast_product(&store, id, 7, AlgorithmChoice::Auto, None).unwrap();
        assert_eq!(selected.result.predictions.len(), 7);
        assert!((selected.result.total_predicted - 140.0).abs() < 1e-9);
    }

    mod horizon {
        use super::*;

        fn product(lead_time_days: u32) -> Product {
            Product::new(ProductId::new(), "Widget", lead_time_days)
        }

        #[test]
        fn twice_the_lead_time_for_calm_demand() {
            let values = vec![30.0; 30];
            assert_eq!(
                automatic_horizon(&product(10), &values, false, HorizonBounds::default()),
                20
            );
        }

        #[test]
        fn volatile_demand_adds_a_week() {
            // Alternating 0/100: cv well above 0.5.
            let values: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 0.0 } else { 100.0 }).collect();
            assert_eq!(
                automatic_horizon(&product(10), &values, false, HorizonBounds::default()),
                27
            );
        }

        #[test]
        fn seasonal_products_add_two_weeks() {
            let values = vec![30.0; 30];
            assert_eq!(
                automatic_horizon(&product(10), &values, true, HorizonBounds::default()),
                34
            );
        }

        #[test]
        fn horizon_is_clamped_into_bounds() {
            let values = vec![30.0; 30];
            assert_eq!(
                automatic_horizon(&product(2), &values, false, HorizonBounds::default()),
                7
            );
            assert_eq!(
                automatic_horizon(&product(45), &values, true, HorizonBounds::default()),
                90
            );
        }
    }
}
