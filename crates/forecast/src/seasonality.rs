//! Monthly seasonality analysis.
//!
//! Computes per-calendar-month coefficients (monthly average / annual
//! average) over a multi-year ledger history. Profiles are snapshots:
//! recomputation replaces the active profile, superseded ones are kept
//! deactivated for audit.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use stockcast_core::{
    LedgerReader, PipelineError, PipelineResult, ProductId, ProductReader, ProfileId,
};

use crate::metrics::mean;

/// Intensity above which a product is considered seasonal. Tunable via
/// [`SeasonalityAnalyzer::with_threshold`].
pub const SEASONALITY_THRESHOLD: f64 = 0.15;

/// Recommended history window, in months.
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 24;

/// Minimum number of aggregated (year, month) buckets required.
const MIN_MONTHLY_POINTS: usize = 12;

/// Seasonal fingerprint of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalProfile {
    pub id: ProfileId,
    pub product_id: ProductId,
    /// Coefficient per calendar month (index 0 = January): ratio of the
    /// monthly average to the annual average.
    pub coefficients: [f64; 12],
    /// Mean absolute deviation of the coefficients from 1.0.
    pub intensity: f64,
    pub has_seasonality: bool,
    /// 1..=12.
    pub peak_month: u32,
    /// 1..=12.
    pub trough_month: u32,
    pub generated_at: DateTime<Utc>,
    pub active: bool,
}

/// Persistence port for seasonal profiles: exactly one active profile per
/// product at any time.
pub trait SeasonalProfileStore {
    /// Persist `profile` as the active profile, deactivating any prior one.
    fn replace_active(&self, profile: SeasonalProfile) -> PipelineResult<()>;

    /// The active profile, if any. Superseded profiles are never returned.
    fn active(&self, product_id: ProductId) -> PipelineResult<Option<SeasonalProfile>>;
}

/// In-memory profile store retaining superseded profiles for audit.
#[derive(Debug, Default)]
pub struct InMemorySeasonalProfileStore {
    profiles: RwLock<HashMap<ProductId, Vec<SeasonalProfile>>>,
}

impl InMemorySeasonalProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored profiles (active and superseded) for one product.
    pub fn history(&self, product_id: ProductId) -> Vec<SeasonalProfile> {
        self.profiles
            .read()
            .expect("profile lock poisoned")
            .get(&product_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl SeasonalProfileStore for InMemorySeasonalProfileStore {
    fn replace_active(&self, profile: SeasonalProfile) -> PipelineResult<()> {
        let mut guard = self
            .profiles
            .write()
            .map_err(|_| PipelineError::invalid_parameter("profile lock poisoned"))?;
        let entry = guard.entry(profile.product_id).or_default();
        for prior in entry.iter_mut() {
            prior.active = false;
        }
        entry.push(profile);
        Ok(())
    }

    fn active(&self, product_id: ProductId) -> PipelineResult<Option<SeasonalProfile>> {
        let guard = self
            .profiles
            .read()
            .map_err(|_| PipelineError::invalid_parameter("profile lock poisoned"))?;
        Ok(guard
            .get(&product_id)
            .and_then(|profiles| profiles.iter().find(|p| p.active).cloned()))
    }
}

/// Aggregate outcome of an all-products analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AnalysisSummary {
    pub analyzed: usize,
    /// Products with too little history for a profile (soft no-op).
    pub insufficient: usize,
    pub errors: usize,
    pub error_samples: Vec<String>,
}

const ERROR_SAMPLE_LIMIT: usize = 5;

/// Computes seasonal profiles from the ledger.
pub struct SeasonalityAnalyzer<'a, L, P, S> {
    ledger: &'a L,
    products: &'a P,
    store: &'a S,
    lookback_months: u32,
    threshold: f64,
}

impl<'a, L, P, S> SeasonalityAnalyzer<'a, L, P, S>
where
    L: LedgerReader,
    P: ProductReader,
    S: SeasonalProfileStore,
{
    pub fn new(ledger: &'a L, products: &'a P, store: &'a S) -> Self {
        Self {
            ledger,
            products,
            store,
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
            threshold: SEASONALITY_THRESHOLD,
        }
    }

    pub fn with_lookback_months(mut self, months: u32) -> Self {
        self.lookback_months = months.max(MIN_MONTHLY_POINTS as u32);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Analyze one product; `Ok(None)` when there is too little history.
    ///
    /// On success the new profile supersedes the previously active one.
    pub fn analyze(
        &self,
        product_id: ProductId,
        as_of: NaiveDate,
    ) -> PipelineResult<Option<SeasonalProfile>> {
        self.products.product(product_id)?;

        let from_date = as_of
            .checked_sub_months(Months::new(self.lookback_months))
            .ok_or_else(|| PipelineError::invalid_parameter("invalid analysis window"))?;
        let from = from_date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| PipelineError::invalid_parameter("invalid window start"))?
            .and_utc();
        let to = as_of
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| PipelineError::invalid_parameter("invalid window end"))?
            .and_utc();

        let entries = self.ledger.entries(product_id, from, to)?;

        // Bucket demand by (year, month).
        let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for entry in entries.iter().filter(|e| e.counts_as_demand()) {
            let date = entry.occurred_at.date_naive();
            *buckets.entry((date.year(), date.month())).or_insert(0.0) +=
                entry.demand_quantity();
        }

        if buckets.len() < MIN_MONTHLY_POINTS {
            debug!(
                product_id = %product_id,
                buckets = buckets.len(),
                "insufficient history for seasonality analysis"
            );
            return Ok(None);
        }

        // Average per calendar month across years; months never seen get 0.
        let mut monthly_avg = [0.0f64; 12];
        for month in 1..=12u32 {
            let totals: Vec<f64> = buckets
                .iter()
                .filter(|((_, m), _)| *m == month)
                .map(|(_, total)| *total)
                .collect();
            monthly_avg[(month - 1) as usize] = mean(&totals);
        }

        let annual_avg = mean(&monthly_avg);
        let mut coefficients = [1.0f64; 12];
        if annual_avg > 0.0 {
            for (c, avg) in coefficients.iter_mut().zip(monthly_avg) {
                *c = avg / annual_avg;
            }
        }

        let intensity =
            coefficients.iter().map(|c| (c - 1.0).abs()).sum::<f64>() / 12.0;
        let peak_month = argmax_month(&coefficients);
        let trough_month = argmin_month(&coefficients);

        let profile = SeasonalProfile {
            id: ProfileId::new(),
            product_id,
            coefficients,
            intensity,
            has_seasonality: intensity > self.threshold,
            peak_month,
            trough_month,
            generated_at: Utc::now(),
            active: true,
        };
        self.store.replace_active(profile.clone())?;
        Ok(Some(profile))
    }

    /// Analyze every known product; individual failures never abort the run.
    pub fn analyze_all(&self, as_of: NaiveDate) -> PipelineResult<AnalysisSummary> {
        let ids = self.products.product_ids()?;
        let mut summary = AnalysisSummary::default();
        for product_id in ids {
            match self.analyze(product_id, as_of) {
                Ok(Some(_)) => summary.analyzed += 1,
                Ok(None) => summary.insufficient += 1,
                Err(e) => {
                    warn!(product_id = %product_id, error = %e, "seasonality analysis failed");
                    summary.errors += 1;
                    if summary.error_samples.len() < ERROR_SAMPLE_LIMIT {
                        summary.error_samples.push(format!("{product_id}: {e}"));
                    }
                }
            }
        }
        Ok(summary)
    }
}

fn argmax_month(coefficients: &[f64; 12]) -> u32 {
    let mut best = 0usize;
    for (i, c) in coefficients.iter().enumerate() {
        if *c > coefficients[best] {
            best = i;
        }
    }
    (best + 1) as u32
}

fn argmin_month(coefficients: &[f64; 12]) -> u32 {
    let mut best = 0usize;
    for (i, c) in coefficients.iter().enumerate() {
        if *c < coefficients[best] {
            best = i;
        }
    }
    (best + 1) as u32
}
