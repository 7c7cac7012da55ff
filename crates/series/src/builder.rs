//! Single-product demand series construction.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeDelta};
use tracing::debug;

use stockcast_core::{
    LedgerReader, PipelineError, PipelineResult, ProductId, ProductReader,
};

use crate::point::{DemandPoint, DemandSeries};
use crate::store::{DemandPointStore, Upsert};

/// Builds per-product daily demand series from the ledger.
///
/// Stateless apart from its port references; safe to share across callers.
pub struct SeriesBuilder<'a, L, P, S> {
    ledger: &'a L,
    products: &'a P,
    store: &'a S,
    chunk_size: usize,
}

/// Default number of product-date groups committed per chunk in batch mode.
pub const DEFAULT_CHUNK_SIZE: usize = 50;

impl<'a, L, P, S> SeriesBuilder<'a, L, P, S>
where
    L: LedgerReader,
    P: ProductReader,
    S: DemandPointStore,
{
    pub fn new(ledger: &'a L, products: &'a P, store: &'a S) -> Self {
        Self {
            ledger,
            products,
            store,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub(crate) fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub(crate) fn products(&self) -> &'a P {
        self.products
    }

    pub(crate) fn store(&self) -> &'a S {
        self.store
    }

    /// Build (and persist) the demand series for one product over the
    /// lookback window ending at `as_of`.
    ///
    /// Idempotent: re-running for the same window overwrites the same
    /// (product, date) points and never double-counts.
    pub fn build(
        &self,
        product_id: ProductId,
        lookback_days: u32,
        as_of: NaiveDate,
    ) -> PipelineResult<DemandSeries> {
        let points = self.collect_points(product_id, lookback_days, as_of)?;
        let mut inserted = 0usize;
        let mut updated = 0usize;
        for point in &points {
            match self.store.upsert(point.clone())? {
                Upsert::Inserted => inserted += 1,
                Upsert::Updated => updated += 1,
            }
        }
        debug!(
            product_id = %product_id,
            lookback_days,
            inserted,
            updated,
            "demand series built"
        );
        Ok(DemandSeries::from_points(product_id, points))
    }

    /// Aggregate ledger entries into daily points without persisting.
    pub(crate) fn collect_points(
        &self,
        product_id: ProductId,
        lookback_days: u32,
        as_of: NaiveDate,
    ) -> PipelineResult<Vec<DemandPoint>> {
        if lookback_days < 1 {
            return Err(PipelineError::invalid_parameter(
                "lookback window must be at least 1 day",
            ));
        }
        // Fails with ProductNotFound for unresolvable references.
        self.products.product(product_id)?;

        let from_date = as_of - TimeDelta::days(i64::from(lookback_days) - 1);
        let from = from_date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| PipelineError::invalid_parameter("invalid window start"))?
            .and_utc();
        let to = as_of
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| PipelineError::invalid_parameter("invalid window end"))?
            .and_utc();

        let entries = self.ledger.entries(product_id, from, to)?;

        // Group by calendar date (UTC), summing absolute outflow quantity.
        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for entry in entries.iter().filter(|e| e.counts_as_demand()) {
            *by_date.entry(entry.occurred_at.date_naive()).or_insert(0.0) +=
                entry.demand_quantity();
        }

        Ok(by_date
            .into_iter()
            .map(|(date, quantity)| DemandPoint::new(product_id, date, quantity))
            .collect())
    }
}
