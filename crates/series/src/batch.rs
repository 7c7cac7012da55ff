//! All-products batch rebuild.
//!
//! Processes products sequentially, buffering product-date groups and
//! committing them in bounded chunks so memory and transaction duration stay
//! bounded regardless of catalog/ledger volume. The run is interruptible at
//! chunk boundaries: previously committed chunks stay intact.

use chrono::NaiveDate;
use tracing::{info, warn};

use stockcast_core::{LedgerReader, PipelineResult, ProductReader};

use crate::builder::SeriesBuilder;
use crate::point::DemandPoint;
use crate::store::DemandPointStore;

/// How many error messages a batch summary retains verbatim.
const ERROR_SAMPLE_LIMIT: usize = 5;

/// Aggregate outcome of an all-products rebuild.
///
/// `errors` counts failed items: one per product that could not be processed
/// plus one per chunk commit that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct BatchSummary {
    pub inserted: usize,
    pub updated: usize,
    pub errors: usize,
    /// First few error messages, for observability.
    pub error_samples: Vec<String>,
}

impl BatchSummary {
    fn record_error(&mut self, message: String) {
        self.errors += 1;
        if self.error_samples.len() < ERROR_SAMPLE_LIMIT {
            self.error_samples.push(message);
        }
    }
}

impl<'a, L, P, S> SeriesBuilder<'a, L, P, S>
where
    L: LedgerReader,
    P: ProductReader,
    S: DemandPointStore,
{
    /// Rebuild demand series for every known product.
    ///
    /// Per-product failures are counted and logged, never fatal to the
    /// batch. Returns new/updated/error counts.
    pub fn build_all(&self, lookback_days: u32, as_of: NaiveDate) -> PipelineResult<BatchSummary> {
        let ids = self.products().product_ids()?;
        let mut summary = BatchSummary::default();
        let mut pending: Vec<DemandPoint> = Vec::new();
        let chunk_size = self.chunk_size();

        info!(products = ids.len(), lookback_days, chunk_size, "batch rebuild started");

        for product_id in ids {
            match self.collect_points(product_id, lookback_days, as_of) {
                Ok(points) => pending.extend(points),
                Err(e) => {
                    warn!(product_id = %product_id, error = %e, "skipping product in batch rebuild");
                    summary.record_error(format!("{product_id}: {e}"));
                }
            }

            while pending.len() >= chunk_size {
                let chunk: Vec<DemandPoint> = pending.drain(..chunk_size).collect();
                self.commit_chunk(chunk, &mut summary);
            }
        }

        if !pending.is_empty() {
            self.commit_chunk(pending, &mut summary);
        }

        info!(
            inserted = summary.inserted,
            updated = summary.updated,
            errors = summary.errors,
            "batch rebuild finished"
        );
        Ok(summary)
    }

    fn commit_chunk(&self, chunk: Vec<DemandPoint>, summary: &mut BatchSummary) {
        let size = chunk.len();
        match self.store().upsert_chunk(chunk) {
            Ok(outcome) => {
                summary.inserted += outcome.inserted;
                summary.updated += outcome.updated;
            }
            Err(e) => {
                warn!(chunk_size = size, error = %e, "chunk commit failed");
                summary.record_error(format!("chunk of {size}: {e}"));
            }
        }
        // The chunk was moved into the commit; nothing of the per-chunk
        // working set survives past this point.
    }
}
