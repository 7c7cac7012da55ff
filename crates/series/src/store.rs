//! Demand point store port.
//!
//! Writers use per-point upsert (last-writer-wins for a given product/date)
//! rather than locking; a read concurrent with a recompute sees either the
//! old or the new value, never a duplicate.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;

use stockcast_core::{PipelineError, PipelineResult, ProductId};

use crate::point::{DemandPoint, DemandSeries};

/// Outcome of a single upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// Outcome of a committed chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkOutcome {
    pub inserted: usize,
    pub updated: usize,
}

/// Persistence port for demand points.
pub trait DemandPointStore {
    /// Insert or overwrite the point for (product, date).
    fn upsert(&self, point: DemandPoint) -> PipelineResult<Upsert>;

    /// Commit a chunk of points as one unit.
    ///
    /// Implementations backed by a transactional store should commit the
    /// whole chunk atomically; the default just loops `upsert`.
    fn upsert_chunk(&self, points: Vec<DemandPoint>) -> PipelineResult<ChunkOutcome> {
        let mut outcome = ChunkOutcome::default();
        for point in points {
            match self.upsert(point)? {
                Upsert::Inserted => outcome.inserted += 1,
                Upsert::Updated => outcome.updated += 1,
            }
        }
        Ok(outcome)
    }

    /// Full stored series for one product, chronological.
    fn series(&self, product_id: ProductId) -> PipelineResult<DemandSeries>;
}

/// In-memory demand point store keyed by (product, date).
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryDemandPointStore {
    points: RwLock<HashMap<(ProductId, NaiveDate), DemandPoint>>,
}

impl InMemoryDemandPointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point_count(&self) -> usize {
        self.points.read().expect("store lock poisoned").len()
    }
}

impl DemandPointStore for InMemoryDemandPointStore {
    fn upsert(&self, point: DemandPoint) -> PipelineResult<Upsert> {
        let mut guard = self
            .points
            .write()
            .map_err(|_| PipelineError::invalid_parameter("store lock poisoned"))?;
        let key = (point.product_id, point.date);
        match guard.insert(key, point) {
            None => Ok(Upsert::Inserted),
            Some(_) => Ok(Upsert::Updated),
        }
    }

    fn series(&self, product_id: ProductId) -> PipelineResult<DemandSeries> {
        let guard = self
            .points
            .read()
            .map_err(|_| PipelineError::invalid_parameter("store lock poisoned"))?;
        let points: Vec<DemandPoint> = guard
            .values()
            .filter(|p| p.product_id == product_id)
            .cloned()
            .collect();
        Ok(DemandSeries::from_points(product_id, points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn upsert_reports_inserted_then_updated() {
        let store = InMemoryDemandPointStore::new();
        let id = ProductId::new();
        assert_eq!(
            store.upsert(DemandPoint::new(id, date(1), 4.0)).unwrap(),
            Upsert::Inserted
        );
        assert_eq!(
            store.upsert(DemandPoint::new(id, date(1), 6.0)).unwrap(),
            Upsert::Updated
        );
        assert_eq!(store.point_count(), 1);
        assert_eq!(store.series(id).unwrap().values(), vec![6.0]);
    }

    #[test]
    fn series_is_chronological_and_product_scoped() {
        let store = InMemoryDemandPointStore::new();
        let a = ProductId::new();
        let b = ProductId::new();
        store.upsert(DemandPoint::new(a, date(5), 2.0)).unwrap();
        store.upsert(DemandPoint::new(a, date(2), 9.0)).unwrap();
        store.upsert(DemandPoint::new(b, date(3), 1.0)).unwrap();

        let series = store.series(a).unwrap();
        assert_eq!(series.values(), vec![9.0, 2.0]);
    }

    #[test]
    fn chunk_outcome_counts_inserts_and_updates() {
        let store = InMemoryDemandPointStore::new();
        let id = ProductId::new();
        store.upsert(DemandPoint::new(id, date(1), 1.0)).unwrap();

        let outcome = store
            .upsert_chunk(vec![
                DemandPoint::new(id, date(1), 2.0),
                DemandPoint::new(id, date(2), 3.0),
            ])
            .unwrap();
        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.updated, 1);
    }
}
