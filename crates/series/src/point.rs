//! Daily demand points and per-product series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockcast_core::ProductId;

/// Aggregated demand for one product on one calendar date.
///
/// Invariant: at most one point per (product, date); the store enforces this
/// with upsert semantics. Quantity is never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandPoint {
    pub product_id: ProductId,
    pub date: NaiveDate,
    pub quantity: f64,
    /// Period label, e.g. "2025-06".
    pub period: String,
}

impl DemandPoint {
    pub fn new(product_id: ProductId, date: NaiveDate, quantity: f64) -> Self {
        Self {
            product_id,
            date,
            quantity: quantity.max(0.0),
            period: date.format("%Y-%m").to_string(),
        }
    }
}

/// Chronological demand series for one product.
///
/// Convention: days with zero demand are **omitted** — a date absent from the
/// series had no qualifying ledger movements. Consumers read the quantity
/// sequence as-is and must not assume gap-free dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSeries {
    product_id: ProductId,
    points: Vec<DemandPoint>,
}

impl DemandSeries {
    /// Build a series from unordered points. Sorts by date; on duplicate
    /// dates the last point wins (mirrors store upsert semantics).
    pub fn from_points(product_id: ProductId, mut points: Vec<DemandPoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by(|next, prev| {
            if next.date == prev.date {
                *prev = next.clone();
                true
            } else {
                false
            }
        });
        Self { product_id, points }
    }

    pub fn empty(product_id: ProductId) -> Self {
        Self {
            product_id,
            points: Vec::new(),
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn points(&self) -> &[DemandPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The quantity sequence, chronological.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.quantity).collect()
    }
}
