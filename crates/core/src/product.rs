//! Product read model consumed by the pipeline.

use serde::{Deserialize, Serialize};

use crate::id::ProductId;

/// Product metadata as exposed by the external product collaborator.
///
/// The pipeline only reads what it needs: lead time for horizon heuristics
/// and unit cost for quantity valuation by downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Supplier lead time in days.
    pub lead_time_days: u32,
    /// Unit cost in smallest currency unit (e.g., cents).
    pub unit_cost: Option<u64>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, lead_time_days: u32) -> Self {
        Self {
            id,
            name: name.into(),
            lead_time_days,
            unit_cost: None,
        }
    }

    pub fn with_unit_cost(mut self, unit_cost: u64) -> Self {
        self.unit_cost = Some(unit_cost);
        self
    }
}

/// Current stock level and reorder point for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPosition {
    pub stock: i64,
    pub reorder_point: i64,
}

impl StockPosition {
    pub fn new(stock: i64, reorder_point: i64) -> Self {
        Self {
            stock,
            reorder_point,
        }
    }

    /// Replenishment trigger: stock at or below the reorder point.
    pub fn below_reorder_point(&self) -> bool {
        self.stock <= self.reorder_point
    }
}
