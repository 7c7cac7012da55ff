//! Inventory ledger data model.
//!
//! Ledger entries are owned by the external ledger collaborator and are
//! **read-only** to this pipeline: append-only upstream, immutable here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::ProductId;

/// Kind of inventory movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Customer sale (outflow).
    Sale,
    /// Internal consumption, e.g. kitting or production (outflow).
    Consumption,
    /// Inbound receipt from a supplier.
    Receipt,
    /// Manual stock correction.
    Adjustment,
    /// Movement between locations.
    Transfer,
}

impl MovementKind {
    /// Whether this movement counts toward demand aggregation.
    ///
    /// Adjustments, receipts and transfers are excluded: they change stock
    /// but do not reflect what customers/consumers actually pulled.
    pub fn consumes_demand(&self) -> bool {
        matches!(self, MovementKind::Sale | MovementKind::Consumption)
    }
}

/// One inventory movement (immutable once recorded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
    /// Signed quantity: negative for outflows, positive for inflows.
    pub quantity: i64,
    pub kind: MovementKind,
    /// Voided entries are kept for audit but never aggregated.
    pub voided: bool,
}

impl LedgerEntry {
    pub fn new(
        product_id: ProductId,
        occurred_at: DateTime<Utc>,
        quantity: i64,
        kind: MovementKind,
    ) -> Self {
        Self {
            product_id,
            occurred_at,
            quantity,
            kind,
            voided: false,
        }
    }

    pub fn voided(mut self) -> Self {
        self.voided = true;
        self
    }

    /// Whether this entry contributes to the demand series.
    pub fn counts_as_demand(&self) -> bool {
        !self.voided && self.kind.consumes_demand()
    }

    /// Demand magnitude of this entry (absolute outflow quantity).
    pub fn demand_quantity(&self) -> f64 {
        self.quantity.unsigned_abs() as f64
    }
}
