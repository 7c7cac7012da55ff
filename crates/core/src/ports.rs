//! Collaborator ports.
//!
//! The pipeline is a computation library: it reads ledger entries, product
//! metadata and stock positions through these traits, and external adapters
//! (REST/CLI/storage) implement them. In-memory implementations are provided
//! for tests and dev.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::error::{PipelineError, PipelineResult};
use crate::id::ProductId;
use crate::ledger::LedgerEntry;
use crate::product::{Product, StockPosition};

/// Read access to the inventory ledger (append-only, externally owned).
pub trait LedgerReader {
    /// All entries for one product within `[from, to]` (inclusive),
    /// chronological order.
    fn entries(
        &self,
        product_id: ProductId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> PipelineResult<Vec<LedgerEntry>>;
}

/// Read access to the product catalog.
pub trait ProductReader {
    fn product(&self, product_id: ProductId) -> PipelineResult<Product>;

    /// All known product ids, for batch operations.
    fn product_ids(&self) -> PipelineResult<Vec<ProductId>>;
}

/// Read access to current stock levels and reorder points.
pub trait StockReader {
    fn stock_position(&self, product_id: ProductId) -> PipelineResult<StockPosition>;
}

/// In-memory ledger.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: RwLock<Vec<LedgerEntry>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: LedgerEntry) {
        self.entries
            .write()
            .expect("ledger lock poisoned")
            .push(entry);
    }

    pub fn record_all(&self, entries: impl IntoIterator<Item = LedgerEntry>) {
        let mut guard = self.entries.write().expect("ledger lock poisoned");
        guard.extend(entries);
    }
}

impl LedgerReader for InMemoryLedger {
    fn entries(
        &self,
        product_id: ProductId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> PipelineResult<Vec<LedgerEntry>> {
        let guard = self
            .entries
            .read()
            .map_err(|_| PipelineError::invalid_parameter("ledger lock poisoned"))?;
        let mut out: Vec<LedgerEntry> = guard
            .iter()
            .filter(|e| {
                e.product_id == product_id && e.occurred_at >= from && e.occurred_at <= to
            })
            .cloned()
            .collect();
        out.sort_by_key(|e| e.occurred_at);
        Ok(out)
    }
}

/// In-memory product catalog keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryProducts {
    products: RwLock<HashMap<ProductId, Product>>,
    positions: RwLock<HashMap<ProductId, StockPosition>>,
}

impl InMemoryProducts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product: Product) {
        self.products
            .write()
            .expect("catalog lock poisoned")
            .insert(product.id, product);
    }

    pub fn set_stock_position(&self, product_id: ProductId, position: StockPosition) {
        self.positions
            .write()
            .expect("catalog lock poisoned")
            .insert(product_id, position);
    }
}

impl ProductReader for InMemoryProducts {
    fn product(&self, product_id: ProductId) -> PipelineResult<Product> {
        self.products
            .read()
            .map_err(|_| PipelineError::invalid_parameter("catalog lock poisoned"))?
            .get(&product_id)
            .cloned()
            .ok_or(PipelineError::ProductNotFound(product_id))
    }

    fn product_ids(&self) -> PipelineResult<Vec<ProductId>> {
        let guard = self
            .products
            .read()
            .map_err(|_| PipelineError::invalid_parameter("catalog lock poisoned"))?;
        let mut ids: Vec<ProductId> = guard.keys().copied().collect();
        // Deterministic batch order regardless of hash-map iteration.
        ids.sort();
        Ok(ids)
    }
}

impl StockReader for InMemoryProducts {
    fn stock_position(&self, product_id: ProductId) -> PipelineResult<StockPosition> {
        self.positions
            .read()
            .map_err(|_| PipelineError::invalid_parameter("catalog lock poisoned"))?
            .get(&product_id)
            .copied()
            .ok_or(PipelineError::ProductNotFound(product_id))
    }
}
