//! `stockcast-core` — domain foundation for the demand pipeline.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the error taxonomy, the inventory ledger data model, and the
//! collaborator ports the pipeline consumes.

pub mod error;
pub mod id;
pub mod ledger;
pub mod ports;
pub mod product;

pub use error::{PipelineError, PipelineResult};
pub use id::{ProductId, ProfileId};
pub use ledger::{LedgerEntry, MovementKind};
pub use ports::{InMemoryLedger, InMemoryProducts, LedgerReader, ProductReader, StockReader};
pub use product::{Product, StockPosition};
