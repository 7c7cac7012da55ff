//! `stockcast-series` — Demand Series Builder.
//!
//! Turns raw inventory-ledger events into a clean per-product daily demand
//! series: filter demand-consuming movements, group by calendar day, sum the
//! absolute outflow. Derived data only — series are recomputable and
//! disposable, rebuilt with upsert semantics (never appended twice).

pub mod batch;
pub mod builder;
pub mod point;
pub mod store;

pub use batch::BatchSummary;
pub use builder::SeriesBuilder;
pub use point::{DemandPoint, DemandSeries};
pub use store::{ChunkOutcome, DemandPointStore, InMemoryDemandPointStore, Upsert};
