//! Shared tracing/logging setup for pipeline hosts.
//!
//! The pipeline crates emit structured `tracing` events (clamp warnings,
//! batch progress, per-product failures); hosts call [`init`] once at
//! startup to collect them.

pub mod tracing;

/// Initialize process-wide observability (tracing/logging).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}
