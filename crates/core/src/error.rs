//! Pipeline error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the pipeline crates.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline-level error.
///
/// Keep this focused on deterministic computation failures. Storage and
/// transport concerns belong to the adapters behind the ports.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// Below the minimum required history for the requested algorithm/horizon.
    /// Recoverable: request fewer points or collect more data.
    #[error("insufficient data for {context}: need {needed} points, got {got}")]
    InsufficientData {
        needed: usize,
        got: usize,
        context: String,
    },

    /// An out-of-range parameter or value that cannot be safely auto-clamped.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An unresolvable product reference.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// Unexpected numeric failure (e.g. NaN propagation). Always names the
    /// product and algorithm for diagnosis.
    #[error("computation failed for product {product_id} ({algorithm}): {detail}")]
    Computation {
        product_id: ProductId,
        algorithm: String,
        detail: String,
    },
}

impl PipelineError {
    pub fn insufficient_data(needed: usize, got: usize, context: impl Into<String>) -> Self {
        Self::InsufficientData {
            needed,
            got,
            context: context.into(),
        }
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn computation(
        product_id: ProductId,
        algorithm: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::Computation {
            product_id,
            algorithm: algorithm.into(),
            detail: detail.into(),
        }
    }
}
