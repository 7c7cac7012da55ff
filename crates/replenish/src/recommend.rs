//! Order quantity recommendation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use stockcast_core::{PipelineResult, ProductId, StockPosition, StockReader};
use stockcast_forecast::ForecastResult;

/// Multiplicative margin applied to predicted demand before sizing an order.
pub const SAFETY_BUFFER: f64 = 1.2;

/// The inputs a recommendation was computed from, kept for audit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderInputs {
    pub predicted_demand: f64,
    pub buffered_demand: f64,
    pub stock: i64,
    pub reorder_point: i64,
}

/// Replenishment decision for one product.
///
/// Ephemeral output: callers persist it only if they choose to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecommendation {
    pub product_id: ProductId,
    /// Recommended order quantity, never negative; 0 when no order is needed.
    pub quantity: i64,
    pub order_warranted: bool,
    pub inputs: OrderInputs,
    pub justification: String,
}

/// Decide whether to order and how much.
///
/// An order is warranted only when stock is at or below the reorder point.
/// Quantity = `ceil(predicted * SAFETY_BUFFER) - stock + reorder_point`,
/// floored at 0.
pub fn recommend(
    product_id: ProductId,
    forecast: &ForecastResult,
    position: StockPosition,
) -> OrderRecommendation {
    let predicted = forecast.total_predicted;
    let buffered = predicted * SAFETY_BUFFER;
    let inputs = OrderInputs {
        predicted_demand: predicted,
        buffered_demand: buffered,
        stock: position.stock,
        reorder_point: position.reorder_point,
    };

    if !position.below_reorder_point() {
        let justification = format!(
            "no order needed: stock {} is above reorder point {} (predicted demand {:.1}, \
             buffered {:.1})",
            position.stock, position.reorder_point, predicted, buffered
        );
        return OrderRecommendation {
            product_id,
            quantity: 0,
            order_warranted: false,
            inputs,
            justification,
        };
    }

    let quantity = (buffered.ceil() as i64 - position.stock + position.reorder_point).max(0);
    debug!(
        product_id = %product_id,
        quantity,
        stock = position.stock,
        reorder_point = position.reorder_point,
        "order recommended"
    );
    let justification = format!(
        "order {} units: ceil(predicted {:.1} x {SAFETY_BUFFER}) = {:.0} buffered demand, \
         minus stock {}, plus reorder point {}",
        quantity,
        predicted,
        buffered.ceil(),
        position.stock,
        position.reorder_point
    );
    OrderRecommendation {
        product_id,
        quantity,
        order_warranted: quantity > 0,
        inputs,
        justification,
    }
}

/// Recommend using the current stock position read through the stock port.
pub fn recommend_for_product<S: StockReader>(
    stock: &S,
    product_id: ProductId,
    forecast: &ForecastResult,
) -> PipelineResult<OrderRecommendation> {
    let position = stock.stock_position(product_id)?;
    Ok(recommend(product_id, forecast, position))
}
