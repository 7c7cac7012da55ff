//! `stockcast-replenish` — Replenishment Decision Engine.
//!
//! Turns a forecast plus current stock and reorder point into an order
//! recommendation. "No order needed" is a normal result, not an error:
//! callers invoke this opportunistically for every product.

pub mod recommend;

pub use recommend::{
    recommend, recommend_for_product, OrderInputs, OrderRecommendation, SAFETY_BUFFER,
};
