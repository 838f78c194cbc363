use serde::{Deserialize, Serialize};
use thiserror::Error;

use cartkit_core::ProductId;

/// Stock available for a product at the moment of a lookup.
///
/// Never cached: every mutation fetches a fresh level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub product_id: ProductId,
    pub available: i64,
}

/// A requested quantity the stock cannot cover.
///
/// This is a business rejection, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("requested {requested} of product {product_id}, only {available} in stock")]
pub struct OutOfStock {
    pub product_id: ProductId,
    pub requested: i64,
    pub available: i64,
}

impl StockLevel {
    pub fn new(product_id: ProductId, available: i64) -> Self {
        Self {
            product_id,
            available,
        }
    }

    /// Accept `requested` only when it does not exceed the available stock.
    pub fn ensure_covers(&self, requested: i64) -> Result<(), OutOfStock> {
        if requested > self.available {
            return Err(OutOfStock {
                product_id: self.product_id,
                requested,
                available: self.available,
            });
        }
        Ok(())
    }
}
