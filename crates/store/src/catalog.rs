//! Catalog/stock lookups consumed by the cart store.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use cartkit_cart::{Product, StockLevel};
use cartkit_core::ProductId;
use thiserror::Error;

/// Errors surfaced by a catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("product {0} not found in catalog")]
    NotFound(ProductId),
    #[error("network error: {0}")]
    Network(String),
    #[error("catalog API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Remote source of product details and stock levels.
///
/// Implementations must return an `Err` for every failed lookup (including
/// unknown products) so the store can tell failure from success.
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Stock currently available for `product_id`.
    async fn stock(&self, product_id: ProductId) -> Result<StockLevel, CatalogError>;

    /// Full product details for `product_id`.
    async fn product(&self, product_id: ProductId) -> Result<Product, CatalogError>;
}

/// In-memory catalog.
///
/// Intended for tests/demos. Lookups can be switched to fail to exercise the
/// store's failure paths.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<ProductId, Product>>,
    stock: RwLock<HashMap<ProductId, i64>>,
    failing: AtomicBool,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product with its stock level.
    pub fn with_product(self, product: Product, available: i64) -> Self {
        self.insert(product, available);
        self
    }

    pub fn insert(&self, product: Product, available: i64) {
        let id = product.id;
        if let Ok(mut products) = self.products.write() {
            products.insert(id, product);
        }
        self.set_stock(id, available);
    }

    /// Set stock without registering product details (the product lookup will
    /// then fail with `NotFound`).
    pub fn set_stock(&self, product_id: ProductId, available: i64) {
        if let Ok(mut stock) = self.stock.write() {
            stock.insert(product_id, available);
        }
    }

    /// Make every subsequent lookup fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), CatalogError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable("lookups disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogService for InMemoryCatalog {
    async fn stock(&self, product_id: ProductId) -> Result<StockLevel, CatalogError> {
        self.ensure_available()?;
        let stock = self
            .stock
            .read()
            .map_err(|_| CatalogError::Unavailable("lock poisoned".to_string()))?;

        stock
            .get(&product_id)
            .map(|available| StockLevel::new(product_id, *available))
            .ok_or(CatalogError::NotFound(product_id))
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, CatalogError> {
        self.ensure_available()?;
        let products = self
            .products
            .read()
            .map_err(|_| CatalogError::Unavailable("lock poisoned".to_string()))?;

        products
            .get(&product_id)
            .cloned()
            .ok_or(CatalogError::NotFound(product_id))
    }
}
