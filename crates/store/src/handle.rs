//! Shared handle over the cart store, passed to every UI component that needs
//! the cart.

use std::sync::Arc;

use cartkit_cart::Cart;
use cartkit_core::ProductId;
use tokio::sync::watch;

use crate::catalog::CatalogService;
use crate::notify::Notifier;
use crate::storage::KeyValueStore;
use crate::store::{CartStore, MutationOutcome};

/// Read access to the cart plus the three mutators.
///
/// Cheap to clone; all clones drive the same store.
#[derive(Debug, Clone)]
pub struct CartHandle {
    store: Arc<CartStore>,
}

impl CartHandle {
    pub fn new(store: CartStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Hydrate a store from `storage` and wrap it.
    pub async fn open(
        catalog: Arc<dyn CatalogService>,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::new(CartStore::hydrate(catalog, storage, notifier).await)
    }

    /// Current snapshot.
    pub fn cart(&self) -> Arc<Cart> {
        self.store.cart()
    }

    pub fn subscribe(&self) -> CartWatcher {
        CartWatcher {
            rx: self.store.subscribe(),
        }
    }

    pub async fn add_product(&self, product_id: ProductId) -> MutationOutcome {
        self.store.add_product(product_id).await
    }

    pub async fn remove_product(&self, product_id: ProductId) -> MutationOutcome {
        self.store.remove_product(product_id).await
    }

    pub async fn update_product_amount(&self, product_id: ProductId, amount: i64) -> MutationOutcome {
        self.store.update_product_amount(product_id, amount).await
    }
}

/// Observes committed snapshots.
#[derive(Debug, Clone)]
pub struct CartWatcher {
    rx: watch::Receiver<Arc<Cart>>,
}

impl CartWatcher {
    /// Latest committed snapshot.
    pub fn current(&self) -> Arc<Cart> {
        self.rx.borrow().clone()
    }

    /// Wait for the next commit and return it. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Arc<Cart>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
