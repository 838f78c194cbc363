//! The cart store: owns the live snapshot and runs the three mutations.
//!
//! Each mutation follows the same sequence while holding the write lock:
//!
//! 1. read the current snapshot
//! 2. look up stock (and product details when appending)
//! 3. build the next snapshot with a pure `Cart` transition
//! 4. persist the next snapshot under [`CART_STORAGE_KEY`]
//! 5. publish it as the live snapshot
//!
//! A failure at any step leaves both the live snapshot and the stored payload
//! as they were. Failures are reported through the [`Notifier`] and returned
//! as a [`MutationOutcome`]; no operation returns an `Err`.

use std::sync::Arc;

use cartkit_cart::{Cart, OutOfStock, Quantity};
use cartkit_core::ProductId;
use tokio::sync::{Mutex, watch};

use crate::catalog::CatalogService;
use crate::error::CartError;
use crate::notify::{NoticeKind, Notification, Notifier};
use crate::storage::{CART_STORAGE_KEY, KeyValueStore};

/// How a cart operation resolved.
#[derive(Debug)]
pub enum MutationOutcome {
    /// The new snapshot was persisted and is now live.
    Committed(Arc<Cart>),
    /// Invalid input (non-positive amount); nothing happened, nobody was told.
    Ignored,
    /// Stock cannot cover the requested amount; a warning was emitted.
    OutOfStock(OutOfStock),
    /// Something went wrong; an error notification was emitted.
    Failed(CartError),
}

impl MutationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, MutationOutcome::Committed(_))
    }

    pub fn committed_cart(&self) -> Option<&Arc<Cart>> {
        match self {
            MutationOutcome::Committed(cart) => Some(cart),
            _ => None,
        }
    }
}

/// What a mutation decided before anything is persisted.
enum Decision {
    Commit(Cart),
    Reject(OutOfStock),
    Ignore,
}

pub struct CartStore {
    catalog: Arc<dyn CatalogService>,
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    snapshot: watch::Sender<Arc<Cart>>,
    /// Serializes read-decide-persist-commit so mutations never interleave.
    write_lock: Mutex<()>,
}

impl core::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &*self.snapshot.borrow())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Build the store, restoring the cart saved under [`CART_STORAGE_KEY`].
    ///
    /// Never fails: a missing payload yields an empty cart; an unreadable or
    /// corrupt payload yields an empty cart plus a `RestoreFailed` warning.
    pub async fn hydrate(
        catalog: Arc<dyn CatalogService>,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cart = match load_cart(storage.as_ref()).await {
            Ok(cart) => {
                tracing::info!(entries = cart.len(), "restored cart");
                cart
            }
            Err(err) => {
                tracing::warn!("failed to restore saved cart, starting empty: {err}");
                notifier.notify(Notification::new(NoticeKind::RestoreFailed));
                Cart::empty()
            }
        };

        let (snapshot, _) = watch::channel(Arc::new(cart));

        Self {
            catalog,
            storage,
            notifier,
            snapshot,
            write_lock: Mutex::new(()),
        }
    }

    /// Current snapshot.
    pub fn cart(&self) -> Arc<Cart> {
        self.snapshot.borrow().clone()
    }

    /// Receiver that observes every committed snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.snapshot.subscribe()
    }

    /// Add one unit of `product_id`, appending it when it is not in the cart.
    #[tracing::instrument(skip_all, fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> MutationOutcome {
        let _guard = self.write_lock.lock().await;
        let decision = self.decide_add(product_id).await;
        self.finish(decision, NoticeKind::AddFailed).await
    }

    /// Remove the entry for `product_id`.
    #[tracing::instrument(skip_all, fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> MutationOutcome {
        let _guard = self.write_lock.lock().await;
        let decision = self
            .cart()
            .without(product_id)
            .map(Decision::Commit)
            .map_err(CartError::from);
        self.finish(decision, NoticeKind::RemoveFailed).await
    }

    /// Set the entry for `product_id` to exactly `amount`.
    ///
    /// `amount <= 0` is ignored silently.
    #[tracing::instrument(skip_all, fields(product_id = %product_id, amount = amount))]
    pub async fn update_product_amount(&self, product_id: ProductId, amount: i64) -> MutationOutcome {
        let _guard = self.write_lock.lock().await;
        let decision = self.decide_update(product_id, amount).await;
        self.finish(decision, NoticeKind::UpdateFailed).await
    }

    async fn decide_add(&self, product_id: ProductId) -> Result<Decision, CartError> {
        let current = self.cart();
        let stock = self.catalog.stock(product_id).await?;

        let requested = i64::from(current.amount_of(product_id)) + 1;
        if let Err(rejection) = stock.ensure_covers(requested) {
            return Ok(Decision::Reject(rejection));
        }

        let next = if current.contains(product_id) {
            current.with_incremented(product_id)?
        } else {
            let product = self.catalog.product(product_id).await?;
            current.with_appended(product)?
        };
        Ok(Decision::Commit(next))
    }

    async fn decide_update(&self, product_id: ProductId, amount: i64) -> Result<Decision, CartError> {
        if amount <= 0 {
            return Ok(Decision::Ignore);
        }

        let stock = self.catalog.stock(product_id).await?;
        if let Err(rejection) = stock.ensure_covers(amount) {
            return Ok(Decision::Reject(rejection));
        }

        let quantity = Quantity::from_signed(amount)?;
        let next = self.cart().with_amount(product_id, quantity)?;
        Ok(Decision::Commit(next))
    }

    /// Persist and publish a commit, or report why there is none.
    async fn finish(
        &self,
        decision: Result<Decision, CartError>,
        failure: NoticeKind,
    ) -> MutationOutcome {
        let decision = match decision {
            Ok(decision) => decision,
            Err(err) => return self.fail(err, failure),
        };

        match decision {
            Decision::Ignore => {
                tracing::debug!("ignored non-positive amount");
                MutationOutcome::Ignored
            }
            Decision::Reject(rejection) => {
                tracing::info!(
                    requested = rejection.requested,
                    available = rejection.available,
                    "rejected: out of stock"
                );
                self.notifier
                    .notify(Notification::new(NoticeKind::OutOfStock));
                MutationOutcome::OutOfStock(rejection)
            }
            Decision::Commit(next) => {
                if let Err(err) = self.persist(&next).await {
                    return self.fail(err, failure);
                }
                let next = Arc::new(next);
                self.snapshot.send_replace(next.clone());
                tracing::info!(
                    entries = next.len(),
                    units = next.total_units(),
                    "cart committed"
                );
                MutationOutcome::Committed(next)
            }
        }
    }

    async fn persist(&self, cart: &Cart) -> Result<(), CartError> {
        let payload = serde_json::to_string(cart)?;
        self.storage.set(CART_STORAGE_KEY, &payload).await?;
        Ok(())
    }

    fn fail(&self, err: CartError, failure: NoticeKind) -> MutationOutcome {
        if err.is_missing_entry() {
            tracing::warn!("{err}");
        } else {
            tracing::error!("{err}");
        }
        self.notifier.notify(Notification::new(failure));
        MutationOutcome::Failed(err)
    }
}

async fn load_cart(storage: &dyn KeyValueStore) -> Result<Cart, CartError> {
    match storage.get(CART_STORAGE_KEY).await? {
        Some(payload) if !payload.trim().is_empty() => Ok(serde_json::from_str(&payload)?),
        _ => Ok(Cart::empty()),
    }
}
