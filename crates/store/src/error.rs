//! Failures contained inside a cart operation.

use cartkit_core::DomainError;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::storage::StorageError;

/// Why a cart operation failed. Never escapes the store as an `Err`; it is
/// reported through a notification and carried by `MutationOutcome::Failed`.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("cart persistence failed: {0}")]
    Storage(#[from] StorageError),

    #[error("cart serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl CartError {
    /// The operation addressed an entry that is not in the cart.
    pub fn is_missing_entry(&self) -> bool {
        matches!(self, CartError::Domain(e) if e.is_not_found())
    }
}
