//! Durable key-value storage for the cart payload.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

/// Fixed, namespaced key the cart payload is stored under.
pub const CART_STORAGE_KEY: &str = "@cartkit:cart";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage read failed: {0}")]
    Read(String),
    #[error("storage write failed: {0}")]
    Write(String),
}

/// String key-value store.
///
/// A `set` that returns `Ok` must be durable; partial writes are not modelled.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory key-value store.
///
/// Intended for tests/dev. Writes can be switched to fail.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
    failing_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `value` already stored under `key`.
    pub fn with_value(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.into(), value.into());
        }
        self
    }

    pub fn set_failing_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    /// Synchronous peek, handy for assertions.
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.values.read().ok().and_then(|values| values.get(key).cloned())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .read()
            .map_err(|_| StorageError::Read("lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Write("writes disabled".to_string()));
        }
        let mut values = self
            .values
            .write()
            .map_err(|_| StorageError::Write("lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(CART_STORAGE_KEY).await.unwrap(), None);

        storage.set(CART_STORAGE_KEY, "[]").await.unwrap();
        assert_eq!(
            storage.get(CART_STORAGE_KEY).await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn failing_writes_keep_previous_value() {
        let storage = MemoryStorage::new().with_value(CART_STORAGE_KEY, "old");
        storage.set_failing_writes(true);

        let err = storage.set(CART_STORAGE_KEY, "new").await.unwrap_err();
        assert!(matches!(err, StorageError::Write(_)));
        assert_eq!(storage.snapshot(CART_STORAGE_KEY).as_deref(), Some("old"));
    }
}
