//! SQLite-backed key-value storage for the cart payload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

use crate::storage::{KeyValueStore, StorageError};

/// Key-value store in a local SQLite file.
///
/// The pool is opened on first use, so constructing the store never touches
/// the filesystem. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    path: PathBuf,
    pool: Arc<Mutex<Option<SqlitePool>>>,
}

impl SqliteStorage {
    /// Store backed by the database file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool: Arc::new(Mutex::new(None)),
        }
    }

    /// Store at the default location, `{app_data_dir}/cartkit/cart.db`.
    pub fn open_default() -> Result<Self, StorageError> {
        Ok(Self::open(default_db_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the pool, initializing it if necessary.
    async fn get_pool(&self) -> Result<SqlitePool, StorageError> {
        let mut pool_guard = self.pool.lock().await;
        if let Some(pool) = pool_guard.as_ref() {
            return Ok(pool.clone());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Unavailable(format!(
                    "failed to create storage directory at {parent:?}: {e}"
                ))
            })?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", self.path.to_string_lossy());
        let pool = SqlitePool::connect(&db_url).await.map_err(|e| {
            StorageError::Unavailable(format!(
                "failed to open SQLite database at {:?}: {e}",
                self.path
            ))
        })?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS key_value (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StorageError::Unavailable(format!("failed to create key_value table: {e}")))?;

        tracing::debug!(path = ?self.path, "opened cart storage");
        *pool_guard = Some(pool.clone());
        Ok(pool)
    }
}

#[async_trait::async_trait]
impl KeyValueStore for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let pool = self.get_pool().await?;

        let row = sqlx::query(
            r#"
            SELECT value
            FROM key_value
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&pool)
        .await
        .map_err(|e| StorageError::Read(e.to_string()))?;

        match row {
            Some(row) => {
                let value: String = row
                    .try_get("value")
                    .map_err(|e| StorageError::Read(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let pool = self.get_pool().await?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO key_value (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key)
            DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&pool)
        .await
        .map_err(|e| StorageError::Write(e.to_string()))?;

        Ok(())
    }
}

/// Resolve the default database path: `{app_data_dir}/cartkit/cart.db`.
pub fn default_db_path() -> Result<PathBuf, StorageError> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .ok_or_else(|| {
            StorageError::Unavailable(
                "failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share"
                    .to_string(),
            )
        })?;

    dir.push("cartkit");
    dir.push("cart.db");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CART_STORAGE_KEY;

    #[tokio::test]
    async fn creates_database_lazily_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cart.db");
        let storage = SqliteStorage::open(&path);
        assert!(!path.exists());

        assert_eq!(storage.get(CART_STORAGE_KEY).await.unwrap(), None);
        assert!(path.exists());

        storage.set(CART_STORAGE_KEY, r#"[{"id":1,"amount":1}]"#).await.unwrap();
        assert_eq!(
            storage.get(CART_STORAGE_KEY).await.unwrap().as_deref(),
            Some(r#"[{"id":1,"amount":1}]"#)
        );
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::open(dir.path().join("cart.db"));

        storage.set(CART_STORAGE_KEY, "first").await.unwrap();
        storage.set(CART_STORAGE_KEY, "second").await.unwrap();

        assert_eq!(
            storage.get(CART_STORAGE_KEY).await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn values_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.db");

        SqliteStorage::open(&path).set("k", "v").await.unwrap();

        let reopened = SqliteStorage::open(&path);
        assert_eq!(reopened.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn default_path_ends_with_cartkit_db() {
        if let Ok(path) = default_db_path() {
            assert!(path.ends_with("cartkit/cart.db"));
        }
    }
}
