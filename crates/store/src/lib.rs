//! `cartkit-store`
//!
//! **Responsibility:** the client-side cart store.
//!
//! This crate provides:
//! - The cart store (add / remove / set-quantity validated against stock)
//! - Persistence of every committed snapshot (SQLite or in-memory)
//! - Catalog/stock lookups over HTTP
//! - User-facing notifications for rejections and failures
//!
//! The catalog API remains the authority on stock; the store never caches it.

pub mod catalog;
pub mod config;
pub mod error;
pub mod handle;
pub mod http_catalog;
pub mod notify;
pub mod sqlite_storage;
pub mod storage;
pub mod store;

pub use catalog::{CatalogError, CatalogService, InMemoryCatalog};
pub use config::{CartConfig, ConfigError};
pub use error::CartError;
pub use handle::{CartHandle, CartWatcher};
pub use http_catalog::HttpCatalog;
pub use notify::{ChannelNotifier, NoticeKind, Notification, Notifier, Severity, TracingNotifier};
pub use sqlite_storage::SqliteStorage;
pub use storage::{CART_STORAGE_KEY, KeyValueStore, MemoryStorage, StorageError};
pub use store::{CartStore, MutationOutcome};
