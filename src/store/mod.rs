//! Key-value store implementations.
//!
//! The cache only ever needs three primitives from a store: `get`, `set` with
//! an expiry, and a multi-key `mget`. Expiry is enforced by the store; the
//! cache never deletes keys.

use crate::error::Result;
use std::time::Duration;

pub mod inmemory;
#[cfg(feature = "redis")]
pub mod redis;

pub use inmemory::InMemoryStore;
#[cfg(feature = "redis")]
pub use redis::{PoolStats, RedisConfig, RedisStore};

/// Trait for key-value store implementations.
///
/// **IMPORTANT:** All methods use `&self` to allow concurrent access.
/// Implementations should use interior mutability or external storage.
///
/// **ASYNC:** All methods are async and must be awaited.
#[allow(async_fn_in_trait)]
pub trait Store: Send + Sync + Clone {
    /// Retrieve value by key.
    ///
    /// # Returns
    /// - `Ok(Some(value))` - Key present and not expired
    /// - `Ok(None)` - Key absent or expired
    ///
    /// # Errors
    /// Returns `Err` on transport or store failure only.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store value with an expiry.
    ///
    /// # Errors
    /// Returns `Err` if the store rejects the write or is unreachable.
    async fn set(&self, key: &str, value: &str, expiry: Duration) -> Result<()>;

    /// Bulk get.
    ///
    /// The result has the same length and order as `keys`.
    /// Default implementation calls `get()` for each key.
    /// Override for batch efficiency (e.g., Redis MGET).
    ///
    /// # Errors
    /// Returns `Err` if store error occurs
    async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            results.push(self.get(key).await?);
        }
        Ok(results)
    }

    /// Remaining time before `key` expires.
    ///
    /// `Ok(None)` when the key is absent or has no expiry.
    ///
    /// # Errors
    /// Returns `Err` if the store cannot report expiries.
    async fn ttl(&self, _key: &str) -> Result<Option<Duration>> {
        Err(crate::error::Error::NotImplemented(
            "ttl not implemented for this store".to_string(),
        ))
    }

    /// Health check - verify the store is accessible.
    ///
    /// # Errors
    /// Returns `Err` if the store is not accessible
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    /// Optional: Clear every key (use with caution).
    ///
    /// # Errors
    /// Returns `Err` if operation is not implemented or fails
    async fn clear_all(&self) -> Result<()> {
        Err(crate::error::Error::NotImplemented(
            "clear_all not implemented for this store".to_string(),
        ))
    }
}
