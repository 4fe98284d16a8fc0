//! In-memory store (default, thread-safe, async).
//!
//! Uses DashMap for concurrent access with per-key sharding.
//! Expiry is checked on access against the tokio clock, so tests running with
//! a paused runtime (`tokio::time::pause`) see keys expire deterministically.

use super::Store;
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

struct StoreEntry {
    value: String,
    expires_at: Instant,
}

impl StoreEntry {
    fn new(value: String, expiry: Duration) -> Self {
        StoreEntry {
            value,
            expires_at: Instant::now() + expiry,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    fn remaining(&self) -> Option<Duration> {
        let now = Instant::now();
        (self.expires_at > now).then(|| self.expires_at - now)
    }
}

/// Thread-safe in-memory store with per-key expiry.
///
/// Cloning shares the underlying map, so a clone handed to a `StaleCache` and
/// one kept by a test observe the same keys.
///
/// # Example
///
/// ```no_run
/// use stale_cache::store::{InMemoryStore, Store};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new();
///
///     store.set("key1", "value", Duration::from_secs(300)).await?;
///     assert_eq!(store.get("key1").await?, Some("value".to_string()));
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct InMemoryStore {
    entries: Arc<DashMap<String, StoreEntry>>,
}

impl InMemoryStore {
    /// Create a new, empty in-memory store.
    pub fn new() -> Self {
        InMemoryStore {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Number of entries held, expired ones included until next access.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get memory statistics.
    pub fn stats(&self) -> StoreStats {
        let total_bytes: usize = self.entries.iter().map(|entry| entry.value.len()).sum();
        let expired_count = self
            .entries
            .iter()
            .filter(|entry| entry.is_expired())
            .count();

        StoreStats {
            total_entries: self.entries.len(),
            expired_entries: expired_count,
            total_bytes,
        }
    }

    fn live_value(&self, key: &str) -> Option<String> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.value.clone()),
            _ => None,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(value) = self.live_value(key) {
            debug!("✓ InMemory GET {} -> HIT", key);
            return Ok(Some(value));
        }

        self.entries.remove_if(key, |_, entry| entry.is_expired());
        debug!("✓ InMemory GET {} -> MISS", key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, expiry: Duration) -> Result<()> {
        self.entries
            .insert(key.to_string(), StoreEntry::new(value.to_string(), expiry));
        debug!("✓ InMemory SET {} (expiry: {:?})", key, expiry);
        Ok(())
    }

    async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let results = keys.iter().map(|k| self.live_value(k)).collect();
        debug!("✓ InMemory MGET {} keys", keys.len());
        Ok(results)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        Ok(self.entries.get(key).and_then(|entry| entry.remaining()))
    }

    async fn clear_all(&self) -> Result<()> {
        self.entries.clear();
        warn!("⚠ InMemory CLEAR_ALL executed - all keys cleared!");
        Ok(())
    }
}

/// Store statistics.
#[derive(Clone, Debug)]
pub struct StoreStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub total_bytes: usize,
}
