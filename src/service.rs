//! High-level cache service for web applications.
//!
//! Provides a convenient wrapper around StaleCache with Arc for easy sharing.

use crate::cache::{Produced, StaleCache};
use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::observability::CacheMetrics;
use crate::store::Store;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Shareable handle to a `StaleCache`.
///
/// `StaleCache` holds no in-process state besides its store handle and
/// metrics, so it can sit behind an `Arc` without a `Mutex`.
///
/// # Example
///
/// ```ignore
/// use stale_cache::{CacheService, store::RedisStore};
///
/// let cache = CacheService::new(RedisStore::from_env().await?);
///
/// // In your web service struct
/// pub struct ReportService {
///     cache: CacheService<RedisStore>,
///     db: Arc<Database>,
/// }
/// ```
#[derive(Clone)]
pub struct CacheService<S: Store> {
    cache: Arc<StaleCache<S>>,
}

impl<S: Store> CacheService<S> {
    /// Create a new cache service with the given store.
    pub fn new(store: S) -> Self {
        CacheService {
            cache: Arc::new(StaleCache::new(store)),
        }
    }

    /// Create a new cache service with custom metrics.
    pub fn with_metrics(store: S, metrics: Box<dyn CacheMetrics>) -> Self {
        CacheService {
            cache: Arc::new(StaleCache::new(store).with_metrics(metrics)),
        }
    }

    /// Wrap an already configured cache.
    pub fn from_cache(cache: StaleCache<S>) -> Self {
        CacheService {
            cache: Arc::new(cache),
        }
    }

    /// See `StaleCache::fetch`.
    ///
    /// # Errors
    ///
    /// Producer errors as-is; store and config errors via `E::from(Error)`.
    pub async fn fetch<F, Fut, E>(
        &self,
        key: &str,
        producer: F,
        config: &FetchConfig,
    ) -> std::result::Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Produced, E>>,
        E: From<Error>,
    {
        self.cache.fetch(key, producer, config).await
    }

    /// See `StaleCache::set`.
    ///
    /// # Errors
    ///
    /// `Error::ConfigError` for a zero TTL or budget, `Error::StoreError` on
    /// write failure.
    pub async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        regeneration_budget: Duration,
    ) -> Result<()> {
        self.cache.set(key, value, ttl, regeneration_budget).await
    }

    /// See `StaleCache::get_all`.
    ///
    /// # Errors
    ///
    /// `Error::StoreError` if the multi-get fails.
    pub async fn get_all(&self, keys: &[&str]) -> Result<Vec<String>> {
        self.cache.get_all(keys).await
    }

    /// Get a reference to the underlying cache.
    pub fn cache(&self) -> &StaleCache<S> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn test_service_clones_share_store() {
        let service = CacheService::new(InMemoryStore::new());
        let clone = service.clone();

        service
            .set("k", "shared", Duration::from_secs(10), Duration::from_secs(1))
            .await
            .expect("Failed to set");

        let config = FetchConfig::default().with_regeneration_budget(Duration::from_secs(1));
        let value = clone
            .fetch(
                "k",
                || async { Ok::<_, Error>(Produced::new("fresh", Duration::from_secs(5))) },
                &config,
            )
            .await
            .expect("Failed to fetch");

        assert_eq!(value, "shared");
        assert_eq!(
            clone.get_all(&["k"]).await.expect("Failed to get_all"),
            vec!["shared".to_string()]
        );
    }

    #[tokio::test]
    async fn test_service_from_disabled_cache() {
        let store = InMemoryStore::new();
        let service = CacheService::from_cache(StaleCache::new(store.clone()).with_disabled(true));

        assert!(service.cache().is_disabled());
        service
            .set("k", "v", Duration::from_secs(10), Duration::from_secs(1))
            .await
            .expect("Failed to set");
        assert!(store.is_empty());
    }
}
