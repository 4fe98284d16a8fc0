//! Stale-while-revalidate cache - main entry point.
//!
//! # Protocol
//!
//! Each cached item lives under two store keys: the value under `K` and a
//! freshness marker under `K.stale`. `set` writes the marker with expiry
//! `ttl` and the value with `ttl + 2 × regeneration_budget`, so the value
//! outlives its marker.
//!
//! ```text
//! fetch(K)
//!   ├─ disabled?            → producer() directly, no store access
//!   ├─ read K, read K.stale
//!   ├─ K.stale absent?      → write K.stale = "refreshing" (budget), treat K as missing
//!   ├─ K present?           → return K                 (fast path / stale serve)
//!   └─ otherwise            → producer(), set(K), return new value
//! ```
//!
//! While one caller regenerates, the marker reads `"refreshing"` and every
//! other caller is served the old value until the new one lands.
//!
//! The claim is a plain read followed by a write. Two callers that both read
//! an absent marker before either writes it will both regenerate; the window
//! is bounded by the store round trip, not eliminated.

use crate::config::{ExpirySchedule, FetchConfig, DISABLED_ENV};
use crate::error::{Error, Result};
use crate::key::{stale_key, Marker};
use crate::observability::{CacheMetrics, NoOpMetrics};
use crate::store::Store;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Output of a producer: the fresh value and, optionally, how long it stays
/// fresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Produced {
    pub value: String,

    /// Freshness window for this value. When `None` the fetch falls back to
    /// `FetchConfig::ttl`.
    pub ttl: Option<Duration>,
}

impl Produced {
    pub fn new(value: impl Into<String>, ttl: Duration) -> Self {
        Produced {
            value: value.into(),
            ttl: Some(ttl),
        }
    }

    /// Value that takes its freshness window from the call's `FetchConfig`.
    pub fn without_ttl(value: impl Into<String>) -> Self {
        Produced {
            value: value.into(),
            ttl: None,
        }
    }
}

/// Stale-while-revalidate cache over a key-value store.
///
/// # Example
///
/// ```ignore
/// use stale_cache::{FetchConfig, Produced, StaleCache, store::InMemoryStore};
/// use std::time::Duration;
///
/// let cache = StaleCache::new(InMemoryStore::new());
/// let config = FetchConfig::default().with_regeneration_budget(Duration::from_secs(2));
///
/// let report = cache
///     .fetch("report:daily", || async {
///         let body = build_report().await?;
///         Ok::<_, stale_cache::Error>(Produced::new(body, Duration::from_secs(300)))
///     }, &config)
///     .await?;
/// ```
pub struct StaleCache<S: Store> {
    store: S,
    disabled: bool,
    metrics: Box<dyn CacheMetrics>,
}

impl<S: Store> StaleCache<S> {
    /// Create a new cache over the given store.
    pub fn new(store: S) -> Self {
        StaleCache {
            store,
            disabled: false,
            metrics: Box::new(NoOpMetrics),
        }
    }

    /// Create a cache whose disabled flag comes from `STALE_CACHE_DISABLED`.
    ///
    /// `1`, `true` and `yes` (any case) disable it; anything else, or an
    /// unset variable, leaves it enabled.
    pub fn from_env(store: S) -> Self {
        let disabled = std::env::var(DISABLED_ENV)
            .map(|v| {
                matches!(
                    v.trim().to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes"
                )
            })
            .unwrap_or(false);

        if disabled {
            info!("Stale cache disabled via {}", DISABLED_ENV);
        }

        Self::new(store).with_disabled(disabled)
    }

    /// Disable the cache process-wide: every fetch calls its producer and
    /// nothing touches the store.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: Box<dyn CacheMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Get store reference (for advanced use).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch `key`, regenerating it through `producer` when required.
    ///
    /// Serves the cached value while its marker is present, even once the
    /// value is stale and another caller is regenerating it. When the marker
    /// has expired, this caller claims regeneration and awaits the producer.
    ///
    /// The producer's TTL wins over `config.ttl`, which only applies when the
    /// producer returns `Produced::without_ttl`.
    ///
    /// # Errors
    ///
    /// - Producer errors are returned as-is and leave the store untouched
    ///   (the claim stays until its budget runs out).
    /// - Store failures and an invalid `config` are converted with
    ///   `E::from(Error)`.
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
        if self.disabled || config.disabled {
            debug!("» Cache disabled, calling producer for {}", key);
            self.metrics.record_bypass(key);
            return producer().await.map(|produced| produced.value);
        }

        config.validate()?;

        let timer = Instant::now();
        let marker_key = stale_key(key);

        let cached = self.observe(key, self.store.get(key).await)?;
        let marker = self.observe(key, self.store.get(&marker_key).await)?;

        let cached = match marker.as_deref().filter(|m| !m.is_empty()) {
            Some(raw) => {
                if Marker::parse(raw).is_none() {
                    warn!("Unknown freshness marker {:?} for {}", raw, key);
                }
                cached
            }
            None => {
                // Claim before anything else so concurrent callers serve the
                // old value for the next regeneration budget.
                self.observe(
                    key,
                    self.store
                        .set(
                            &marker_key,
                            Marker::Refreshing.as_str(),
                            config.regeneration_budget,
                        )
                        .await,
                )?;
                self.metrics.record_claim(key);
                debug!(
                    "» Marker expired for {}, claimed regeneration for {:?}",
                    key, config.regeneration_budget
                );
                None
            }
        };

        if let Some(value) = cached.filter(|v| !v.is_empty()) {
            self.metrics.record_hit(key, timer.elapsed());
            return Ok(value);
        }

        debug!("» Regenerating {}", key);
        let produced = producer().await?;

        let ttl = produced.ttl.unwrap_or(config.ttl);
        self.set(key, &produced.value, ttl, config.regeneration_budget)
            .await?;

        self.metrics.record_miss(key, timer.elapsed());
        Ok(produced.value)
    }

    /// Store `value` under `key` and reset its freshness schedule.
    ///
    /// Writes the marker `"good"` with expiry `ttl`, then the value with
    /// expiry `ttl + 2 × regeneration_budget`. The two writes are not a
    /// transaction: if the marker write fails the value write is skipped and
    /// the previous value stays in place.
    ///
    /// A no-op when the cache is disabled.
    ///
    /// # Errors
    ///
    /// - `Error::ConfigError` for a zero `ttl` or `regeneration_budget`
    /// - `Error::StoreError` if either write fails
    pub async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        regeneration_budget: Duration,
    ) -> Result<()> {
        if self.disabled {
            debug!("Cache disabled, skipping SET {}", key);
            return Ok(());
        }

        let schedule = ExpirySchedule::new(ttl, regeneration_budget)?;
        let timer = Instant::now();

        self.observe(
            key,
            self.store
                .set(&stale_key(key), Marker::Good.as_str(), schedule.marker)
                .await,
        )?;
        self.observe(key, self.store.set(key, value, schedule.value).await)?;

        self.metrics.record_set(key, timer.elapsed());
        debug!(
            "✓ Cached {} (fresh for {:?}, kept for {:?})",
            key, schedule.marker, schedule.value
        );
        Ok(())
    }

    /// Read several values in one round trip.
    ///
    /// Freshness markers are not consulted: whatever is stored is returned
    /// verbatim, with absent keys mapped to `""`. The result matches `keys` in
    /// length and order. Returns all empty strings when the cache is disabled.
    ///
    /// # Errors
    /// Returns `Error::StoreError` if the multi-get fails.
    pub async fn get_all(&self, keys: &[&str]) -> Result<Vec<String>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        if self.disabled {
            return Ok(vec![String::new(); keys.len()]);
        }

        let values = self.observe_batch(self.store.mget(keys).await)?;
        Ok(values
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect())
    }

    fn observe<T>(&self, key: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.metrics.record_error(key, &e.to_string());
        }
        result
    }

    fn observe_batch<T>(&self, result: Result<T>) -> Result<T> {
        self.observe("<mget>", result)
    }
}
