//! Metrics hooks for the stale-while-revalidate protocol.
//!
//! Implement `CacheMetrics` to feed protocol decisions into your monitoring
//! system:
//!
//! ```ignore
//! use stale_cache::observability::CacheMetrics;
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl CacheMetrics for PrometheusMetrics {
//!     fn record_claim(&self, _key: &str) {
//!         // counter!("cache_regenerations_claimed").inc();
//!     }
//!     // ... override the events you care about
//! }
//!
//! // let cache = StaleCache::new(store).with_metrics(Box::new(PrometheusMetrics));
//! ```
//!
//! Every method has a default that logs through the `log` crate.
//! `StaleCache` uses `NoOpMetrics` unless told otherwise.
//!
//! | Event | Fired when |
//! |-------|------------|
//! | `record_hit` | Cached value served without calling the producer |
//! | `record_claim` | Marker absent, this caller claimed regeneration |
//! | `record_miss` | Producer invoked (genuine or forced miss) |
//! | `record_set` | Value and marker written |
//! | `record_bypass` | Cache disabled, producer called directly |
//! | `record_error` | Store failure surfaced to the caller |

use std::time::Duration;

/// Trait for cache metrics collection.
pub trait CacheMetrics: Send + Sync {
    /// Record a value served from the store.
    fn record_hit(&self, key: &str, duration: Duration) {
        debug!("Cache HIT: {} took {:?}", key, duration);
    }

    /// Record a regeneration, timed from the start of the fetch to the
    /// producer's value being stored.
    fn record_miss(&self, key: &str, duration: Duration) {
        debug!("Cache MISS: {} regenerated in {:?}", key, duration);
    }

    /// Record a regeneration claim on an expired marker.
    fn record_claim(&self, key: &str) {
        debug!("Cache CLAIM: {} marked refreshing", key);
    }

    /// Record a value and marker write.
    fn record_set(&self, key: &str, duration: Duration) {
        debug!("Cache SET: {} took {:?}", key, duration);
    }

    /// Record a fetch served by the producer with the cache disabled.
    fn record_bypass(&self, key: &str) {
        debug!("Cache BYPASS: {}", key);
    }

    /// Record an error.
    fn record_error(&self, key: &str, error: &str) {
        warn!("Cache ERROR for {}: {}", key, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl CacheMetrics for NoOpMetrics {
    fn record_hit(&self, _key: &str, _duration: Duration) {}
    fn record_miss(&self, _key: &str, _duration: Duration) {}
    fn record_claim(&self, _key: &str) {}
    fn record_set(&self, _key: &str, _duration: Duration) {}
    fn record_bypass(&self, _key: &str) {}
    fn record_error(&self, _key: &str, _error: &str) {}
}

/// Metrics implementation that only uses the logging defaults.
#[derive(Clone, Default)]
pub struct LogMetrics;

impl CacheMetrics for LogMetrics {}
