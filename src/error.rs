//! Error types for the stale cache.

use std::fmt;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised by the cache and its stores.
///
/// Producer failures are never represented here: `StaleCache::fetch` is
/// generic over the caller's error type and hands those back untouched.
#[derive(Debug, Clone)]
pub enum Error {
    /// Store error (Redis, connection pool, etc).
    ///
    /// Common causes:
    /// - Redis connection lost
    /// - Network timeout
    /// - Pool exhausted
    ///
    /// **Recovery:** Retry the call. The cache never retries internally.
    StoreError(String),

    /// Configuration error.
    ///
    /// Raised when:
    /// - `regeneration_budget` or `ttl` is zero
    /// - `ttl + 2 × regeneration_budget` overflows
    /// - A Redis URL cannot be parsed
    /// - Config JSON is malformed
    ///
    /// **Recovery:** Fix configuration.
    ConfigError(String),

    /// Optional store capability not provided by this store.
    NotImplemented(String),

    /// Generic error with custom message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::StoreError(msg) => write!(f, "Store error: {}", msg),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::NotImplemented(msg) => write!(f, "Not implemented: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::ConfigError(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<deadpool_redis::redis::RedisError> for Error {
    fn from(e: deadpool_redis::redis::RedisError) -> Self {
        Error::StoreError(format!("Redis error: {}", e))
    }
}

#[cfg(feature = "redis")]
impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::ConfigError(format!("Invalid Redis URL: {}", e))
    }
}
