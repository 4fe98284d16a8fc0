//! Redis store implementation.

use super::Store;
use crate::error::{Error, Result};
use deadpool_redis::{redis::AsyncCommands, Config as PoolConfig, Pool, Runtime};
use std::time::Duration;

/// Pool statistics information.
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub connections: u32,
    pub idle_connections: u32,
}

/// Default Redis connection pool size.
/// Formula: (CPU cores × 2) + 1
/// For 8-core systems: 16 connections is optimal
/// Override with REDIS_POOL_SIZE environment variable
const DEFAULT_POOL_SIZE: u32 = 16;

/// Configuration for the Redis store.
#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: u32,
    pub pool_size: u32,
    pub connection_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            host: "localhost".to_string(),
            port: 6379,
            username: None,
            password: None,
            database: 0,
            pool_size: DEFAULT_POOL_SIZE,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisConfig {
    /// Parse a `redis://[user[:password]@]host[:port][/db]` URL.
    ///
    /// Missing parts keep their defaults. A URL without a scheme, such as
    /// `localhost:6379`, is read as a plain host and port.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if the URL has no host or a bad database.
    pub fn from_url(redis_url: &str) -> Result<Self> {
        let normalized = if redis_url.contains("://") {
            redis_url.to_string()
        } else {
            format!("redis://{}", redis_url)
        };
        let uri = url::Url::parse(&normalized)?;

        let host = uri
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::ConfigError(format!("No host in Redis URL: {}", redis_url)))?
            .to_string();

        let username = Some(uri.username())
            .filter(|u| !u.is_empty() && *u != "default")
            .map(str::to_string);
        let password = uri.password().map(str::to_string);

        let database = match uri.path().trim_start_matches('/') {
            "" => 0,
            db => db.parse::<u32>().map_err(|_| {
                Error::ConfigError(format!("Invalid Redis database '{}' in URL", db))
            })?,
        };

        Ok(RedisConfig {
            host,
            port: uri.port().unwrap_or(6379),
            username,
            password,
            database,
            ..Default::default()
        })
    }

    /// Build configuration from the environment.
    ///
    /// - `REDIS_URL`: connection URL (default `redis://localhost:6379`)
    /// - `REDIS_POOL_SIZE`: pool size (default 16)
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if `REDIS_URL` cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let pool_size = std::env::var("REDIS_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_POOL_SIZE);

        Ok(RedisConfig {
            pool_size,
            ..Self::from_url(&redis_url)?
        })
    }

    /// Build Redis connection string.
    pub fn connection_string(&self) -> String {
        if let Some(password) = &self.password {
            if let Some(username) = &self.username {
                format!(
                    "redis://{}:{}@{}:{}/{}",
                    username, password, self.host, self.port, self.database
                )
            } else {
                format!(
                    "redis://default:{}@{}:{}/{}",
                    password, self.host, self.port, self.database
                )
            }
        } else {
            format!("redis://{}:{}/{}", self.host, self.port, self.database)
        }
    }
}

/// Redis store with connection pooling.
///
/// Expiries are written with `PSETEX`, so sub-second TTLs and regeneration
/// budgets are honoured.
///
/// # Example
///
/// ```no_run
/// # use stale_cache::store::{RedisStore, RedisConfig, Store};
/// # use stale_cache::error::Result;
/// # use std::time::Duration;
/// # async fn example() -> Result<()> {
/// let store = RedisStore::new(RedisConfig::from_url("redis://localhost:6379/0")?).await?;
///
/// store.set("key", "value", Duration::from_secs(30)).await?;
/// let value = store.get("key").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Create new Redis store from configuration.
    ///
    /// # Errors
    /// Returns `Err` if pool creation fails.
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let mut cfg = PoolConfig::from_url(config.connection_string());
        let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size as usize);
        pool_config.timeouts.wait = Some(config.connection_timeout);
        pool_config.timeouts.create = Some(config.connection_timeout);
        cfg.pool = Some(pool_config);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| Error::StoreError(format!("Failed to create Redis pool: {}", e)))?;

        info!(
            "✓ Redis store initialized: {}:{} (db {}, pool size: {})",
            config.host, config.port, config.database, config.pool_size
        );

        Ok(RedisStore { pool })
    }

    /// Create from connection string directly.
    ///
    /// # Errors
    /// Returns `Err` if the URL is invalid or pool creation fails.
    pub async fn from_connection_string(conn_str: &str) -> Result<Self> {
        Self::new(RedisConfig::from_url(conn_str)?).await
    }

    /// Create from `REDIS_URL` / `REDIS_POOL_SIZE`.
    ///
    /// # Errors
    /// Returns `Err` if the URL is invalid or pool creation fails.
    pub async fn from_env() -> Result<Self> {
        Self::new(RedisConfig::from_env()?).await
    }

    /// Get current pool statistics.
    pub fn pool_stats(&self) -> PoolStats {
        let status = self.pool.status();
        PoolStats {
            connections: status.size as u32,
            idle_connections: status.available as u32,
        }
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| Error::StoreError(format!("Failed to get Redis connection: {}", e)))
    }
}

impl Store for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;

        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| Error::StoreError(format!("Redis GET failed for key {}: {}", key, e)))?;

        if value.is_some() {
            debug!("✓ Redis GET {} -> HIT", key);
        } else {
            debug!("✓ Redis GET {} -> MISS", key);
        }

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, expiry: Duration) -> Result<()> {
        let millis = u64::try_from(expiry.as_millis()).map_err(|_| {
            Error::ConfigError(format!("Expiry {:?} too large for key {}", expiry, key))
        })?;
        if millis == 0 {
            return Err(Error::ConfigError(format!(
                "Expiry for key {} must be at least one millisecond",
                key
            )));
        }

        let mut conn = self.connection().await?;
        conn.pset_ex::<_, _, ()>(key, value, millis)
            .await
            .map_err(|e| Error::StoreError(format!("Redis PSETEX failed for key {}: {}", key, e)))?;

        debug!("✓ Redis SET {} (expiry: {}ms)", key, millis);
        Ok(())
    }

    async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.connection().await?;

        let values: Vec<Option<String>> = conn.mget(keys).await?;

        debug!("✓ Redis MGET {} keys", keys.len());
        Ok(values)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let mut conn = self.connection().await?;

        // -2: key missing, -1: key without expiry
        let millis: i64 = conn
            .pttl(key)
            .await
            .map_err(|e| Error::StoreError(format!("Redis PTTL failed for key {}: {}", key, e)))?;

        Ok(u64::try_from(millis).ok().map(Duration::from_millis))
    }

    async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection().await?;

        let pong: String = deadpool_redis::redis::cmd("PING")
            .query_async(&mut *conn)
            .await?;

        Ok(pong.contains("PONG"))
    }

    async fn clear_all(&self) -> Result<()> {
        let mut conn = self.connection().await?;

        deadpool_redis::redis::cmd("FLUSHDB")
            .query_async::<()>(&mut *conn)
            .await?;

        warn!("⚠ Redis FLUSHDB executed - all keys cleared!");
        Ok(())
    }
}
