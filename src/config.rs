//! Per-call configuration and the derived expiry schedule.
//!
//! # Configuration
//!
//! ```
//! use stale_cache::FetchConfig;
//! use std::time::Duration;
//!
//! // Fall back to 5 minutes when the producer returns no TTL,
//! // and expect regeneration to finish within 2 seconds.
//! let config = FetchConfig::default()
//!     .with_ttl(Duration::from_secs(300))
//!     .with_regeneration_budget(Duration::from_secs(2));
//! assert!(config.validate().is_ok());
//! ```
//!
//! Configs can also be loaded from JSON, durations in milliseconds:
//!
//! ```
//! use stale_cache::FetchConfig;
//!
//! let config = FetchConfig::from_json(r#"{"ttl_ms": 30000, "regeneration_budget_ms": 500}"#)
//!     .expect("valid config");
//! assert!(!config.disabled);
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default freshness window when the producer does not return a TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Default upper bound on how long one regeneration takes.
pub const DEFAULT_REGENERATION_BUDGET: Duration = Duration::from_secs(5);

/// Environment variable that disables a cache built with `StaleCache::from_env`.
pub const DISABLED_ENV: &str = "STALE_CACHE_DISABLED";

/// Serializes tests that touch process environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Configuration for a single `fetch` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Freshness window used when the producer returns no TTL of its own.
    ///
    /// A TTL returned by the producer always wins over this value.
    #[serde(rename = "ttl_ms", with = "duration_ms")]
    pub ttl: Duration,

    /// Expected worst-case producer latency.
    ///
    /// Bounds how long a regeneration claim holds off other callers, and pads
    /// the real value's expiry by twice this amount so a stale value stays
    /// servable while a regeneration is in flight.
    #[serde(rename = "regeneration_budget_ms", with = "duration_ms")]
    pub regeneration_budget: Duration,

    /// Skip the store and call the producer directly.
    pub disabled: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            ttl: DEFAULT_TTL,
            regeneration_budget: DEFAULT_REGENERATION_BUDGET,
            disabled: false,
        }
    }
}

impl FetchConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_regeneration_budget(mut self, budget: Duration) -> Self {
        self.regeneration_budget = budget;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Parse a config from JSON.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the config can drive the stale-while-revalidate protocol.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if `ttl` or `regeneration_budget` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(Error::ConfigError("ttl must be greater than zero".to_string()));
        }
        if self.regeneration_budget.is_zero() {
            return Err(Error::ConfigError(
                "regeneration_budget must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Expiries written by `StaleCache::set` for one value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpirySchedule {
    /// Expiry of the freshness marker: `ttl`.
    pub marker: Duration,

    /// Expiry of the real value: `ttl + 2 × regeneration_budget`.
    pub value: Duration,
}

impl ExpirySchedule {
    /// # Errors
    /// Returns `Error::ConfigError` for a zero `ttl` or regeneration budget,
    /// or when the value expiry overflows.
    pub fn new(ttl: Duration, regeneration_budget: Duration) -> Result<Self> {
        if ttl.is_zero() {
            return Err(Error::ConfigError(
                "ttl must be greater than zero".to_string(),
            ));
        }
        if regeneration_budget.is_zero() {
            return Err(Error::ConfigError(
                "regeneration_budget must be greater than zero".to_string(),
            ));
        }

        let value = regeneration_budget
            .checked_mul(2)
            .and_then(|padding| ttl.checked_add(padding))
            .ok_or_else(|| {
                Error::ConfigError(format!(
                    "expiry overflow for ttl {:?} and regeneration budget {:?}",
                    ttl, regeneration_budget
                ))
            })?;

        Ok(ExpirySchedule { marker: ttl, value })
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.ttl, DEFAULT_TTL);
        assert_eq!(config.regeneration_budget, DEFAULT_REGENERATION_BUDGET);
        assert!(!config.disabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fetch_config_builder() {
        let config = FetchConfig::default()
            .with_ttl(Duration::from_secs(10))
            .with_regeneration_budget(Duration::from_millis(250))
            .with_disabled(true);

        assert_eq!(config.ttl, Duration::from_secs(10));
        assert_eq!(config.regeneration_budget, Duration::from_millis(250));
        assert!(config.disabled);
    }

    #[test]
    fn test_fetch_config_rejects_zero_durations() {
        let config = FetchConfig::default().with_regeneration_budget(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        let config = FetchConfig::default().with_ttl(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_fetch_config_from_json_fills_defaults() {
        let config = FetchConfig::from_json(r#"{"regeneration_budget_ms": 1500}"#)
            .expect("Failed to parse config");

        assert_eq!(config.ttl, DEFAULT_TTL);
        assert_eq!(config.regeneration_budget, Duration::from_millis(1500));
    }

    #[test]
    fn test_fetch_config_json_round_trip() {
        let config = FetchConfig::default()
            .with_ttl(Duration::from_secs(3))
            .with_disabled(true);
        let json = serde_json::to_string(&config).expect("Failed to serialize");

        assert!(json.contains("\"ttl_ms\":3000"));
        assert_eq!(
            FetchConfig::from_json(&json).expect("Failed to parse"),
            config
        );
    }

    #[test]
    fn test_fetch_config_from_bad_json() {
        let result = FetchConfig::from_json(r#"{"ttl_ms": "soon"}"#);
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_expiry_schedule() {
        let schedule = ExpirySchedule::new(Duration::from_secs(10), Duration::from_secs(2))
            .expect("Failed to build schedule");

        assert_eq!(schedule.marker, Duration::from_secs(10));
        assert_eq!(schedule.value, Duration::from_secs(14));
    }

    #[test]
    fn test_expiry_schedule_rejects_zero_ttl() {
        let result = ExpirySchedule::new(Duration::ZERO, Duration::from_secs(2));
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_expiry_schedule_rejects_zero_budget() {
        let result = ExpirySchedule::new(Duration::from_secs(1), Duration::ZERO);
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_expiry_schedule_overflow() {
        let result = ExpirySchedule::new(Duration::from_secs(1), Duration::MAX);
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }
}
