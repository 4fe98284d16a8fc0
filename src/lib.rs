//! # stale-cache
//!
//! Stale-while-revalidate caching with dogpile protection, over any key-value
//! store with per-key expiry.
//!
//! ## Features
//!
//! - **Stale-while-revalidate:** One caller regenerates an expired value while
//!   everyone else keeps getting the previous one
//! - **Dogpile protection:** A short-lived freshness marker (`<key>.stale`)
//!   keeps concurrent callers from all hitting the producer at once
//! - **Store Agnostic:** In-memory (default) and Redis stores, or your own
//!   `Store` implementation
//! - **No in-process state:** All coordination goes through the store, so any
//!   number of processes can share one cache
//! - **Dev bypass:** Disable globally or per call to always run the producer
//!
//! ## Quick Start
//!
//! ```ignore
//! use stale_cache::{FetchConfig, Produced, StaleCache, store::InMemoryStore};
//! use std::time::Duration;
//!
//! let cache = StaleCache::new(InMemoryStore::new());
//!
//! // Regeneration is expected to finish within 2 seconds.
//! let config = FetchConfig::default().with_regeneration_budget(Duration::from_secs(2));
//!
//! let rendered = cache
//!     .fetch("page:home", || async {
//!         let html = render_home().await?;
//!         // Fresh for 5 minutes
//!         Ok::<_, stale_cache::Error>(Produced::new(html, Duration::from_secs(300)))
//!     }, &config)
//!     .await?;
//! ```
//!
//! Share a cache across handlers with [`CacheService`], which is `Clone`.

#[macro_use]
extern crate log;

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod observability;
pub mod service;
pub mod store;

// Re-exports for convenience
pub use cache::{Produced, StaleCache};
pub use config::{ExpirySchedule, FetchConfig};
pub use error::{Error, Result};
pub use key::{stale_key, Marker};
pub use service::CacheService;
pub use store::Store;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
