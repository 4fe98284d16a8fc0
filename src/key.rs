//! Store key derivation and the freshness marker.
//!
//! Every cached item occupies two store keys: the real value under `K` and a
//! freshness marker under `K.stale`. The suffix is fixed; changing it orphans
//! every marker already written by existing deployments.

use std::fmt;

/// Suffix appended to a cache key to form its freshness marker key.
pub const STALE_SUFFIX: &str = ".stale";

/// Build the freshness marker key for `key`.
pub fn stale_key(key: &str) -> String {
    let mut stale = String::with_capacity(key.len() + STALE_SUFFIX.len());
    stale.push_str(key);
    stale.push_str(STALE_SUFFIX);
    stale
}

/// Contents of a freshness marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    /// Value was regenerated and is within its `ttl`.
    Good,

    /// A caller claimed regeneration within the last regeneration budget.
    Refreshing,
}

impl Marker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Marker::Good => "good",
            Marker::Refreshing => "refreshing",
        }
    }

    /// Parse raw marker contents, `None` for anything unrecognised.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "good" => Some(Marker::Good),
            "refreshing" => Some(Marker::Refreshing),
            _ => None,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
