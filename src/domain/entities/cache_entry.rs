//! Metadata for a stored cache entry.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CacheKey;

/// A live entry in the disk store.
///
/// `storage_path` is owned by the store and must not be held past eviction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Key the entry is stored under.
    pub key: CacheKey,
    /// Location of the cached bytes.
    pub storage_path: PathBuf,
    /// Instant after which the entry is stale.
    pub valid_till: DateTime<Utc>,
    /// Byte length of the stored payload.
    pub content_length: u64,
    /// Origin `ETag`. Only raw fallback entries carry one.
    pub e_tag: Option<String>,
}

impl CacheEntry {
    /// Returns true if the entry is stale at `now`.
    #[must_use]
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.valid_till
    }
}
