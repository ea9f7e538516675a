//! Cache key derived from a source URL.

use serde::{Deserialize, Serialize};

const RAW_PREFIX: &str = "raw:";

/// Stable identifier for one cache entry.
/// Two requests for the same URL always map to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Creates a new `CacheKey` from any string-like input.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Creates a `CacheKey` from a source URL.
    ///
    /// The URL string itself is the key; surrounding whitespace is ignored.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        Self(url.trim().to_string())
    }

    /// Returns the file stem used for the backing file of this key.
    ///
    /// URLs rarely carry a usable, collision-free file name, so the stem is a
    /// hash of the key.
    #[must_use]
    pub fn file_stem(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..16])
    }

    /// Returns the key holding the untranscoded fallback copy of this key.
    ///
    /// Both copies live in the same store and share its capacity.
    #[must_use]
    pub fn raw_variant(&self) -> Self {
        Self(format!("{RAW_PREFIX}{}", self.0))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::from_url(s)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::from_url(&s)
    }
}
