//! Values passed between pipeline stages and returned to callers.

use std::path::Path;

use bytes::Bytes;

use super::{CacheEntry, CacheKey};

/// Bytes returned by a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// Response body.
    pub bytes: Bytes,
    /// Content type (e.g., "image/png"), if the origin sent one.
    pub content_type: Option<String>,
    /// Origin `ETag`, if any.
    pub e_tag: Option<String>,
}

impl FetchedImage {
    /// Creates a fetched image with no response metadata.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
            e_tag: None,
        }
    }
}

/// Where a served image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Served from a live cache entry.
    Cache,
    /// Fetched, transcoded and stored during this request.
    Network,
    /// Served through the raw, non-transcoded fallback path.
    RawFallback,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Network => write!(f, "network"),
            Self::RawFallback => write!(f, "raw-fallback"),
        }
    }
}

/// Image bytes that could not be persisted and are handed to the caller directly.
#[derive(Debug, Clone)]
pub struct TransientImage {
    /// Key the bytes belong to.
    pub key: CacheKey,
    /// Payload.
    pub bytes: Bytes,
    /// Whether the payload went through the transcoder.
    pub transcoded: bool,
    /// Content type of the payload, if known.
    pub content_type: Option<String>,
    /// Origin `ETag`, if any.
    pub e_tag: Option<String>,
}

/// Result of a cache request.
#[derive(Debug, Clone)]
pub enum ImageResponse {
    /// Bytes are on disk at `entry.storage_path`.
    Cached {
        /// Stored entry metadata.
        entry: CacheEntry,
        /// How the entry was obtained.
        source: ImageSource,
    },
    /// Bytes are only held in memory.
    Transient(TransientImage),
}

impl ImageResponse {
    /// Returns the local file path, if the image was persisted.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Cached { entry, .. } => Some(entry.storage_path.as_path()),
            Self::Transient(_) => None,
        }
    }

    /// Returns the stored entry, if any.
    #[must_use]
    pub const fn entry(&self) -> Option<&CacheEntry> {
        match self {
            Self::Cached { entry, .. } => Some(entry),
            Self::Transient(_) => None,
        }
    }

    /// Returns where the image came from.
    #[must_use]
    pub const fn source(&self) -> ImageSource {
        match self {
            Self::Cached { source, .. } => *source,
            Self::Transient(image) if image.transcoded => ImageSource::Network,
            Self::Transient(_) => ImageSource::RawFallback,
        }
    }
}
