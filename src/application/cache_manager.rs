//! Image cache facade.
//!
//! Per request: look up the store, then fetch, transcode and persist. Fetch
//! failures fall back to a single raw fetch stored without transcoding;
//! transcode failures serve the fetched bytes uncached. Transcoded and raw
//! copies share one store, so the object limit covers both.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::join_all;
use tracing::{debug, error, info, warn};

use crate::domain::{
    CacheEntry, CacheError, CacheKey, CachePolicy, Clock, FetchError, FetchedImage, FetcherPort,
    ImageResponse, ImageSource, RequestHeaders, SystemClock, TranscodeError, TranscoderPort,
    TransientImage,
};
use crate::infrastructure::http::{ReqwestTransport, RetryPolicy, RetryingFetcher, TrustedHosts};
use crate::infrastructure::image::{DiskStore, JpegTranscoder, total_size};

use super::size_format::format_bytes;

const TRANSCODED_CONTENT_TYPE: &str = "image/jpeg";

/// Orchestrates lookup, fetch, transcode and persist for image URLs.
///
/// One instance is built by the composition root and shared by handle.
pub struct ImageCacheManager {
    root: PathBuf,
    store: DiskStore,
    fetcher: Arc<dyn FetcherPort>,
    fallback_fetcher: Arc<dyn FetcherPort>,
    transcoder: Arc<dyn TranscoderPort>,
}

impl std::fmt::Debug for ImageCacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCacheManager")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl ImageCacheManager {
    /// Assembles the facade from its parts.
    #[must_use]
    pub fn new(
        store: DiskStore,
        fetcher: Arc<dyn FetcherPort>,
        fallback_fetcher: Arc<dyn FetcherPort>,
        transcoder: Arc<dyn TranscoderPort>,
    ) -> Self {
        Self {
            root: store.root().to_path_buf(),
            store,
            fetcher,
            fallback_fetcher,
            transcoder,
        }
    }

    /// Builds the production pipeline under `root` with the fixed limits.
    ///
    /// # Errors
    /// Returns error if the store directory or the HTTP client cannot be created.
    pub async fn open(
        root: PathBuf,
        trusted_hosts: TrustedHosts,
        user_agent: &str,
    ) -> Result<Self, CacheError> {
        let policy = CachePolicy::default();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let store = DiskStore::open_with_policy(root, &policy, clock)
            .await
            .map_err(|e| CacheError::setup(e.to_string()))?;

        let transport = || {
            ReqwestTransport::new(policy.attempt_timeout, user_agent)
                .map_err(|e| CacheError::setup(e.to_string()))
        };
        let fetcher = RetryingFetcher::new(
            transport()?,
            RetryPolicy::from_policy(&policy),
            trusted_hosts.clone(),
        )
        .with_user_agent(user_agent);
        let fallback_fetcher =
            RetryingFetcher::new(transport()?, RetryPolicy::single_attempt(), trusted_hosts)
                .with_user_agent(user_agent);

        info!(root = %store.root().display(), "Image cache ready");

        Ok(Self::new(
            store,
            Arc::new(fetcher),
            Arc::new(fallback_fetcher),
            Arc::new(JpegTranscoder::from_policy(&policy)),
        ))
    }

    /// Returns the cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the image for `url`.
    ///
    /// # Errors
    /// Returns `CacheError::Unavailable` if both the pipeline and the raw
    /// fallback fail.
    pub async fn get_image(&self, url: &str) -> Result<ImageResponse, CacheError> {
        self.get_image_with_headers(url, &[]).await
    }

    /// Returns the image for `url`, sending `headers` in addition to the
    /// reserved ones.
    ///
    /// # Errors
    /// Returns `CacheError::Unavailable` if both the pipeline and the raw
    /// fallback fail.
    pub async fn get_image_with_headers(
        &self,
        url: &str,
        headers: &RequestHeaders,
    ) -> Result<ImageResponse, CacheError> {
        let key = CacheKey::from_url(url);

        if let Some(entry) = self.store.lookup(&key).await {
            debug!(key = %key, "Serving image from cache");
            return Ok(ImageResponse::Cached {
                entry,
                source: ImageSource::Cache,
            });
        }

        let fetched = match self.fetcher.fetch(url, headers).await {
            Ok(fetched) => fetched,
            Err(error) => {
                warn!(
                    url = %url,
                    kind = error.kind(),
                    error = %error,
                    "Fetch failed, trying raw fallback"
                );
                return self.raw_fallback(&key, url, headers, error).await;
            }
        };

        let transcoded = match self.transcode(fetched.bytes.clone()).await {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(
                    url = %url,
                    content_type = ?fetched.content_type,
                    error = %error,
                    "Transcoding failed, serving raw bytes uncached"
                );
                return Ok(ImageResponse::Transient(TransientImage {
                    key,
                    bytes: fetched.bytes,
                    transcoded: false,
                    content_type: fetched.content_type,
                    e_tag: fetched.e_tag,
                }));
            }
        };

        match self.store.write(&key, &transcoded, None).await {
            Ok(entry) => {
                self.store.remove(&key.raw_variant()).await;
                Ok(ImageResponse::Cached {
                    entry,
                    source: ImageSource::Network,
                })
            }
            Err(error) => {
                warn!(
                    url = %url,
                    error = %error,
                    "Failed to persist transcoded image, serving uncached"
                );
                Ok(ImageResponse::Transient(TransientImage {
                    key,
                    bytes: Bytes::from(transcoded),
                    transcoded: true,
                    content_type: Some(TRANSCODED_CONTENT_TYPE.to_string()),
                    e_tag: None,
                }))
            }
        }
    }

    async fn transcode(&self, bytes: Bytes) -> Result<Vec<u8>, TranscodeError> {
        let transcoder = self.transcoder.clone();
        tokio::task::spawn_blocking(move || transcoder.transcode(&bytes))
            .await
            .unwrap_or_else(|e| Err(TranscodeError::decode(format!("transcode task failed: {e}"))))
    }

    /// Terminal causes are never requested again; only a live raw copy can
    /// still be served for them.
    async fn raw_fallback(
        &self,
        key: &CacheKey,
        url: &str,
        headers: &RequestHeaders,
        cause: FetchError,
    ) -> Result<ImageResponse, CacheError> {
        let raw_key = key.raw_variant();
        if let Some(entry) = self.store.lookup(&raw_key).await {
            debug!(key = %key, cause = cause.kind(), "Serving raw fallback entry from cache");
            return Ok(ImageResponse::Cached {
                entry,
                source: ImageSource::RawFallback,
            });
        }

        if cause.is_terminal() {
            error!(url = %url, kind = cause.kind(), error = %cause, "No image available");
            return Err(CacheError::unavailable(url, cause));
        }

        let fetched = match self.fallback_fetcher.fetch(url, headers).await {
            Ok(fetched) => fetched,
            Err(error) => {
                error!(
                    url = %url,
                    cause = cause.kind(),
                    kind = error.kind(),
                    error = %error,
                    "No image available"
                );
                return Err(CacheError::unavailable(url, error));
            }
        };

        Ok(self.persist_raw(key, &raw_key, fetched).await)
    }

    async fn persist_raw(
        &self,
        key: &CacheKey,
        raw_key: &CacheKey,
        fetched: FetchedImage,
    ) -> ImageResponse {
        match self
            .store
            .write(raw_key, &fetched.bytes, fetched.e_tag.clone())
            .await
        {
            Ok(entry) => ImageResponse::Cached {
                entry,
                source: ImageSource::RawFallback,
            },
            Err(error) => {
                warn!(key = %key, error = %error, "Failed to persist raw image, serving uncached");
                ImageResponse::Transient(TransientImage {
                    key: key.clone(),
                    bytes: fetched.bytes,
                    transcoded: false,
                    content_type: fetched.content_type,
                    e_tag: fetched.e_tag,
                })
            }
        }
    }

    /// Returns the live entry for `url` without touching the network.
    ///
    /// Transcoded entries take precedence over raw fallback entries.
    pub async fn lookup(&self, url: &str) -> Option<CacheEntry> {
        let key = CacheKey::from_url(url);
        match self.store.lookup(&key).await {
            Some(entry) => Some(entry),
            None => self.store.lookup(&key.raw_variant()).await,
        }
    }

    /// Warms the cache for `urls` concurrently. Returns how many succeeded.
    pub async fn prefetch<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<S> = urls.into_iter().collect();
        let results = join_all(urls.iter().map(|url| self.get_image(url.as_ref()))).await;

        let loaded = results.iter().filter(|r| r.is_ok()).count();
        debug!(requested = results.len(), loaded, "Prefetch complete");
        loaded
    }

    /// Removes the transcoded and raw entries for `url`. Returns true if any existed.
    pub async fn evict(&self, url: &str) -> bool {
        let key = CacheKey::from_url(url);
        let transcoded = self.store.remove(&key).await;
        let raw = self.store.remove(&key.raw_variant()).await;
        transcoded || raw
    }

    /// Removes every entry and backing file.
    pub async fn clear_cache(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(root = %self.root.display(), error = %e, "Failed to clear image cache");
            return;
        }
        info!("Cleared image cache");
    }

    /// Returns the total size of all files under the cache root.
    pub async fn get_cache_size_bytes(&self) -> u64 {
        total_size(&self.root).await
    }

    /// Returns the cache size formatted for display.
    pub async fn get_formatted_cache_size(&self) -> String {
        format_bytes(self.get_cache_size_bytes().await)
    }
}
