//! Facade error types.

use thiserror::Error;

use super::FetchError;

/// Errors surfaced by the cache facade.
///
/// `Unavailable` is the terminal failure of a request: callers render a
/// placeholder, and nothing was created or updated in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum CacheError {
    #[error("no image available for {url}: {source}")]
    Unavailable {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to set up image cache: {message}")]
    Setup { message: String },
}

impl CacheError {
    /// Creates unavailable error.
    #[must_use]
    pub fn unavailable(url: impl Into<String>, source: FetchError) -> Self {
        Self::Unavailable {
            url: url.into(),
            source,
        }
    }

    /// Creates setup error.
    #[must_use]
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }
}
