//! Port for network retrieval.

use async_trait::async_trait;

use crate::domain::entities::FetchedImage;
use crate::domain::errors::FetchError;

/// Extra request headers supplied by the caller, as name/value pairs.
pub type RequestHeaders = [(String, String)];

/// Port for fetching image bytes from an origin.
/// Implementations must be thread-safe.
#[async_trait]
pub trait FetcherPort: Send + Sync {
    /// Retrieves `url`, returning the body of a 200 response.
    async fn fetch(&self, url: &str, headers: &RequestHeaders) -> Result<FetchedImage, FetchError>;
}
