//! Domain error types.

mod cache_error;
mod fetch_error;
mod store_error;
mod transcode_error;

pub use cache_error::CacheError;
pub use fetch_error::FetchError;
pub use store_error::{StoreError, StoreResult};
pub use transcode_error::TranscodeError;
