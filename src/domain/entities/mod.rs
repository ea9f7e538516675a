//! Domain entity definitions.

mod cache_entry;
mod cache_key;
mod response;

pub use cache_entry::CacheEntry;
pub use cache_key::CacheKey;
pub use response::{FetchedImage, ImageResponse, ImageSource, TransientImage};
