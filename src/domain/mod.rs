//! Domain layer with core cache entities and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Fixed pipeline limits.
pub mod policy;
/// Port definitions.
pub mod ports;

pub use entities::{
    CacheEntry, CacheKey, FetchedImage, ImageResponse, ImageSource, TransientImage,
};
pub use errors::{CacheError, FetchError, StoreError, TranscodeError};
pub use policy::CachePolicy;
pub use ports::{Clock, FetcherPort, RequestHeaders, SystemClock, TranscoderPort};
