//! Application layer with the image cache facade.

/// Request pipeline and administrative operations.
pub mod cache_manager;
/// Human-readable sizes.
pub mod size_format;

pub use cache_manager::ImageCacheManager;
pub use size_format::format_bytes;
