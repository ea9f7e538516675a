//! Image handling infrastructure.
//!
//! This module provides:
//! - Bounded lossy transcoding
//! - Count-bounded, age-bounded disk storage

pub mod disk_store;
pub mod transcoder;

pub use disk_store::{DiskStore, dirs_cache_path, total_size};
pub use transcoder::JpegTranscoder;
