//! Fixed limits of the caching pipeline.

use std::time::Duration;

use chrono::TimeDelta;

/// Maximum number of live entries per store.
pub const MAX_CACHED_OBJECTS: usize = 50;

/// Staleness window for stored entries.
pub const STALE_PERIOD_DAYS: i64 = 7;

/// Transcoder bounding box width.
pub const MAX_WIDTH: u32 = 800;

/// Transcoder bounding box height.
pub const MAX_HEIGHT: u32 = 600;

/// Lossy re-encode quality.
pub const JPEG_QUALITY: u8 = 85;

/// Connect and idle timeout per fetch attempt.
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetch attempts, including the first.
pub const MAX_ATTEMPTS: u32 = 3;

/// Linear backoff unit between attempts.
pub const BACKOFF_UNIT: Duration = Duration::from_millis(500);

/// Limits applied by the fetcher, transcoder and store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    /// Maximum number of live entries.
    pub max_objects: usize,
    /// Time an entry stays fresh after being written.
    pub stale_period: TimeDelta,
    /// Bounding box width.
    pub max_width: u32,
    /// Bounding box height.
    pub max_height: u32,
    /// Re-encode quality (1-100).
    pub quality: u8,
    /// Connect and idle timeout per attempt.
    pub attempt_timeout: Duration,
    /// Fetch attempts, including the first.
    pub max_attempts: u32,
    /// Backoff unit; attempt `n` waits `n * unit` before the next one.
    pub backoff_unit: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            max_objects: MAX_CACHED_OBJECTS,
            stale_period: TimeDelta::days(STALE_PERIOD_DAYS),
            max_width: MAX_WIDTH,
            max_height: MAX_HEIGHT,
            quality: JPEG_QUALITY,
            attempt_timeout: ATTEMPT_TIMEOUT,
            max_attempts: MAX_ATTEMPTS,
            backoff_unit: BACKOFF_UNIT,
        }
    }
}
