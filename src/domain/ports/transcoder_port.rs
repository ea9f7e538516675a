//! Port for image transcoding.

use crate::domain::errors::TranscodeError;

/// Port for decoding, bounding and re-encoding image bytes.
///
/// Transcoding is CPU-bound; callers run it off the async executor.
pub trait TranscoderPort: Send + Sync {
    /// Transcodes `bytes` into the normalized storage format.
    fn transcode(&self, bytes: &[u8]) -> Result<Vec<u8>, TranscodeError>;
}
