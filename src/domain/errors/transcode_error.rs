//! Transcoding error types.

use thiserror::Error;

/// Transcode error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum TranscodeError {
    #[error("failed to decode image: {message}")]
    DecodeFailed { message: String },

    #[error("failed to encode image: {message}")]
    EncodeFailed { message: String },
}

impl TranscodeError {
    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    /// Creates encode error.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::EncodeFailed {
            message: message.into(),
        }
    }
}
