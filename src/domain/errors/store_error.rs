//! Disk store error types.

use thiserror::Error;

/// Store error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum StoreError {
    #[error("storage failure: {message}")]
    IoFailure { message: String },
}

impl StoreError {
    /// Creates an I/O failure with context.
    #[must_use]
    pub fn io(context: &str, error: impl std::fmt::Display) -> Self {
        Self::IoFailure {
            message: format!("{context}: {error}"),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
