//! Network fetch error types.

use thiserror::Error;

/// Fetch error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("client error: HTTP {status}")]
    ClientError { status: u16 },

    #[error("server error: HTTP {status}")]
    ServerError { status: u16 },

    #[error("certificate validation failed for host {host}")]
    TlsError { host: String },

    #[error("transport error: {message}")]
    TransportError { message: String },

    #[error("invalid url: {reason}")]
    InvalidUrl { reason: String },

    #[error("unexpected response status: HTTP {status}")]
    UnexpectedStatus { status: u16 },
}

impl FetchError {
    /// Classifies a non-200 HTTP status.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400..=499 => Self::ClientError { status },
            500..=599 => Self::ServerError { status },
            _ => Self::UnexpectedStatus { status },
        }
    }

    /// Creates transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportError {
            message: message.into(),
        }
    }

    /// Creates TLS error.
    #[must_use]
    pub fn tls(host: impl Into<String>) -> Self {
        Self::TlsError { host: host.into() }
    }

    /// Creates invalid URL error.
    #[must_use]
    pub fn invalid_url(reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            reason: reason.into(),
        }
    }

    /// Returns whether another attempt may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ServerError { .. } | Self::TransportError { .. }
        )
    }

    /// Returns whether the error must not be retried.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !self.is_retryable()
    }

    /// Returns the HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ClientError { status }
            | Self::ServerError { status }
            | Self::UnexpectedStatus { status } => Some(*status),
            _ => None,
        }
    }

    /// Short name of the variant for structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::ClientError { .. } => "client_error",
            Self::ServerError { .. } => "server_error",
            Self::TlsError { .. } => "tls_error",
            Self::TransportError { .. } => "transport_error",
            Self::InvalidUrl { .. } => "invalid_url",
            Self::UnexpectedStatus { .. } => "unexpected_status",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(404, FetchError::ClientError { status: 404 } ; "not_found")]
    #[test_case(400, FetchError::ClientError { status: 400 } ; "bad_request")]
    #[test_case(503, FetchError::ServerError { status: 503 } ; "unavailable")]
    #[test_case(500, FetchError::ServerError { status: 500 } ; "internal")]
    #[test_case(304, FetchError::UnexpectedStatus { status: 304 } ; "not_modified")]
    #[test_case(204, FetchError::UnexpectedStatus { status: 204 } ; "no_content")]
    fn test_from_status(status: u16, expected: FetchError) {
        assert_eq!(FetchError::from_status(status), expected);
    }

    #[test]
    fn test_retry_classification() {
        assert!(FetchError::Timeout.is_retryable());
        assert!(FetchError::ServerError { status: 502 }.is_retryable());
        assert!(FetchError::transport("connection reset").is_retryable());

        assert!(FetchError::ClientError { status: 404 }.is_terminal());
        assert!(FetchError::tls("example.com").is_terminal());
        assert!(FetchError::invalid_url("empty").is_terminal());
        assert!(FetchError::UnexpectedStatus { status: 304 }.is_terminal());
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(FetchError::from_status(418).status(), Some(418));
        assert_eq!(FetchError::Timeout.status(), None);
    }
}
