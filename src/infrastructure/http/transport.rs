//! Single-attempt HTTP GET transport.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, ETAG, HeaderMap};
use reqwest::{Client, Url};
use tracing::trace;

use crate::domain::FetchError;

/// One GET attempt.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Target URL.
    pub url: Url,
    /// Fully merged request headers.
    pub headers: HeaderMap,
    /// Accept invalid or expired certificates for this request.
    pub accept_invalid_certs: bool,
}

/// Response of one GET attempt.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body; only read for 200 responses.
    pub bytes: Bytes,
    /// `Content-Type` header.
    pub content_type: Option<String>,
    /// `ETag` header.
    pub e_tag: Option<String>,
}

impl TransportResponse {
    /// Creates a response with no headers.
    #[must_use]
    pub fn new(status: u16, bytes: impl Into<Bytes>) -> Self {
        Self {
            status,
            bytes: bytes.into(),
            content_type: None,
            e_tag: None,
        }
    }
}

/// Performs a single HTTP attempt.
///
/// Transport-level failures are returned as `Timeout`, `TlsError` or
/// `TransportError`; any HTTP status, including errors, is a successful send.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends one GET request.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, FetchError>;
}

/// Transport backed by two reqwest clients, one of which skips certificate validation.
pub struct ReqwestTransport {
    strict: Client,
    lenient: Client,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Creates the transport with connect and idle timeouts of `timeout`.
    ///
    /// # Errors
    /// Returns error if an HTTP client cannot be created.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        Ok(Self {
            strict: build_client(timeout, user_agent, false)?,
            lenient: build_client(timeout, user_agent, true)?,
        })
    }
}

fn build_client(
    timeout: Duration,
    user_agent: &str,
    accept_invalid_certs: bool,
) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .pool_idle_timeout(timeout)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(|e| FetchError::transport(format!("failed to create HTTP client: {e}")))
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, FetchError> {
        let client = if request.accept_invalid_certs {
            &self.lenient
        } else {
            &self.strict
        };
        let host = request.url.host_str().unwrap_or_default().to_string();

        let response = client
            .get(request.url)
            .headers(request.headers)
            .send()
            .await
            .map_err(|e| classify_error(&e, &host))?;

        let status = response.status().as_u16();
        let content_type = header_string(response.headers(), &CONTENT_TYPE);
        let e_tag = header_string(response.headers(), &ETAG);

        if status != 200 {
            trace!(host = %host, status, "Skipping body of non-200 response");
            return Ok(TransportResponse {
                status,
                bytes: Bytes::new(),
                content_type,
                e_tag,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_error(&e, &host))?;

        Ok(TransportResponse {
            status,
            bytes,
            content_type,
            e_tag,
        })
    }
}

fn header_string(headers: &HeaderMap, name: &reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

fn classify_error(error: &reqwest::Error, host: &str) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if is_certificate_error(error) {
        FetchError::tls(host)
    } else {
        FetchError::transport(error.to_string())
    }
}

/// Walks the source chain looking for a certificate validation failure.
fn is_certificate_error(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        let message = err.to_string().to_ascii_lowercase();
        if message.contains("certificate") || message.contains("unknownissuer") {
            return true;
        }
        current = err.source();
    }
    false
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted outcome of one attempt.
    #[derive(Debug, Clone)]
    pub enum Step {
        /// Respond with a status and body.
        Respond(u16, &'static [u8]),
        /// Fail at the transport level.
        Fail(FetchError),
        /// Present an expired certificate; the body is served only when
        /// the request accepts invalid certificates.
        ExpiredCertificate(&'static [u8]),
    }

    /// Transport replaying scripted steps and recording every request.
    pub struct ScriptedTransport {
        steps: Mutex<VecDeque<Step>>,
        requests: Mutex<Vec<TransportRequest>>,
    }

    impl ScriptedTransport {
        /// Creates a transport that plays `steps` in order.
        pub fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Returns the number of attempts observed.
        pub fn attempts(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        /// Returns the recorded requests.
        pub fn requests(&self) -> Vec<TransportRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: TransportRequest) -> Result<TransportResponse, FetchError> {
            let accept_invalid_certs = request.accept_invalid_certs;
            let host = request.url.host_str().unwrap_or_default().to_string();
            self.requests.lock().unwrap().push(request);

            let step = self
                .steps
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Step::Fail(FetchError::transport("script exhausted")));

            match step {
                Step::Respond(status, body) => Ok(TransportResponse::new(status, body)),
                Step::Fail(error) => Err(error),
                Step::ExpiredCertificate(body) if accept_invalid_certs => {
                    Ok(TransportResponse::new(200, body))
                }
                Step::ExpiredCertificate(_) => Err(FetchError::tls(host)),
            }
        }
    }
}
