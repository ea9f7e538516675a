//! Fetcher with retry, linear backoff and certificate allow-list.

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use crate::domain::{FetchError, FetchedImage, FetcherPort, RequestHeaders};

use super::retry::RetryPolicy;
use super::transport::{HttpTransport, TransportRequest};
use super::trusted_hosts::TrustedHosts;

/// Default client identifier sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("imgcache/", env!("CARGO_PKG_VERSION"));

const ACCEPT_IMAGES: &str = "image/*";

/// Retrieves images through an [`HttpTransport`], retrying transient failures.
pub struct RetryingFetcher<T> {
    transport: T,
    policy: RetryPolicy,
    trusted_hosts: TrustedHosts,
    user_agent: String,
}

impl<T> std::fmt::Debug for RetryingFetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingFetcher")
            .field("policy", &self.policy)
            .field("trusted_hosts", &self.trusted_hosts)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> RetryingFetcher<T> {
    /// Creates a fetcher with the default client identifier.
    #[must_use]
    pub fn new(transport: T, policy: RetryPolicy, trusted_hosts: TrustedHosts) -> Self {
        Self {
            transport,
            policy,
            trusted_hosts,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Overrides the client identifier.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: HttpTransport> FetcherPort for RetryingFetcher<T> {
    async fn fetch(&self, url: &str, headers: &RequestHeaders) -> Result<FetchedImage, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::invalid_url(e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| FetchError::invalid_url("url has no host"))?
            .to_ascii_lowercase();
        let accept_invalid_certs = self.trusted_hosts.contains(&host);
        let headers = merge_headers(&self.user_agent, headers);

        let mut attempt = 1;
        loop {
            let request = TransportRequest {
                url: parsed.clone(),
                headers: headers.clone(),
                accept_invalid_certs,
            };

            let error = match self.transport.send(request).await {
                Ok(response) if response.status == 200 => {
                    debug!(
                        url = %url,
                        attempt,
                        status = response.status,
                        size = response.bytes.len(),
                        "Fetch attempt succeeded"
                    );
                    return Ok(FetchedImage {
                        bytes: response.bytes,
                        content_type: response.content_type,
                        e_tag: response.e_tag,
                    });
                }
                Ok(response) => FetchError::from_status(response.status),
                Err(error) => error,
            };

            warn!(
                url = %url,
                attempt,
                kind = error.kind(),
                status = ?error.status(),
                error = %error,
                "Fetch attempt failed"
            );

            if error.is_terminal() || !self.policy.has_attempts_left(attempt) {
                return Err(error);
            }

            tokio::time::sleep(self.policy.backoff_after(attempt)).await;
            attempt += 1;
        }
    }
}

/// Merges caller headers with the reserved `Accept` and `User-Agent` headers.
///
/// Caller headers are additive; values for reserved names are dropped.
/// Headers with invalid names or values are skipped.
#[must_use]
pub fn merge_headers(user_agent: &str, extra: &RequestHeaders) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (name, value) in extra {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.trim().as_bytes()),
            HeaderValue::from_str(value.trim()),
        ) else {
            warn!(header = %name, "Skipping invalid request header");
            continue;
        };
        if name == ACCEPT || name == USER_AGENT {
            debug!(header = %name, "Ignoring caller value for reserved header");
            continue;
        }
        headers.append(name, value);
    }

    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_IMAGES));
    if let Ok(agent) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, agent);
    } else {
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    }

    headers
}
