//! HTTP retrieval with retry, backoff and certificate policy.

mod fetcher;
mod retry;
mod transport;
mod trusted_hosts;

pub use fetcher::{DEFAULT_USER_AGENT, RetryingFetcher, merge_headers};
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};
pub use trusted_hosts::TrustedHosts;

#[cfg(test)]
pub use transport::mock;
