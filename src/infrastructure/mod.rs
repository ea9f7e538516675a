//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// HTTP retrieval.
pub mod http;
/// Image transcoding and disk storage.
pub mod image;

pub use config::{AppConfig, CliArgs, Command, LogLevel, StorageManager};
pub use self::http::{ReqwestTransport, RetryPolicy, RetryingFetcher, TrustedHosts};
pub use self::image::{DiskStore, JpegTranscoder};
