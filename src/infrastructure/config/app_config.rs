//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::args::CliArgs;
use crate::infrastructure::http::{DEFAULT_USER_AGENT, TrustedHosts};
use crate::infrastructure::image::dirs_cache_path;

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, loaded from `config.toml` and overridden by CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path. Logs go to stderr when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Cache root directory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Client identifier sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Hosts whose invalid certificates are accepted.
    #[serde(default = "default_trusted_hosts")]
    pub trusted_hosts: Vec<String>,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_trusted_hosts() -> Vec<String> {
    vec!["localhost".to_string(), "127.0.0.1".to_string()]
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(cache_dir) = &args.cache_dir {
            self.cache_dir = Some(cache_dir.clone());
        }
        if let Some(user_agent) = &args.user_agent {
            self.user_agent.clone_from(user_agent);
        }
        if !args.trusted_hosts.is_empty() {
            self.trusted_hosts.clone_from(&args.trusted_hosts);
        }
    }

    /// Returns effective cache root.
    #[must_use]
    pub fn effective_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(dirs_cache_path)
    }

    /// Returns the certificate allow-list.
    #[must_use]
    pub fn trusted_hosts(&self) -> TrustedHosts {
        TrustedHosts::new(&self.trusted_hosts)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_level: LogLevel::Info,
            cache_dir: None,
            user_agent: default_user_agent(),
            trusted_hosts: default_trusted_hosts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_config_with_partial_fields() {
        let toml_content = r#"
            log_level = "debug"
            cache_dir = "/var/cache/calendar/images"
            trusted_hosts = ["images.staging.example"]
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(
            config.effective_cache_dir(),
            PathBuf::from("/var/cache/calendar/images")
        );
        assert!(config.trusted_hosts().contains("images.staging.example"));
        assert!(!config.trusted_hosts().contains("localhost"));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.cache_dir.is_none());
        assert!(config.trusted_hosts().contains("localhost"));
        assert!(config.trusted_hosts().contains("127.0.0.1"));
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let mut config = AppConfig::default();
        let args = CliArgs::parse_from([
            "imgcache",
            "--log-level",
            "warn",
            "--cache-dir",
            "/tmp/images",
            "--trusted-host",
            "cdn.internal",
            "size",
        ]);

        config.merge_with_args(&args);

        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.effective_cache_dir(), PathBuf::from("/tmp/images"));
        assert_eq!(config.trusted_hosts, vec!["cdn.internal".to_string()]);
    }
}
