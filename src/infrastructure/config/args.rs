use super::app_config::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "imgcache",
    version,
    about = "Remote image cache with bounded transcoding",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Cache root directory.
    #[arg(long, value_name = "PATH", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Client identifier sent with every request.
    #[arg(long, global = true)]
    pub user_agent: Option<String>,

    /// Host whose invalid certificates are accepted. Repeatable.
    #[arg(long = "trusted-host", value_name = "HOST", global = true)]
    pub trusted_hosts: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch an image through the cache and print its local path.
    Fetch {
        /// Source URL.
        url: String,

        /// Extra request header as `Name: value`. Repeatable.
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },
    /// Print the cached entry for a URL without touching the network.
    Lookup {
        /// Source URL.
        url: String,
    },
    /// Warm the cache for several URLs.
    Prefetch {
        /// Source URLs.
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Remove the cached entry for a URL.
    Evict {
        /// Source URL.
        url: String,
    },
    /// Print the total cache size.
    Size {
        /// Print the raw byte count instead of a formatted size.
        #[arg(long)]
        bytes: bool,
    },
    /// Remove every cached entry.
    Clear,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("header name is empty".to_string());
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch_with_headers() {
        let args = CliArgs::parse_from([
            "imgcache",
            "fetch",
            "https://example.com/a.png",
            "-H",
            "Authorization: Bearer abc",
        ]);

        let Command::Fetch { url, headers } = args.command else {
            panic!("expected fetch command");
        };
        assert_eq!(url, "https://example.com/a.png");
        assert_eq!(
            headers,
            vec![("Authorization".to_string(), "Bearer abc".to_string())]
        );
    }

    #[test]
    fn test_parse_header_rejects_missing_colon() {
        assert!(parse_header("Authorization Bearer").is_err());
        assert!(parse_header(": value").is_err());
    }
}
