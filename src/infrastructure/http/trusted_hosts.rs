//! Hosts whose certificate validation failures are tolerated.

use std::collections::HashSet;

/// Fixed allow-list of origins, matched by exact host name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedHosts {
    hosts: HashSet<String>,
}

impl TrustedHosts {
    /// Creates an allow-list from host names. Matching is case-insensitive.
    #[must_use]
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.as_ref().trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Returns true if invalid certificates are accepted for `host`.
    #[must_use]
    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains(&host.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_host_match() {
        let hosts = TrustedHosts::new(["images.internal.example", "localhost"]);
        assert!(hosts.contains("images.internal.example"));
        assert!(hosts.contains("LOCALHOST"));
        assert!(!hosts.contains("internal.example"));
        assert!(!hosts.contains("evil.images.internal.example"));
    }

    #[test]
    fn test_blank_entries_ignored() {
        let hosts = TrustedHosts::new(["", "  "]);
        assert_eq!(hosts, TrustedHosts::default());
        assert!(!hosts.contains(""));
    }
}
