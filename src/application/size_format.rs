//! Human-readable byte counts.

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Formats a byte count: plain bytes below 1 KB, then KB or MB with one decimal.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, "0 B" ; "zero")]
    #[test_case(1023, "1023 B" ; "just_below_kb")]
    #[test_case(1024, "1.0 KB" ; "one_kb")]
    #[test_case(1536, "1.5 KB" ; "kb_fraction")]
    #[test_case(1024 * 1024 - 1, "1024.0 KB" ; "just_below_mb")]
    #[test_case(1024 * 1024, "1.0 MB" ; "one_mb")]
    #[test_case(5 * 1024 * 1024 + 300 * 1024, "5.3 MB" ; "mb_fraction")]
    fn test_format_bytes(bytes: u64, expected: &str) {
        assert_eq!(format_bytes(bytes), expected);
    }
}
