//! Human-readable duration parsing (e.g., "10m", "24h").

use std::time::Duration;
use thiserror::Error;

/// Error parsing a duration string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid duration '{input}' - expected format like '30s', '10m', '24h', or '7d'")]
pub struct DurationParseError {
    input: String,
}

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Parse a duration string.
///
/// Bare numbers are seconds. Suffixes `s`, `m`, `h` and `d` are
/// case-insensitive.
///
/// ```
/// use std::time::Duration;
/// use tilecache::config::parse_duration;
///
/// assert_eq!(parse_duration("90").unwrap(), Duration::from_secs(90));
/// assert_eq!(parse_duration("10m").unwrap(), Duration::from_secs(600));
/// assert_eq!(parse_duration("24H").unwrap(), Duration::from_secs(86_400));
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, DurationParseError> {
    let trimmed = s.trim();
    let error = || DurationParseError {
        input: trimmed.to_string(),
    };

    let last = trimmed.chars().last().ok_or_else(error)?;
    let (num_str, unit) = match last.to_ascii_lowercase() {
        's' => (&trimmed[..trimmed.len() - 1], 1),
        'm' => (&trimmed[..trimmed.len() - 1], MINUTE),
        'h' => (&trimmed[..trimmed.len() - 1], HOUR),
        'd' => (&trimmed[..trimmed.len() - 1], DAY),
        _ => (trimmed, 1),
    };

    let num: u64 = num_str.trim().parse().map_err(|_| error())?;
    num.checked_mul(unit)
        .map(Duration::from_secs)
        .ok_or_else(error)
}

/// Format a duration with the largest exact unit. Sub-second parts are
/// dropped.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        "0s".to_string()
    } else if secs % DAY == 0 {
        format!("{}d", secs / DAY)
    } else if secs % HOUR == 0 {
        format!("{}h", secs / HOUR)
    } else if secs % MINUTE == 0 {
        format!("{}m", secs / MINUTE)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("10m").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604_800));
        assert_eq!(parse_duration(" 5 m ").unwrap(), Duration::from_secs(300));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("ten minutes").is_err());
        assert!(parse_duration("1.5h").is_err());
        assert!(parse_duration("-1s").is_err());
        assert!(parse_duration("2w").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_secs(600)), "10m");
        assert_eq!(format_duration(Duration::from_secs(86_400)), "1d");
        assert_eq!(format_duration(Duration::from_secs(90)), "90s");
        assert_eq!(format_duration(Duration::from_secs(5400)), "90m");
    }
}
