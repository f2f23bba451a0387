//! Duration strings used in configuration
//!
//! Accepts `250ms`, `30s`, `5m`, `1h`, compound forms such as `1m30s`, and
//! bare integers (seconds).

use crate::error::ConfigError;
use std::time::Duration;

/// Parse a configuration duration string
///
/// # Errors
/// Returns `ConfigError::InvalidValue` naming `key` if the string is empty,
/// has an unknown unit, or overflows.
pub fn parse_duration(key: &str, input: &str) -> Result<Duration, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let text = input.trim();
    if text.is_empty() {
        return Err(invalid("duration must not be empty".to_string()));
    }

    if let Ok(secs) = text.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = text;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(invalid(format!("expected a number in '{}'", input)));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| invalid(format!("number out of range in '{}'", input)))?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let part = match &rest[..unit_len] {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value.saturating_mul(60)),
            "h" => Duration::from_secs(value.saturating_mul(3600)),
            "" => return Err(invalid(format!("missing unit in '{}'", input))),
            unit => return Err(invalid(format!("unknown unit '{}' in '{}'", unit, input))),
        };
        rest = &rest[unit_len..];

        total = total
            .checked_add(part)
            .ok_or_else(|| invalid(format!("duration overflow in '{}'", input)))?;
    }

    Ok(total)
}

/// Parse a duration that must be strictly positive
pub fn parse_positive_duration(key: &str, input: &str) -> Result<Duration, ConfigError> {
    let duration = parse_duration(key, input)?;
    if duration.is_zero() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "duration must be greater than zero".to_string(),
        });
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_units() {
        assert_eq!(parse_duration("k", "30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("k", "5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("k", "1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("k", "250ms").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_bare_seconds_and_compound() {
        assert_eq!(parse_duration("k", "60").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("k", "1m30s").unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(parse_duration("k", "").is_err());
        assert!(parse_duration("k", "ten seconds").is_err());
        assert!(parse_duration("k", "10d").is_err());
        assert!(parse_duration("k", "s").is_err());
    }

    #[test]
    fn test_error_names_key() {
        let err = parse_duration("notice_interval", "5x").unwrap_err();
        assert!(err.to_string().contains("notice_interval"));
    }

    #[test]
    fn test_zero_rejected_when_positive_required() {
        assert!(parse_positive_duration("k", "0s").is_err());
        assert!(parse_positive_duration("k", "1s").is_ok());
    }
}
