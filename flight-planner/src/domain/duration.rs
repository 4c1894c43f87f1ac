//! ISO-8601 elapsed-time parsing.
//!
//! The offer service reports segment and layover durations as ISO-8601
//! duration strings such as `"PT5H30M"` or `"P1DT2H"`. Only the
//! fixed-length designators (weeks, days, hours, minutes, seconds) are
//! accepted; years and months have no fixed length and never appear in
//! flight durations.

use chrono::Duration;

/// Error returned when parsing an invalid ISO-8601 duration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ISO-8601 duration {input:?}: {reason}")]
pub struct DurationError {
    input: String,
    reason: &'static str,
}

impl DurationError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Parse an ISO-8601 duration such as `"PT5H30M"`.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use flight_planner::domain::parse_iso8601;
///
/// assert_eq!(parse_iso8601("PT5H30M").unwrap(), Duration::minutes(330));
/// assert_eq!(parse_iso8601("P1DT2H").unwrap(), Duration::hours(26));
/// assert_eq!(parse_iso8601("PT45S").unwrap(), Duration::seconds(45));
///
/// assert!(parse_iso8601("5H30M").is_err());
/// assert!(parse_iso8601("PT").is_err());
/// assert!(parse_iso8601("P1Y").is_err());
/// ```
pub fn parse_iso8601(s: &str) -> Result<Duration, DurationError> {
    let rest = s
        .strip_prefix('P')
        .ok_or_else(|| DurationError::new(s, "must start with 'P'"))?;

    if rest.is_empty() {
        return Err(DurationError::new(s, "no components"));
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((_, "")) => return Err(DurationError::new(s, "empty time section")),
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut total_secs: i64 = 0;

    for (value, unit) in components(s, date_part)? {
        let unit_secs = match unit {
            'W' => 7 * 86_400,
            'D' => 86_400,
            'Y' | 'M' => return Err(DurationError::new(s, "years and months are not supported")),
            _ => return Err(DurationError::new(s, "unknown date designator")),
        };
        total_secs = accumulate(s, total_secs, value, unit_secs)?;
    }

    if let Some(time_part) = time_part {
        for (value, unit) in components(s, time_part)? {
            let unit_secs = match unit {
                'H' => 3_600,
                'M' => 60,
                'S' => 1,
                _ => return Err(DurationError::new(s, "unknown time designator")),
            };
            total_secs = accumulate(s, total_secs, value, unit_secs)?;
        }
    }

    Duration::try_seconds(total_secs).ok_or_else(|| DurationError::new(s, "duration overflow"))
}

/// Parse a nullable duration, treating `None` as zero.
pub fn parse_optional_iso8601(s: Option<&str>) -> Result<Duration, DurationError> {
    s.map_or(Ok(Duration::zero()), parse_iso8601)
}

/// Split a section like `"5H30M"` into `(5, 'H'), (30, 'M')`.
fn components(input: &str, section: &str) -> Result<Vec<(i64, char)>, DurationError> {
    let mut out = Vec::new();
    let mut digits = String::new();

    for c in section.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            if digits.is_empty() {
                return Err(DurationError::new(input, "designator without a number"));
            }
            let value = digits
                .parse::<i64>()
                .map_err(|_| DurationError::new(input, "number out of range"))?;
            out.push((value, c));
            digits.clear();
        }
    }

    if !digits.is_empty() {
        return Err(DurationError::new(input, "number without a designator"));
    }

    Ok(out)
}

fn accumulate(input: &str, total: i64, value: i64, unit_secs: i64) -> Result<i64, DurationError> {
    value
        .checked_mul(unit_secs)
        .and_then(|secs| total.checked_add(secs))
        .ok_or_else(|| DurationError::new(input, "duration overflow"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_and_minutes() {
        assert_eq!(parse_iso8601("PT5H").unwrap(), Duration::hours(5));
        assert_eq!(parse_iso8601("PT45M").unwrap(), Duration::minutes(45));
        assert_eq!(parse_iso8601("PT2H26M").unwrap(), Duration::minutes(146));
    }

    #[test]
    fn parses_days_and_weeks() {
        assert_eq!(parse_iso8601("P1D").unwrap(), Duration::days(1));
        assert_eq!(parse_iso8601("P1W").unwrap(), Duration::days(7));
        assert_eq!(
            parse_iso8601("P1DT1H1M1S").unwrap(),
            Duration::seconds(86_400 + 3_600 + 60 + 1)
        );
    }

    #[test]
    fn zero_duration() {
        assert_eq!(parse_iso8601("PT0S").unwrap(), Duration::zero());
        assert_eq!(parse_iso8601("P0D").unwrap(), Duration::zero());
    }

    #[test]
    fn rejects_malformed() {
        assert!(parse_iso8601("").is_err());
        assert!(parse_iso8601("P").is_err());
        assert!(parse_iso8601("PT").is_err());
        assert!(parse_iso8601("P1DT").is_err());
        assert!(parse_iso8601("PTH").is_err());
        assert!(parse_iso8601("PT5").is_err());
        assert!(parse_iso8601("PT5X").is_err());
        assert!(parse_iso8601("P5H").is_err());
        assert!(parse_iso8601("P2M").is_err());
        assert!(parse_iso8601("-PT5H").is_err());
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse_iso8601("PT99999999999999999999H").is_err());
        assert!(parse_iso8601("P9999999999999999W").is_err());
    }

    #[test]
    fn null_is_zero() {
        assert_eq!(parse_optional_iso8601(None).unwrap(), Duration::zero());
        assert_eq!(
            parse_optional_iso8601(Some("PT1H")).unwrap(),
            Duration::hours(1)
        );
    }

    #[test]
    fn error_mentions_input() {
        let err = parse_iso8601("5H").unwrap_err();
        assert!(err.to_string().contains("\"5H\""));
    }
}
