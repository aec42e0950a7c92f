//! Duration strings for bucket settings: a concatenation of `<n><unit>`
//! segments with units `w`, `d`, `h`, `m`, `s`: `7d`, `2h30m`, `1w2d`.

use std::time::Duration;

/// Parse a duration string. Trailing garbage and empty input are errors;
/// `0s` and other zero totals are rejected.
///
/// # Errors
///
/// Returns a human-readable reason when the string is not a valid duration.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    if input.is_empty() {
        return Err("empty duration".to_owned());
    }

    let mut total_secs: u64 = 0;
    let mut digits = String::new();

    for ch in input.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        if digits.is_empty() {
            return Err(format!("expected a number before unit '{ch}'"));
        }
        let value: u64 = digits
            .parse()
            .map_err(|_| format!("invalid number: {digits}"))?;
        digits.clear();

        let unit_secs = match ch {
            'w' => 7 * 24 * 3600,
            'd' => 24 * 3600,
            'h' => 3600,
            'm' => 60,
            's' => 1,
            other => return Err(format!("unknown unit: {other}")),
        };
        total_secs = total_secs
            .checked_add(value.saturating_mul(unit_secs))
            .ok_or_else(|| "duration overflows".to_owned())?;
    }

    if !digits.is_empty() {
        return Err(format!("number {digits} has no unit"));
    }
    if total_secs == 0 {
        return Err("duration is zero".to_owned());
    }

    Ok(Duration::from_secs(total_secs))
}

/// Render a duration back into the compact `1w2d3h4m5s` form.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let mut secs = duration.as_secs();
    if secs == 0 {
        return "0s".to_owned();
    }

    let mut out = String::new();
    for (unit_secs, suffix) in [
        (7 * 24 * 3600, 'w'),
        (24 * 3600, 'd'),
        (3600, 'h'),
        (60, 'm'),
        (1, 's'),
    ] {
        let count = secs / unit_secs;
        if count > 0 {
            out.push_str(&count.to_string());
            out.push(suffix);
            secs %= unit_secs;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_single_unit_durations() {
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(7 * 86400));
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("2w").unwrap(), Duration::from_secs(14 * 86400));
    }

    #[test]
    fn test_should_parse_concatenated_durations() {
        assert_eq!(
            parse_duration("2h30m").unwrap(),
            Duration::from_secs(2 * 3600 + 30 * 60)
        );
        assert_eq!(
            parse_duration("1w2d3h").unwrap(),
            Duration::from_secs(7 * 86400 + 2 * 86400 + 3 * 3600)
        );
    }

    #[test]
    fn test_should_reject_malformed_durations() {
        for input in ["", "d", "5", "5x", "h30m", "5d3"] {
            assert!(parse_duration(input).is_err(), "input: {input}");
        }
    }

    #[test]
    fn test_should_reject_zero_durations() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("0h0m").is_err());
    }

    #[test]
    fn test_should_format_durations_compactly() {
        assert_eq!(format_duration(Duration::from_secs(7 * 86400)), "7d");
        assert_eq!(
            format_duration(Duration::from_secs(2 * 3600 + 30 * 60)),
            "2h30m"
        );
        assert_eq!(format_duration(Duration::from_secs(0)), "0s");
        assert_eq!(
            format_duration(Duration::from_secs(8 * 86400)),
            "1w1d"
        );
    }

    #[test]
    fn test_should_round_trip_formatted_durations() {
        for input in ["7d", "2h30m", "1w2d3h4m5s"] {
            let parsed = parse_duration(input).unwrap();
            assert_eq!(format_duration(parsed), input);
        }
    }
}
