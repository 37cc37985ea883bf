use serde_json::Value;

/// Parses `"m:ss"` or `"h:mm:ss"` into milliseconds.
///
/// Malformed input yields 0.
pub fn parse_timecode(text: &str) -> u64 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }

    let mut parts = Vec::with_capacity(3);
    for part in text.split(':') {
        match part.trim().parse::<u64>() {
            Ok(n) => parts.push(n),
            Err(_) => return 0,
        }
    }

    if parts.len() > 3 {
        return 0;
    }

    let seconds = parts
        .iter()
        .fold(0u64, |acc, n| acc.saturating_mul(60).saturating_add(*n));
    seconds.saturating_mul(1000)
}

/// Reads a duration in seconds that upstreams send as a number, a numeric
/// string, or a timecode. Negative values (live streams) become 0.
pub fn parse_loose_seconds(value: &Value) -> u64 {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u.saturating_mul(1000)
            } else if let Some(f) = n.as_f64() {
                if f.is_finite() && f > 0.0 {
                    (f * 1000.0) as u64
                } else {
                    0
                }
            } else {
                0
            }
        }
        Value::String(s) if s.contains(':') => parse_timecode(s),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f > 0.0)
            .map(|f| (f * 1000.0) as u64)
            .unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minutes_seconds() {
        assert_eq!(parse_timecode("3:45"), 225_000);
        assert_eq!(parse_timecode("0:07"), 7_000);
    }

    #[test]
    fn test_hours_minutes_seconds() {
        assert_eq!(parse_timecode("1:02:03"), 3_723_000);
    }

    #[test]
    fn test_malformed_timecodes() {
        assert_eq!(parse_timecode(""), 0);
        assert_eq!(parse_timecode("abc"), 0);
        assert_eq!(parse_timecode("3:xx"), 0);
        assert_eq!(parse_timecode("1:2:3:4"), 0);
        assert_eq!(parse_timecode("-1:30"), 0);
        assert_eq!(parse_timecode("3::45"), 0);
    }

    #[test]
    fn test_loose_seconds() {
        assert_eq!(parse_loose_seconds(&json!(245)), 245_000);
        assert_eq!(parse_loose_seconds(&json!("245")), 245_000);
        assert_eq!(parse_loose_seconds(&json!(12.5)), 12_500);
        assert_eq!(parse_loose_seconds(&json!("4:05")), 245_000);
        assert_eq!(parse_loose_seconds(&json!(-1)), 0);
        assert_eq!(parse_loose_seconds(&json!(null)), 0);
        assert_eq!(parse_loose_seconds(&json!("soon")), 0);
    }
}
