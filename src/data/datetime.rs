use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Textual timestamp layouts accepted in the first CSV column besides plain
/// epoch milliseconds.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d",
];

/// Parse a scan timestamp field into milliseconds since the Unix epoch.
///
/// Numbers are taken as-is (the capture page writes `Date.now()`-style
/// milliseconds). Otherwise RFC 3339 and the layouts in [`DATE_FORMATS`] are
/// tried. Anything else yields NaN so the row still loads.
pub fn parse_timestamp_ms(field: &str) -> f64 {
    let field = field.trim();
    if field.is_empty() {
        return f64::NAN;
    }
    if let Ok(v) = field.parse::<f64>() {
        return v;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(field) {
        return dt.timestamp_millis() as f64;
    }
    for fmt in DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(field, fmt) {
            return dt.and_utc().timestamp_millis() as f64;
        }
        if let Some(dt) = NaiveDate::parse_from_str(field, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return dt.and_utc().timestamp_millis() as f64;
        }
    }
    f64::NAN
}

/// Human-readable label for a scan timestamp, or `None` for synthetic scans
/// (zero, negative or non-finite timestamps).
pub fn format_timestamp_ms(ms: f64) -> Option<String> {
    if !ms.is_finite() || ms <= 0.0 {
        return None;
    }
    let whole = ms.floor() as i64;
    let dt = DateTime::<Utc>::from_timestamp_millis(whole)?;
    if whole % 1000 == 0 {
        Some(dt.format("%Y-%m-%d %H:%M:%S").to_string())
    } else {
        Some(dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> f64 {
    Utc::now().timestamp_millis() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_timestamps_pass_through() {
        assert_eq!(parse_timestamp_ms("1700000000123"), 1_700_000_000_123.0);
        assert_eq!(parse_timestamp_ms(" 0 "), 0.0);
    }

    #[test]
    fn textual_timestamps_are_converted() {
        assert_eq!(parse_timestamp_ms("1970-01-01T00:00:01Z"), 1000.0);
        assert_eq!(parse_timestamp_ms("1970-01-01 00:00:02.5"), 2500.0);
        assert_eq!(parse_timestamp_ms("1970-01-02"), 86_400_000.0);
        assert!(parse_timestamp_ms("not a time").is_nan());
        assert!(parse_timestamp_ms("").is_nan());
    }

    #[test]
    fn formatting_skips_synthetic_timestamps() {
        assert_eq!(format_timestamp_ms(0.0), None);
        assert_eq!(format_timestamp_ms(f64::NAN), None);
        assert_eq!(format_timestamp_ms(1000.0).as_deref(), Some("1970-01-01 00:00:01"));
        assert_eq!(
            format_timestamp_ms(1500.0).as_deref(),
            Some("1970-01-01 00:00:01.500")
        );
    }
}
