//! Container creation-time parsing for videos

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// ISO-8601 forms carrying an explicit offset
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
];

/// ISO-8601 forms without an offset
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse a creation-time tag as reported by ffprobe.
///
/// A trailing `Z` is read as `+00:00`. The wall-clock time is returned as
/// written, together with the offset when one was present; no conversion
/// between zones happens.
pub fn parse_video_datetime(s: &str) -> Option<(NaiveDateTime, Option<FixedOffset>)> {
    let s = s.trim();
    let normalized = match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        Some(rest) => format!("{}+00:00", rest),
        None => s.to_string(),
    };

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some((dt.naive_local(), Some(*dt.offset())));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some((dt, None));
        }
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| (dt, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_zulu_with_microseconds() {
        let (dt, offset) = parse_video_datetime("2023-12-14T10:30:00.000000Z").unwrap();
        let expected = DateTime::parse_from_rfc3339("2023-12-14T10:30:00+00:00").unwrap();
        assert_eq!(dt, expected.naive_local());
        assert_eq!(offset, Some(FixedOffset::east_opt(0).unwrap()));
    }

    #[test]
    fn test_parse_keeps_wall_clock_of_offset() {
        let (dt, offset) = parse_video_datetime("2024-01-15T23:30:00+08:00").unwrap();
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 23);
        assert_eq!(offset.unwrap().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_parse_without_offset() {
        let (dt, offset) = parse_video_datetime("2024-01-15T14:30:00").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.minute(), 30);
        assert!(offset.is_none());

        let (dt, _) = parse_video_datetime("2024-01-15 14:30:00").unwrap();
        assert_eq!(dt.hour(), 14);

        let (dt, _) = parse_video_datetime("2024-01-15").unwrap();
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_video_datetime("invalid").is_none());
        assert!(parse_video_datetime("2024:01:15 14:30:00").is_none());
        assert!(parse_video_datetime("2024-13-45T00:00:00Z").is_none());
    }
}
