//! `.last-sync` markers and timestamp comparison.
//!
//! A marker is a plain timestamp string written next to an asset root by the
//! backup sync job. Anything missing or unreadable collapses to epoch 0 so
//! that comparisons are total and never fail.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::path::Path;
use tracing::debug;

/// Epoch used for missing or unparsable markers.
pub const EPOCH_ZERO: i64 = 0;

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%dT%H:%M:%S%.f%z"];

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a marker string into unix seconds.
///
/// Accepts RFC 3339, RFC 2822, common ISO-like variants with or without an
/// offset (naive values are read as UTC), bare dates, `date(1)` default
/// output in UTC/GMT, and raw epoch seconds (optionally `@`-prefixed).
pub fn parse_marker(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(secs) = s.trim_start_matches('@').parse::<i64>() {
        return Some(secs);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp());
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.timestamp());
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
    }

    parse_date_command_output(s)
}

/// `Thu Jan 30 12:34:56 UTC 2026`, only for zero-offset zone names.
fn parse_date_command_output(s: &str) -> Option<i64> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != 6 || !matches!(parts[4], "UTC" | "GMT") {
        return None;
    }
    let without_zone = format!(
        "{} {} {} {} {}",
        parts[0], parts[1], parts[2], parts[3], parts[5]
    );
    NaiveDateTime::parse_from_str(&without_zone, "%a %b %d %H:%M:%S %Y")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

/// Epoch seconds for an optional marker, substituting [`EPOCH_ZERO`].
pub fn marker_epoch(raw: Option<&str>) -> i64 {
    raw.and_then(parse_marker).unwrap_or(EPOCH_ZERO)
}

/// Whether `right` is strictly newer than `left`. Ties are not newer.
pub fn is_newer(left: Option<&str>, right: Option<&str>) -> bool {
    marker_epoch(right) > marker_epoch(left)
}

/// Read the marker file at `path`; `None` when it does not exist or cannot
/// be read.
pub fn read_marker(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content.trim().to_string()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no sync marker");
            None
        }
    }
}

/// Epoch seconds of the marker stored at `path`.
pub fn marker_epoch_at(path: &Path) -> i64 {
    marker_epoch(read_marker(path).as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_common_formats() {
        let expected = 1_769_776_496; // 2026-01-30T12:34:56Z
        assert_eq!(parse_marker("2026-01-30T12:34:56Z"), Some(expected));
        assert_eq!(parse_marker("2026-01-30T12:34:56+00:00"), Some(expected));
        assert_eq!(parse_marker("2026-01-30T13:34:56+01:00"), Some(expected));
        assert_eq!(parse_marker("2026-01-30 12:34:56"), Some(expected));
        assert_eq!(parse_marker("2026-01-30T12:34:56.250"), Some(expected));
        assert_eq!(parse_marker("Fri, 30 Jan 2026 12:34:56 +0000"), Some(expected));
        assert_eq!(parse_marker("Fri Jan 30 12:34:56 UTC 2026"), Some(expected));
        assert_eq!(parse_marker("1769776496"), Some(expected));
        assert_eq!(parse_marker("@1769776496"), Some(expected));
        assert_eq!(parse_marker("  2026-01-30T12:34:56Z\n"), Some(expected));
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        assert_eq!(parse_marker("2026-01-30"), Some(1_769_731_200));
    }

    #[test]
    fn garbage_is_epoch_zero() {
        assert_eq!(parse_marker("not a date"), None);
        assert_eq!(parse_marker(""), None);
        assert_eq!(marker_epoch(Some("yesterday-ish")), EPOCH_ZERO);
        assert_eq!(marker_epoch(None), EPOCH_ZERO);
    }

    #[test]
    fn strictly_newer_only() {
        let older = Some("2026-01-01T00:00:00Z");
        let newer = Some("2026-02-01T00:00:00Z");
        assert!(is_newer(older, newer));
        assert!(!is_newer(newer, older));
        assert!(!is_newer(newer, newer));
    }

    #[test]
    fn missing_and_unparsable_compare_as_epoch_zero() {
        let stamp = Some("2026-01-01T00:00:00Z");
        assert!(is_newer(None, stamp));
        assert!(is_newer(Some("garbage"), stamp));
        assert!(!is_newer(stamp, None));
        assert!(!is_newer(None, None));
        assert!(!is_newer(None, Some("garbage")));
    }

    #[test]
    fn ordering_holds_across_a_range_of_dates() {
        let stamps = [
            "2024-12-31T23:59:59Z",
            "2025-01-01T00:00:00Z",
            "2025-06-15T08:30:00Z",
            "2026-01-30T12:34:56Z",
        ];
        for (i, a) in stamps.iter().enumerate() {
            for (j, b) in stamps.iter().enumerate() {
                assert_eq!(is_newer(Some(a), Some(b)), j > i, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn reads_marker_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".last-sync");
        assert_eq!(read_marker(&path), None);
        assert_eq!(marker_epoch_at(&path), EPOCH_ZERO);

        fs::write(&path, "2026-01-30T12:34:56Z\n").unwrap();
        assert_eq!(read_marker(&path).as_deref(), Some("2026-01-30T12:34:56Z"));
        assert_eq!(marker_epoch_at(&path), 1_769_776_496);
    }
}
