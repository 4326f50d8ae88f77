//! Presentation helpers for sizes, dates and percentages.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Placeholder shown for missing or unparseable dates.
pub const MISSING_DATE: &str = "—";

const KB: f64 = 1024.0;
const MB: f64 = 1024.0 * 1024.0;
const GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Human-readable file size with `digits` decimals (`"512 Bytes"`, `"1.5 KB"`, ...).
pub fn convert_file_size(bytes: u64, digits: usize) -> String {
    let size = bytes as f64;
    if size < KB {
        format!("{bytes} Bytes")
    } else if size < MB {
        format!("{:.*} KB", digits, size / KB)
    } else if size < GB {
        format!("{:.*} MB", digits, size / MB)
    } else {
        format!("{:.*} GB", digits, size / GB)
    }
}

/// Format an RFC 3339 timestamp as `"10:15am, 5 Oct"` in `tz`.
pub fn format_date_time(value: Option<&str>, tz: Tz) -> String {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return MISSING_DATE.to_string();
    };

    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => format_utc(&dt.with_timezone(&Utc), tz),
        Err(_) => MISSING_DATE.to_string(),
    }
}

/// Same as [`format_date_time`] for an already parsed timestamp.
pub fn format_utc(dt: &DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%-I:%M%P, %-d %b").to_string()
}

/// Share of `total` taken by `size`, in percent with two decimals.
pub fn calculate_percentage(size: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percentage = size as f64 / total as f64 * 100.0;
    (percentage * 100.0).round() / 100.0
}

/// Parse a timezone name, falling back to UTC.
pub fn parse_timezone(name: &str) -> Tz {
    name.parse().unwrap_or(Tz::UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_file_size_bytes() {
        assert_eq!(convert_file_size(0, 1), "0 Bytes");
        assert_eq!(convert_file_size(1023, 1), "1023 Bytes");
    }

    #[test]
    fn test_convert_file_size_units() {
        assert_eq!(convert_file_size(1024, 1), "1.0 KB");
        assert_eq!(convert_file_size(1536, 1), "1.5 KB");
        assert_eq!(convert_file_size(5 * 1024 * 1024, 2), "5.00 MB");
        assert_eq!(convert_file_size(3 * 1024 * 1024 * 1024, 1), "3.0 GB");
    }

    #[test]
    fn test_format_date_time_utc() {
        let result = format_date_time(Some("2024-10-05T10:15:00.000+00:00"), Tz::UTC);
        assert_eq!(result, "10:15am, 5 Oct");
    }

    #[test]
    fn test_format_date_time_afternoon_in_timezone() {
        // UTC+9
        let result = format_date_time(Some("2024-01-15T06:05:00Z"), Tz::Asia__Tokyo);
        assert_eq!(result, "3:05pm, 15 Jan");
    }

    #[test]
    fn test_format_date_time_midnight() {
        let result = format_date_time(Some("2024-03-01T00:07:00Z"), Tz::UTC);
        assert_eq!(result, "12:07am, 1 Mar");
    }

    #[test]
    fn test_format_date_time_missing_or_invalid() {
        assert_eq!(format_date_time(None, Tz::UTC), MISSING_DATE);
        assert_eq!(format_date_time(Some(""), Tz::UTC), MISSING_DATE);
        assert_eq!(format_date_time(Some("yesterday"), Tz::UTC), MISSING_DATE);
    }

    #[test]
    fn test_calculate_percentage() {
        assert_eq!(calculate_percentage(0, 100), 0.0);
        assert_eq!(calculate_percentage(1, 3), 33.33);
        assert_eq!(calculate_percentage(50, 100), 50.0);
        assert_eq!(calculate_percentage(10, 0), 0.0);
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Europe/Istanbul"), Tz::Europe__Istanbul);
        assert_eq!(parse_timezone("Nowhere/City"), Tz::UTC);
    }
}
