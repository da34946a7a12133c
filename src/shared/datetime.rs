use chrono::{DateTime, FixedOffset, Utc};

use super::constants::{DISPLAY_UTC_OFFSET_SECS, NEVER_UPDATED_LABEL};

/// Format a timestamp for the status page in China Standard Time,
/// e.g. `2026/1/2 03:04:05`.
pub fn format_display_time(time: Option<DateTime<Utc>>) -> String {
    let Some(time) = time else {
        return NEVER_UPDATED_LABEL.to_string();
    };

    match FixedOffset::east_opt(DISPLAY_UTC_OFFSET_SECS) {
        Some(offset) => time
            .with_timezone(&offset)
            .format("%Y/%-m/%-d %H:%M:%S")
            .to_string(),
        None => time.format("%Y/%-m/%-d %H:%M:%S UTC").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_formats_in_china_standard_time() {
        let time = Utc.with_ymd_and_hms(2026, 1, 1, 19, 4, 5).unwrap();
        assert_eq!(format_display_time(Some(time)), "2026/1/2 03:04:05");
    }

    #[test]
    fn test_missing_time_shows_placeholder() {
        assert_eq!(format_display_time(None), "从未更新");
    }
}
