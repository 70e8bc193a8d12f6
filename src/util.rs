use crate::error::{HoursError, Result};
use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveDate, NaiveTime, TimeZone, Utc};

pub const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Monday of the ISO week containing `timestamp`, in UTC.
pub fn week_start(timestamp: &DateTime<Utc>) -> NaiveDate {
    let date = timestamp.date_naive();
    date - ChronoDuration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn week_key(timestamp: &DateTime<Utc>) -> String {
    week_start(timestamp).format("%Y-%m-%d").to_string()
}

pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// Accepts RFC 3339, `YYYY-MM-DD` and `N days|weeks|months ago`.
///
/// With `end_of_day`, a bare date resolves to its last second instead of
/// midnight so it can close an inclusive range.
pub fn parse_date(input: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let time = if end_of_day {
            NaiveTime::from_hms_opt(23, 59, 59)
        } else {
            NaiveTime::from_hms_opt(0, 0, 0)
        };
        if let Some(time) = time {
            return Ok(Utc.from_utc_datetime(&date.and_time(time)));
        }
    }

    if let Some(days) = parse_natural_days(input) {
        let target = days
            .checked_mul(86_400_000)
            .map(ChronoDuration::milliseconds)
            .and_then(|ago| Utc::now().checked_sub_signed(ago))
            .ok_or_else(|| HoursError::InvalidDate(format!("'{input}' is out of range")))?;
        return Ok(target);
    }

    Err(HoursError::InvalidDate(format!(
        "'{input}' is not RFC3339, YYYY-MM-DD or 'N days ago'"
    )))
}

/// Number of days in `N days|weeks|months ago`, or `None` when the input
/// has another shape or the count overflows.
fn parse_natural_days(input: &str) -> Option<i64> {
    let input = input.trim().to_lowercase();

    for (suffix, days) in [(" days ago", 1), (" weeks ago", 7), (" months ago", 30)] {
        if let Some(n) = input.strip_suffix(suffix) {
            let count = i64::try_from(n.trim().parse::<u64>().ok()?).ok()?;
            return count.checked_mul(days);
        }
    }

    None
}
