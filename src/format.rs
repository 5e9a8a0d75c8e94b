//! Display helpers for link statistics.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Units tried largest first; the first one that fits at least once wins.
const UNITS: [(&str, i64); 6] = [
    ("year", 31_536_000),
    ("month", 2_592_000),
    ("week", 604_800),
    ("day", 86_400),
    ("hour", 3_600),
    ("minute", 60),
];

pub const JUST_NOW: &str = "Just now";

/// Coarse "time ago" rendering of `then`, relative to the current time.
pub fn time_ago(then: DateTime<Utc>) -> String {
    time_ago_at(Utc::now(), then)
}

/// Like [`time_ago`] with an explicit "now".
///
/// Timestamps in the future render as "Just now".
pub fn time_ago_at(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let elapsed = (now - then).num_milliseconds().div_euclid(1000);

    for (unit, seconds) in UNITS {
        let count = elapsed.div_euclid(seconds);
        if count >= 1 {
            return format!("{} {}{} ago", count, unit, if count > 1 { "s" } else { "" });
        }
    }

    JUST_NOW.to_string()
}

/// Parses timestamps the way the browser's `Date` does.
///
/// An explicit offset is honoured. A date-time without one is local time, which
/// is what the backend renders; a bare date is UTC midnight.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Some(naive) = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        // a wall-clock time skipped by a DST jump has no local reading
        return Local.from_local_datetime(&naive).earliest().map(|local| local.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Groups the integer digits in threes: `1234567.5` → `"1,234,567.5"`.
pub fn format_number(value: f64) -> String {
    let rendered = value.to_string();
    let (sign, unsigned) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (idx, digit) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn ago(seconds: i64) -> String {
        time_ago_at(now(), now() - Duration::seconds(seconds))
    }

    #[test]
    fn minute_and_hour_boundaries() {
        assert_eq!(ago(59), "Just now");
        assert_eq!(ago(60), "1 minute ago");
        assert_eq!(ago(3599), "59 minutes ago");
        assert_eq!(ago(3600), "1 hour ago");
    }

    #[test]
    fn larger_units_and_plurals() {
        assert_eq!(ago(0), "Just now");
        assert_eq!(ago(2 * 86_400), "2 days ago");
        assert_eq!(ago(604_800), "1 week ago");
        assert_eq!(ago(29 * 86_400), "4 weeks ago");
        assert_eq!(ago(30 * 86_400), "1 month ago");
        assert_eq!(ago(400 * 86_400), "1 year ago");
        assert_eq!(ago(3 * 31_536_000), "3 years ago");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        assert_eq!(ago(-1), "Just now");
        assert_eq!(ago(-7200), "Just now");
    }

    #[test]
    fn sub_second_remainders_floor() {
        let then = now() - Duration::milliseconds(59_999);
        assert_eq!(time_ago_at(now(), then), "Just now");
    }

    #[test]
    fn offsets_are_honoured() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 19, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2026-10-19T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-19T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp(" 2026-10-19T10:30:00.000+00:00 "), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2026-13-40"), None);
    }

    #[test]
    fn naive_timestamps_are_local_time() {
        let naive = NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_micro_opt(10, 30, 0, 250_000)
            .unwrap();
        let expected = Local.from_local_datetime(&naive).earliest().map(|t| t.with_timezone(&Utc));

        assert_eq!(parse_timestamp("2026-10-19T10:30:00.250000"), expected);
        assert_eq!(
            parse_timestamp("2026-10-19 10:30:00").map(|t| t.timestamp()),
            expected.map(|t| t.timestamp())
        );
    }

    #[test]
    fn freshly_rendered_local_timestamp_is_just_now() {
        // rendered like the backend's naive `isoformat()`
        let rendered = Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
        let parsed = parse_timestamp(&rendered).expect("local timestamp parses");

        assert_eq!(time_ago(parsed), JUST_NOW);
    }

    #[test]
    fn bare_date_is_utc_midnight() {
        assert_eq!(
            parse_timestamp("2026-10-19"),
            Some(Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1000.0), "1,000");
        assert_eq!(format_number(1234567.0), "1,234,567");
        assert_eq!(format_number(-9876543.0), "-9,876,543");
        assert_eq!(format_number(1234.5), "1,234.5");
    }
}
