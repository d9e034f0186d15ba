//! Display formatting for backend timestamps.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

fn parse_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(tz));
    }
    // SQLite-style `YYYY-MM-DD HH:MM:SS` without an offset is UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc().with_timezone(tz))
}

/// `Mon D HH:MM` in the local timezone, or `raw` unchanged when it does not parse.
pub fn short_timestamp(raw: &str) -> String {
    short_timestamp_in(raw, &Local)
}

pub fn short_timestamp_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(raw, tz) {
        Some(at) => at.format("%b %-d %H:%M").to_string(),
        None => raw.to_string(),
    }
}

/// `HH:MM` in the local timezone, or `None` when `raw` does not parse.
pub fn clock_time(raw: &str) -> Option<String> {
    clock_time_in(raw, &Local)
}

pub fn clock_time_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    parse_timestamp(raw, tz).map(|at| at.format("%H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn rfc3339_is_formatted_in_target_zone() {
        assert_eq!(short_timestamp_in("2024-05-01T10:07:00Z", &Utc), "May 1 10:07");
        let plus_two = FixedOffset::east_opt(2 * 3600).expect("valid offset");
        assert_eq!(
            short_timestamp_in("2024-05-01T23:30:00Z", &plus_two),
            "May 2 01:30"
        );
    }

    #[test]
    fn offsetless_timestamps_are_utc() {
        assert_eq!(short_timestamp_in("2024-12-24 08:05:09", &Utc), "Dec 24 08:05");
        assert_eq!(
            short_timestamp_in("2024-12-24T08:05:09.123", &Utc),
            "Dec 24 08:05"
        );
    }

    #[test]
    fn clock_time_drops_the_date() {
        assert_eq!(
            clock_time_in("2024-05-01T10:07:59.999Z", &Utc).as_deref(),
            Some("10:07")
        );
        assert_eq!(clock_time_in("not a time", &Utc), None);
    }

    #[test]
    fn unparseable_values_pass_through() {
        assert_eq!(short_timestamp_in("yesterday", &Utc), "yesterday");
        assert_eq!(short_timestamp_in("", &Utc), "");
    }
}
