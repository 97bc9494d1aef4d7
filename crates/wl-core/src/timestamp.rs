//! Timestamp normalization for event endpoints and range bounds.
//!
//! Everything is normalized to `DateTime<FixedOffset>`: values that carry an
//! offset keep it as written, values without one are localized in the zone
//! passed by the caller (the process-local zone in production).

use chrono::{
    DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
};

use crate::error::{Result, WorklogError};
use crate::event::EventEndpoint;

/// Offset-carrying layouts tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

/// Layouts without an offset; `%.f` also matches an absent fraction.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Normalizes an event endpoint to a zoned instant.
///
/// `Date` endpoints denote local midnight of that date. `DateTime` endpoints
/// accept anything [`parse_instant`] does.
pub fn normalize<Tz: TimeZone>(
    endpoint: &EventEndpoint,
    tz: &Tz,
) -> Result<DateTime<FixedOffset>> {
    match endpoint {
        EventEndpoint::Date(value) => {
            let date = parse_date(value)?;
            Ok(local_midnight(date, tz))
        }
        EventEndpoint::DateTime(value) => parse_instant(value, tz),
    }
}

/// Parses an ISO 8601 date or date-time into a zoned instant.
///
/// Supports:
/// - RFC 3339: "2024-01-01T09:00:00+01:00", "2024-01-01T08:00:00Z"
/// - Compact offsets: "2024-01-01T09:00:00+0100"
/// - Naive date-times: "2024-01-01T09:00:00", "2024-01-01 09:00"
/// - Dates: "2024-01-01" (local midnight)
pub fn parse_instant<Tz: TimeZone>(value: &str, tz: &Tz) -> Result<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt);
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
    {
        return Ok(dt);
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Ok(localize(naive, tz));
    }

    let date = parse_date(value)?;
    Ok(local_midnight(date, tz))
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        WorklogError::MalformedTimestamp {
            value: value.to_string(),
        }
    })
}

/// Midnight of `date` in `tz`.
pub fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<FixedOffset> {
    localize(date.and_time(NaiveTime::default()), tz)
}

/// Interprets a wall-clock time in `tz`.
///
/// Handles DST ambiguity by picking the earlier time. A wall-clock time inside
/// a spring-forward gap resolves one hour later, which always exists.
pub fn localize<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> DateTime<FixedOffset> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.fixed_offset(),
        LocalResult::None => tz
            .from_local_datetime(&(naive + TimeDelta::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive))
            .fixed_offset(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Timelike, Utc};

    use super::*;

    fn plus_one() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    #[test]
    fn rfc3339_keeps_its_own_offset() {
        let dt = parse_instant("2024-01-01T09:00:00-05:00", &plus_one()).unwrap();
        assert_eq!(dt.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(dt.hour(), 9);
    }

    #[test]
    fn utc_designator_is_accepted() {
        let dt = parse_instant("2024-01-01T09:00:00Z", &plus_one()).unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
    }

    #[test]
    fn compact_offset_is_accepted() {
        let dt = parse_instant("2024-01-01T09:00:00+0200", &Utc).unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn naive_datetime_is_localized() {
        let dt = parse_instant("2024-01-01T09:00:00", &plus_one()).unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 3600);
        assert_eq!(dt.to_rfc3339(), "2024-01-01T09:00:00+01:00");
    }

    #[test]
    fn naive_datetime_without_seconds_or_with_space() {
        let a = parse_instant("2024-01-01T09:30", &Utc).unwrap();
        let b = parse_instant("2024-01-01 09:30:00", &Utc).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fractional_seconds_are_kept() {
        let dt = parse_instant("2024-01-01T09:00:00.250", &Utc).unwrap();
        assert_eq!(dt.nanosecond(), 250_000_000);
    }

    #[test]
    fn date_only_is_local_midnight() {
        let dt = parse_instant("2024-03-05", &plus_one()).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-05T00:00:00+01:00");
    }

    #[test]
    fn date_endpoint_normalizes_to_midnight() {
        let endpoint = EventEndpoint::Date("2024-01-01".into());
        let dt = normalize(&endpoint, &Utc).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn date_endpoint_rejects_datetime_text() {
        let endpoint = EventEndpoint::Date("2024-01-01T09:00:00".into());
        assert!(matches!(
            normalize(&endpoint, &Utc),
            Err(WorklogError::MalformedTimestamp { .. })
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        for value in ["", "tomorrow", "2024-13-01", "2024-01-01T25:00:00", "01/02/2024"] {
            let err = parse_instant(value, &Utc).unwrap_err();
            assert!(
                matches!(err, WorklogError::MalformedTimestamp { .. }),
                "{value:?} should be malformed"
            );
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let dt = parse_instant("  2024-01-01T09:00:00Z\n", &Utc).unwrap();
        assert_eq!(dt.hour(), 9);
    }
}
