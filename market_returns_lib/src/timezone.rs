//! Reference timezone handling.
//!
//! Provider timestamps and the as-of instant are both converted into a single
//! reference timezone before any comparison, and period boundaries are
//! compared as local calendar dates in that zone.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::MarketReturnsError;

/// Default reference timezone: the US equity market's.
pub const DEFAULT_REFERENCE_TZ: Tz = chrono_tz::America::New_York;

/// Parses an IANA timezone name such as `America/New_York`.
pub fn parse_timezone(name: &str) -> Result<Tz, MarketReturnsError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| MarketReturnsError::Timezone(format!("unknown timezone '{}'", name.trim())))
}

/// Converts unix seconds into the reference timezone.
pub fn from_unix_timestamp(timestamp: i64, tz: Tz) -> Option<DateTime<Tz>> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).map(|utc| utc.with_timezone(&tz))
}

/// The current instant, in the reference timezone.
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// Last whole second of `date` in `tz`.
///
/// An ambiguous time resolves to the later instant; a time inside a DST gap
/// steps back an hour.
pub fn end_of_day(date: NaiveDate, tz: Tz) -> Option<DateTime<Tz>> {
    let naive = date.and_time(NaiveTime::from_hms_opt(23, 59, 59)?);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(_, late) => Some(late),
        LocalResult::None => tz.from_local_datetime(&(naive - Duration::hours(1))).latest(),
    }
}

/// Parses an as-of argument.
///
/// Accepts RFC 3339 (`2024-06-14T16:00:00-04:00`) or a plain date
/// (`2024-06-14`), which means the end of that day in `tz`.
pub fn parse_as_of(input: &str, tz: Tz) -> Result<DateTime<Tz>, MarketReturnsError> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&tz));
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        MarketReturnsError::InvalidInput(format!(
            "invalid as-of '{}': expected YYYY-MM-DD or RFC 3339",
            input
        ))
    })?;
    end_of_day(date, tz).ok_or_else(|| {
        MarketReturnsError::Timezone(format!("cannot resolve end of {} in {}", date, tz))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parse_known_timezone() {
        assert_eq!(parse_timezone("America/New_York").unwrap(), DEFAULT_REFERENCE_TZ);
        assert_eq!(parse_timezone(" Europe/London ").unwrap(), chrono_tz::Europe::London);
    }

    #[test]
    fn parse_unknown_timezone() {
        let err = parse_timezone("Mars/Olympus_Mons").unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }

    #[test]
    fn unix_timestamp_lands_on_local_date() {
        // 2024-01-02 09:30 New York
        let dt = from_unix_timestamp(1704205800, DEFAULT_REFERENCE_TZ).unwrap();
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(dt.hour(), 9);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn late_utc_evening_is_previous_local_day() {
        // 2024-03-01 02:00 UTC is still Feb 29 in New York
        let dt = from_unix_timestamp(1709258400, DEFAULT_REFERENCE_TZ).unwrap();
        assert_eq!(dt.month(), 2);
        assert_eq!(dt.day(), 29);
    }

    #[test]
    fn end_of_day_is_last_local_second() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let end = end_of_day(date, DEFAULT_REFERENCE_TZ).unwrap();
        assert_eq!(end.hour(), 23);
        assert_eq!(end.minute(), 59);
        assert_eq!(end.second(), 59);
        assert_eq!(end.date_naive(), date);
    }

    #[test]
    fn end_of_day_on_dst_change() {
        // New York falls back on 2024-11-03; the day still ends at 23:59:59 EST.
        let date = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap();
        let end = end_of_day(date, DEFAULT_REFERENCE_TZ).unwrap();
        assert_eq!(end.date_naive(), date);
        assert_eq!(end.to_rfc3339(), "2024-11-03T23:59:59-05:00");
    }

    #[test]
    fn as_of_from_plain_date() {
        let dt = parse_as_of("2024-06-14", DEFAULT_REFERENCE_TZ).unwrap();
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2024, 6, 14).unwrap());
        assert_eq!(dt.hour(), 23);
    }

    #[test]
    fn as_of_from_rfc3339_is_normalized() {
        let dt = parse_as_of("2024-06-15T02:00:00Z", DEFAULT_REFERENCE_TZ).unwrap();
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2024, 6, 14).unwrap());
        assert_eq!(dt.hour(), 22);
    }

    #[test]
    fn as_of_rejects_garbage() {
        assert!(parse_as_of("last tuesday", DEFAULT_REFERENCE_TZ).is_err());
        assert!(parse_as_of("2024-13-01", DEFAULT_REFERENCE_TZ).is_err());
    }
}
