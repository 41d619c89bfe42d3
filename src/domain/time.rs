//! Timezone-aware helpers for day and hour bucketing.
//!
//! Series store UTC epoch seconds; the timezone only decides where local
//! days begin and which wall-clock time a sample belongs to.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;

use crate::error::{LoadshapeError, Result};

pub const SECONDS_PER_DAY: i64 = 86_400;

const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse an IANA timezone name such as `America/Los_Angeles`
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| LoadshapeError::UnknownTimezone(name.to_string()))
}

/// Convert epoch seconds into a local datetime
pub fn to_local(timestamp: i64, tz: Tz) -> Result<DateTime<Tz>> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.with_timezone(&tz))
        .ok_or_else(|| LoadshapeError::InvalidTimestamp {
            input: timestamp.to_string(),
            reason: "outside the representable range".to_string(),
        })
}

/// Local calendar date of a timestamp
pub fn local_date(timestamp: i64, tz: Tz) -> Result<NaiveDate> {
    Ok(to_local(timestamp, tz)?.date_naive())
}

/// Wall-clock seconds since local midnight
pub fn time_of_day_seconds(timestamp: i64, tz: Tz) -> Result<i64> {
    Ok(i64::from(to_local(timestamp, tz)?.num_seconds_from_midnight()))
}

/// Resolve a naive local time. Ambiguous times take the earlier instant,
/// times inside a DST gap do not exist.
pub fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => None,
    }
}

/// Epoch seconds of `seconds` wall-clock seconds after midnight on `date`,
/// or `None` when that local time is skipped by a DST transition.
pub fn local_instant(date: NaiveDate, seconds: i64, tz: Tz) -> Option<i64> {
    let naive = date.and_time(NaiveTime::MIN) + Duration::seconds(seconds);
    resolve_local(naive, tz).map(|dt| dt.timestamp())
}

/// First instant of the local day. Zones that skip midnight start the day
/// at the first existing hour.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> Result<i64> {
    (0..=3)
        .find_map(|hour| local_instant(date, hour * 3600, tz))
        .ok_or_else(|| LoadshapeError::InvalidTimestamp {
            input: date.to_string(),
            reason: format!("no local midnight in {}", tz.name()),
        })
}

/// Half-open `[start, end)` epoch bounds of a local calendar day
pub fn day_bounds(date: NaiveDate, tz: Tz) -> Result<(i64, i64)> {
    let next = date.succ_opt().ok_or_else(|| LoadshapeError::InvalidTimestamp {
        input: date.to_string(),
        reason: "no following day".to_string(),
    })?;
    Ok((local_midnight(date, tz)?, local_midnight(next, tz)?))
}

/// Parse `YYYY-MM-DD HH:MM:SS` (or `YYYY-MM-DD HH:MM`, or a bare date) as
/// local time in `tz` and return epoch seconds.
pub fn parse_local_datetime(input: &str, tz: Tz) -> Result<i64> {
    let trimmed = input.trim();
    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| LoadshapeError::InvalidTimestamp {
            input: input.to_string(),
            reason: "expected YYYY-MM-DD HH:MM:SS".to_string(),
        })?;

    resolve_local(naive, tz)
        .map(|dt| dt.timestamp())
        .ok_or_else(|| LoadshapeError::InvalidTimestamp {
            input: input.to_string(),
            reason: format!("local time does not exist in {}", tz.name()),
        })
}
