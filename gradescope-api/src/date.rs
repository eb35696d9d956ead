//! Gradescope renders due dates as wall-clock times in its own timezone and expects absolute UTC
//! timestamps back.

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

pub const SITE_TIMEZONE: Tz = chrono_tz::US::Eastern;

pub const GRADESCOPE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a site-rendered timestamp as a wall-clock time. An explicit offset, if the site includes
/// one, is discarded: the wall-clock reading is what counts.
pub fn parse_site_local(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_local());
    }

    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Pins a site-local wall-clock time to an instant.
///
/// Times repeated by the autumn DST change resolve to standard time. Times skipped by the spring
/// change use the offset in effect before the gap.
pub fn localize(local: NaiveDateTime) -> DateTime<Utc> {
    match SITE_TIMEZONE.from_local_datetime(&local) {
        LocalResult::Single(instant) => instant.with_timezone(&Utc),
        LocalResult::Ambiguous(_, standard) => standard.with_timezone(&Utc),
        LocalResult::None => {
            // read as UTC, `local` lands before the transition for any zone west of Greenwich
            let offset = SITE_TIMEZONE.offset_from_utc_datetime(&local).fix();
            let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
            Utc.from_utc_datetime(&utc)
        }
    }
}

/// New absolute due date for a site-local due date pushed back by `offset`.
pub fn shift_due_date(local: NaiveDateTime, offset: TimeDelta) -> DateTime<Utc> {
    localize(local) + offset
}

pub fn format_absolute(instant: &DateTime<Utc>) -> String {
    instant.format(GRADESCOPE_DATETIME_FORMAT).to_string()
}
