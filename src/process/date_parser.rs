use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::error::{Result, TrackerError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn invalid(s: &str, reason: impl ToString) -> TrackerError {
    TrackerError::InvalidDate {
        date: s.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a `yyyy-MM-dd` record date: exactly four year digits and two each
/// for month and day. chrono alone would also take signs, padding-free
/// fields and leading spaces.
pub fn parse_record_date(s: &str) -> Result<NaiveDate> {
    let b = s.as_bytes();
    let shaped = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b
            .iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
    if !shaped {
        return Err(invalid(s, "expected yyyy-MM-dd"));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| invalid(s, e))
}

/// The instant a record's data is taken to be current as of: the end of
/// its date, i.e. midnight UTC of the following day.
pub fn known_good_instant(s: &str) -> Result<DateTime<Utc>> {
    end_of_day(parse_record_date(s)?).ok_or_else(|| invalid(s, "end of day out of range"))
}

fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_time(NaiveTime::MIN)
        .and_utc()
        .checked_add_signed(Duration::hours(24))
}
