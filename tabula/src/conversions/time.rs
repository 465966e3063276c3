use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::bail;
use crate::error::{ErrorKind, TabulaResult};

/// Format accepted when parsing dates. Month and day may be zero padded or not.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format accepted when parsing times of day, with optional fractional seconds.
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// Formats accepted when parsing date-times, with optional fractional seconds.
pub const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Date on which decoded times of day are placed.
pub fn epoch_date() -> NaiveDate {
    NaiveDate::default()
}

/// Renders a date as `year-month-day` without zero padding, e.g. `1990-1-1`.
pub fn format_date(date: &NaiveDate) -> String {
    format!("{}-{}-{}", date.year(), date.month(), date.day())
}

/// Renders a date-time as [`format_date`] followed by a zero padded ` HH:MM:SS`.
pub fn format_date_time(date_time: &NaiveDateTime) -> String {
    format!(
        "{} {}",
        format_date(&date_time.date()),
        format_time(&date_time.time())
    )
}

pub fn format_time(time: &NaiveTime) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    )
}

/// Parses a date, ignoring a trailing time component if the backend sent one.
pub fn parse_date(s: &str) -> TabulaResult<NaiveDate> {
    let date = s.split([' ', 'T']).next().unwrap_or(s);

    Ok(NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)?)
}

/// Parses a date-time. A bare date is read as midnight of that day.
pub fn parse_date_time(s: &str) -> TabulaResult<NaiveDateTime> {
    let s = s.trim();

    for format in DATETIME_FORMATS {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(date_time);
        }
    }

    match NaiveDate::parse_from_str(s, DATE_FORMAT) {
        Ok(date) => Ok(date.and_time(NaiveTime::MIN)),
        Err(err) => bail!(
            ErrorKind::CodecError,
            "Invalid date-time value",
            format!("`{s}` is not a date-time"),
            source: err
        ),
    }
}

/// Parses a time of day and places it on the [`epoch_date`].
pub fn parse_time(s: &str) -> TabulaResult<NaiveDateTime> {
    let time = NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)?;

    Ok(epoch_date().and_time(time))
}
