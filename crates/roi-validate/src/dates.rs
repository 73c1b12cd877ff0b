//! Permissive calendar-date parsing for DATE fields and date comparisons.
//!
//! Submissions arrive from spreadsheet exports in whatever locale the
//! operator used, so year-first, day-first and month-first orderings are all
//! accepted with `-`, `/` or `.` separators. Day-first wins over month-first
//! when both would parse (`03/04/2024` is 3 April).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%m/%d/%Y",
    "%m-%d-%Y",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a recognised date")]
pub struct DateParseError {
    pub value: String,
}

/// Parse a date with an optional time part (`T` or space separated).
///
/// Dates without a time resolve to midnight.
pub fn parse_date(raw: &str) -> Result<NaiveDateTime, DateParseError> {
    let value = raw.trim();
    let not_a_date = || DateParseError {
        value: value.to_string(),
    };

    let (date_part, time_part) = split_time(value);
    let date = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        .ok_or_else(not_a_date)?;
    let time = match time_part {
        None => NaiveTime::MIN,
        Some(time) => TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(time, format).ok())
            .ok_or_else(not_a_date)?,
    };
    Ok(date.and_time(time))
}

fn split_time(value: &str) -> (&str, Option<&str>) {
    match value.find(['T', 't', ' ']) {
        Some(index) => {
            let time = value[index + 1..].trim().trim_end_matches(['Z', 'z']);
            (&value[..index], Some(time))
        }
        None => (value, None),
    }
}
