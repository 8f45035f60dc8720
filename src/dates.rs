//! Calendar date parsing, serialization helpers and month ranges.
//!
//! Expense dates are calendar dates stored as "YYYY-MM-DD" text, so string
//! comparison in SQL matches chronological order.

use time::{
    Date, Month, OffsetDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

use crate::Error;

/// The canonical text form of an expense date, e.g. "2024-03-31".
pub const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

/// Parse a date given as either "YYYY-MM-DD" or a full RFC 3339 timestamp.
///
/// For timestamps only the date part is kept, the time of day is dropped.
/// Returns `None` if `raw` is neither.
pub fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();

    Date::parse(raw, DATE_FORMAT)
        .ok()
        .or_else(|| OffsetDateTime::parse(raw, &Rfc3339).ok().map(|dt| dt.date()))
}

/// Parse an optional date query parameter, treating empty strings as absent.
///
/// # Errors
///
/// Returns `invalid` if the parameter is present but is not a date.
pub fn parse_optional_date(raw: Option<&str>, invalid: Error) -> Result<Option<Date>, Error> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_date(raw).map(Some).ok_or(invalid),
    }
}

/// The first and last day of the month that contains `date`.
pub fn month_of(date: Date) -> Result<DateRange, Error> {
    let start = date.replace_day(1).map_err(|_| Error::InvalidDate)?;

    let next_month_start = match date.month() {
        Month::December => Date::from_calendar_date(date.year() + 1, Month::January, 1),
        month => Date::from_calendar_date(date.year(), month.next(), 1),
    }
    .map_err(|_| Error::InvalidDate)?;

    let end = next_month_start.previous_day().ok_or(Error::InvalidDate)?;

    Ok(DateRange { start, end })
}

/// Serialize a [Date] as "YYYY-MM-DD".
pub mod date_format {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::DATE_FORMAT;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_date(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {s}")))
    }
}

/// Serialize an [time::OffsetDateTime] as an RFC 3339 timestamp.
pub mod timestamp_format {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, &Rfc3339).map_err(serde::de::Error::custom)
    }
}
