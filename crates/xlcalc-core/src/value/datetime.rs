//! Date/time values as fractional serials

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use lazy_regex::regex_captures;

use crate::date;
use crate::error::{XlError, XlResult};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A moment in time, stored as a fractional day count since 1899-12-31
///
/// The serial is never negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DateTime {
    serial: f64,
}

impl DateTime {
    /// The epoch itself, serial 0
    pub const EPOCH: DateTime = DateTime { serial: 0.0 };

    pub fn from_serial(serial: f64) -> XlResult<Self> {
        if !serial.is_finite() || serial < 0.0 {
            return Err(XlError::num(format!(
                "Date serial {serial} must not be negative"
            )));
        }
        Ok(DateTime { serial })
    }

    /// Encode a calendar date (with month/day rollover, see [`date::encode`])
    pub fn from_ymd(year: i64, month: i64, day: i64) -> XlResult<Self> {
        let serial = date::encode(year, month, day)?;
        Ok(DateTime {
            serial: serial as f64,
        })
    }

    pub fn from_naive_date(value: NaiveDate) -> XlResult<Self> {
        let year = value.year() as i64;
        if year < 1900 {
            // Only the epoch itself is representable before 1900
            if (year, value.month(), value.day()) == (1899, 12, 31) {
                return Ok(DateTime::EPOCH);
            }
            return Err(XlError::num(format!("{value} is before 1900-01-01")));
        }
        DateTime::from_ymd(year, value.month() as i64, value.day() as i64)
    }

    pub fn from_naive_datetime(value: NaiveDateTime) -> XlResult<Self> {
        let day = DateTime::from_naive_date(value.date())?;
        let seconds = value.time().num_seconds_from_midnight() as f64;
        DateTime::from_serial(day.serial + seconds / SECONDS_PER_DAY)
    }

    /// Parse an ISO-like date or date-time string
    ///
    /// Accepts `YYYY-MM-DD` or `YYYY/MM/DD`, optionally followed by a time of
    /// day (`HH:MM` or `HH:MM:SS`, after a space or `T`). The date goes
    /// through [`date::encode`], so the fictitious 1900-02-29 parses as
    /// serial 60.
    pub fn parse(text: &str) -> Option<Self> {
        let (_, year, sep, month, sep2, day, hour, minute, second) = regex_captures!(
            r"^(\d{4})([-/])(\d{1,2})([-/])(\d{1,2})(?:[ T](\d{1,2}):(\d{2})(?::(\d{2}))?)?$",
            text.trim()
        )?;
        if sep != sep2 {
            return None;
        }
        let year: i64 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        let day: i64 = day.parse().ok()?;

        let day_serial = if (year, month, day) == (1899, 12, 31) {
            0
        } else {
            if year < 1900
                || !(1..=12).contains(&month)
                || !(1..=date::days_in_month(year, month)).contains(&day)
            {
                return None;
            }
            date::encode(year, i64::from(month), day).ok()?
        };

        let seconds = if hour.is_empty() {
            0
        } else {
            let hour: u32 = hour.parse().ok()?;
            let minute: u32 = minute.parse().ok()?;
            let second: u32 = if second.is_empty() { 0 } else { second.parse().ok()? };
            if hour > 23 || minute > 59 || second > 59 {
                return None;
            }
            hour * 3600 + minute * 60 + second
        };
        DateTime::from_serial(day_serial as f64 + f64::from(seconds) / SECONDS_PER_DAY).ok()
    }

    /// Fractional day count
    pub fn serial(&self) -> f64 {
        self.serial
    }

    /// Whole day count, time of day dropped
    pub fn day_serial(&self) -> i64 {
        self.serial.trunc() as i64
    }

    /// Calendar date as `(year, month, day)`
    pub fn ymd(&self) -> XlResult<(i64, u32, u32)> {
        date::decode(self.day_serial())
    }

    /// Split into whole days and seconds since midnight, rounding to the second
    fn day_and_seconds(&self) -> (i64, u32) {
        let total = (self.serial * SECONDS_PER_DAY).round() as i64;
        (total.div_euclid(86_400), total.rem_euclid(86_400) as u32)
    }

    /// Convert to a `chrono` value
    ///
    /// Serials up to 60 fall on or before the fictitious 1900-02-29, which
    /// has no real calendar counterpart.
    pub fn to_naive_datetime(&self) -> XlResult<NaiveDateTime> {
        let (day, seconds) = self.day_and_seconds();
        let (year, month, day_of_month) = date::decode(day)?;
        let date = NaiveDate::from_ymd_opt(year as i32, month, day_of_month)
            .ok_or_else(|| XlError::num(format!("Serial {day} has no calendar date")))?;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
            .ok_or_else(|| XlError::num(format!("Serial {} has no time of day", self.serial)))?;
        Ok(NaiveDateTime::new(date, time))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (day, seconds) = self.day_and_seconds();
        match date::decode(day) {
            Ok((year, month, day_of_month)) => write!(
                f,
                "{year:04}-{month:02}-{day_of_month:02} {:02}:{:02}:{:02}",
                seconds / 3600,
                seconds / 60 % 60,
                seconds % 60
            ),
            Err(_) => write!(f, "{}", self.serial),
        }
    }
}

impl TryFrom<NaiveDate> for DateTime {
    type Error = XlError;

    fn try_from(value: NaiveDate) -> XlResult<Self> {
        DateTime::from_naive_date(value)
    }
}

impl TryFrom<NaiveDateTime> for DateTime {
    type Error = XlError;

    fn try_from(value: NaiveDateTime) -> XlResult<Self> {
        DateTime::from_naive_datetime(value)
    }
}
