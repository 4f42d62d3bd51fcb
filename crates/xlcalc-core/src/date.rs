//! Date serial arithmetic
//!
//! Dates are day counts ("serials") in the 1900 date system: serial 1 is
//! 1900-01-01 and serial 0 is the epoch, 1899-12-31.
//!
//! Notes:
//! - The 1900 system includes the historical "1900 leap year" bug: a
//!   non-existent 1900-02-29 occupies serial 60. Encoding and decoding both
//!   honor that fictitious day, so they stay exact inverses of each other.
//! - Year fractions follow the five day-count conventions selected by
//!   [`Basis`].

use crate::error::{XlError, XlResult};

/// Last year representable in the date system
pub const MAX_YEAR: i64 = 9999;

/// Serial of 9999-12-31
pub const MAX_SERIAL: i64 = 2_958_465;

const BASE_YEAR: i64 = 1900;

/// Leap year test, including the fictitious 1900-02-29
pub fn is_leap_year(year: i64) -> bool {
    year == BASE_YEAR || (year % 4 == 0 && (year % 100 != 0 || year % 400 == 0))
}

pub fn days_in_year(year: i64) -> i64 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

pub fn days_in_month(year: i64, month: u32) -> i64 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

/// Gregorian leap years in `1..=year`
fn gregorian_leaps_through(year: i64) -> i64 {
    year.div_euclid(4) - year.div_euclid(100) + year.div_euclid(400)
}

/// Serial of the day before January 1st of `year`.
fn days_before_year(year: i64) -> i64 {
    let quirk = if year > BASE_YEAR { 1 } else { 0 };
    365 * (year - BASE_YEAR) + gregorian_leaps_through(year - 1)
        - gregorian_leaps_through(BASE_YEAR - 1)
        + quirk
}

fn days_before_month(year: i64, month: u32) -> i64 {
    (1..month).map(|m| days_in_month(year, m)).sum()
}

/// Encode a calendar date as a serial.
///
/// Out-of-range months roll into adjacent years and out-of-range days roll
/// into adjacent months. Years below 1900 are shifted by 1900 (`99` means
/// 1999). The year must lie strictly between 0 and 9999 and the resulting
/// serial must be positive, otherwise the result is `#NUM!`.
pub fn encode(year: i64, month: i64, day: i64) -> XlResult<i64> {
    if !(0 < year && year < MAX_YEAR) {
        return Err(XlError::num(format!(
            "Year must be between 1 and 9999, instead {year}"
        )));
    }
    let year = if year < BASE_YEAR { year + BASE_YEAR } else { year };

    // Normalize month overflow/underflow with a 0-based month index.
    let total_months = year
        .checked_mul(12)
        .and_then(|m| m.checked_add(month.checked_sub(1)?))
        .ok_or_else(|| XlError::num(format!("Month {month} is out of range")))?;
    let norm_year = total_months.div_euclid(12);
    let norm_month = total_months.rem_euclid(12) as u32 + 1;

    if !(1..=MAX_YEAR).contains(&norm_year) {
        return Err(XlError::num(format!(
            "Date falls in year {norm_year}, outside 1..=9999"
        )));
    }

    let serial = (days_before_year(norm_year) + days_before_month(norm_year, norm_month))
        .checked_add(day)
        .ok_or_else(|| XlError::num(format!("Day {day} is out of range")))?;

    if serial <= 0 {
        return Err(XlError::num("Date result is negative."));
    }
    if serial > MAX_SERIAL {
        return Err(XlError::num("Date result is after 9999-12-31."));
    }
    Ok(serial)
}

/// Decode a serial into `(year, month, day)`.
///
/// Serial 0 decodes to the epoch, 1899-12-31.
pub fn decode(serial: i64) -> XlResult<(i64, u32, u32)> {
    if serial < 0 {
        return Err(XlError::num(format!("Serial {serial} is negative")));
    }
    if serial > MAX_SERIAL {
        return Err(XlError::num(format!("Serial {serial} is after 9999-12-31")));
    }
    if serial == 0 {
        return Ok((BASE_YEAR - 1, 12, 31));
    }

    let mut remaining = serial;
    let mut year = BASE_YEAR;
    while remaining > days_in_year(year) {
        remaining -= days_in_year(year);
        year += 1;
    }

    let mut month = 1;
    while remaining > days_in_month(year, month) {
        remaining -= days_in_month(year, month);
        month += 1;
    }

    Ok((year, month, remaining as u32))
}

/// Day-count convention for [`year_fraction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Basis {
    /// 0 - US (NASD) 30/360
    Us30360,
    /// 1 - Actual/actual
    ActualActual,
    /// 2 - Actual/360
    Actual360,
    /// 3 - Actual/365
    Actual365,
    /// 4 - European 30/360
    European30360,
}

impl TryFrom<i64> for Basis {
    type Error = XlError;

    fn try_from(code: i64) -> XlResult<Self> {
        match code {
            0 => Ok(Basis::Us30360),
            1 => Ok(Basis::ActualActual),
            2 => Ok(Basis::Actual360),
            3 => Ok(Basis::Actual365),
            4 => Ok(Basis::European30360),
            _ => Err(XlError::value(format!(
                "basis must be 0, 1, 2, 3 or 4, got {code}"
            ))),
        }
    }
}

fn days_360(y1: i64, m1: u32, d1: u32, y2: i64, m2: u32, d2: u32) -> f64 {
    let count = 360 * (y2 - y1) + 30 * (m2 as i64 - m1 as i64) + (d2 as i64 - d1 as i64);
    count as f64
}

fn is_last_day_of_february(year: i64, month: u32, day: u32) -> bool {
    month == 2 && day as i64 == days_in_month(year, 2)
}

/// Does a February 29th fall within `start..=end`?
fn spans_leap_day(start: i64, end: i64, y1: i64, y2: i64) -> bool {
    [y1, y2].into_iter().filter(|y| is_leap_year(*y)).any(|y| {
        let leap_day = days_before_year(y) + 31 + 29;
        (start..=end).contains(&leap_day)
    })
}

/// Fraction of a year between two serials.
///
/// Arguments are swapped when `start > end`, so the result is never negative
/// and does not depend on argument order. Fractional days are truncated.
pub fn year_fraction(start: f64, end: f64, basis: Basis) -> XlResult<f64> {
    for (name, serial) in [("start_date", start), ("end_date", end)] {
        if !serial.is_finite() || serial < 0.0 {
            return Err(XlError::value(format!(
                "{name} {serial} must be positive"
            )));
        }
    }

    let (start, end) = if start > end { (end, start) } else { (start, end) };
    let (start, end) = (start.trunc() as i64, end.trunc() as i64);
    let (y1, m1, d1) = decode(start)?;
    let (y2, m2, d2) = decode(end)?;
    let actual_days = (end - start) as f64;

    let fraction = match basis {
        Basis::Us30360 => {
            let (mut d1, mut d2) = (d1, d2);
            if is_last_day_of_february(y1, m1, d1) {
                if is_last_day_of_february(y2, m2, d2) {
                    d2 = 30;
                }
                d1 = 30;
            }
            if d2 == 31 && d1 >= 30 {
                d2 = 30;
            }
            if d1 == 31 {
                d1 = 30;
            }
            days_360(y1, m1, d1, y2, m2, d2) / 360.0
        }
        Basis::ActualActual => {
            let within_a_year =
                y1 == y2 || (y2 == y1 + 1 && (m1 > m2 || (m1 == m2 && d1 >= d2)));
            if y1 == y2 {
                actual_days / days_in_year(y1) as f64
            } else if within_a_year {
                let year_len = if spans_leap_day(start, end, y1, y2) {
                    366.0
                } else {
                    365.0
                };
                actual_days / year_len
            } else {
                let total: i64 = (y1..=y2).map(days_in_year).sum();
                let average = total as f64 / (y2 - y1 + 1) as f64;
                actual_days / average
            }
        }
        Basis::Actual360 => actual_days / 360.0,
        Basis::Actual365 => actual_days / 365.0,
        Basis::European30360 => {
            days_360(y1, m1, d1.min(30), y2, m2, d2.min(30)) / 360.0
        }
    };

    Ok(fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    fn date(y: i64, m: i64, d: i64) -> i64 {
        encode(y, m, d).unwrap()
    }

    fn yearfrac(start: i64, end: i64, basis: i64) -> f64 {
        year_fraction(start as f64, end as f64, Basis::try_from(basis).unwrap()).unwrap()
    }

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_encode_known_serials() {
        assert_eq!(date(1900, 1, 1), 1);
        assert_eq!(date(1900, 2, 28), 59);
        assert_eq!(date(1900, 2, 29), 60); // the fictitious leap day
        assert_eq!(date(1900, 3, 1), 61);
        assert_eq!(date(2000, 1, 1), 36526);
        assert_eq!(date(2008, 11, 3), 39755);
        assert_eq!(date(2008, 2, 29), 39507);
        assert_eq!(date(2024, 1, 1), 45292);
        assert_eq!(date(2026, 1, 1), 46023);
        assert_eq!(date(9998, 12, 31), MAX_SERIAL - 365);
    }

    #[test]
    fn test_encode_short_year() {
        assert_eq!(date(99, 1, 1), date(1999, 1, 1));
        assert_eq!(date(1, 1, 1), date(1901, 1, 1));
    }

    #[test]
    fn test_encode_rolls_months_and_days() {
        assert_eq!(date(2009, 14, 1), date(2010, 2, 1));
        assert_eq!(date(2009, -1, 1), date(2008, 11, 1));
        assert_eq!(date(2009, 0, 1), date(2008, 12, 1));
        assert_eq!(date(2009, -12, 1), date(2007, 12, 1));
        assert_eq!(date(2009, 24, 1), date(2010, 12, 1));
        assert_eq!(date(2009, 1, -1), date(2008, 12, 30));
        assert_eq!(date(2009, 1, 0), date(2008, 12, 31));
        assert_eq!(date(2009, 1, 400), date(2010, 2, 4));
        assert_eq!(date(2009, 2, 29), date(2009, 3, 1));
    }

    #[test]
    fn test_encode_errors() {
        assert_eq!(encode(-1, 1, 1).unwrap_err().kind(), ErrorKind::Num);
        assert_eq!(encode(0, 1, 1).unwrap_err().kind(), ErrorKind::Num);
        assert_eq!(encode(9999, 1, 1).unwrap_err().kind(), ErrorKind::Num);
        assert_eq!(encode(10000, 1, 1).unwrap_err().kind(), ErrorKind::Num);
        assert_eq!(encode(1900, 1, -1).unwrap_err().kind(), ErrorKind::Num);
        assert_eq!(encode(1900, 1, 0).unwrap_err().kind(), ErrorKind::Num);
        assert_eq!(encode(9998, 12, 400).unwrap_err().kind(), ErrorKind::Num);
        assert_eq!(encode(2000, i64::MAX, 1).unwrap_err().kind(), ErrorKind::Num);
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode(0).unwrap(), (1899, 12, 31));
        assert_eq!(decode(1).unwrap(), (1900, 1, 1));
        assert_eq!(decode(59).unwrap(), (1900, 2, 28));
        assert_eq!(decode(60).unwrap(), (1900, 2, 29));
        assert_eq!(decode(61).unwrap(), (1900, 3, 1));
        assert_eq!(decode(36526).unwrap(), (2000, 1, 1));
        assert_eq!(decode(39507).unwrap(), (2008, 2, 29));
        assert_eq!(decode(MAX_SERIAL).unwrap(), (9999, 12, 31));
        assert_eq!(decode(-1).unwrap_err().kind(), ErrorKind::Num);
        assert_eq!(decode(MAX_SERIAL + 1).unwrap_err().kind(), ErrorKind::Num);
    }

    #[test]
    fn test_basis_codes() {
        assert_eq!(Basis::try_from(0).unwrap(), Basis::Us30360);
        assert_eq!(Basis::try_from(4).unwrap(), Basis::European30360);
        assert_eq!(Basis::try_from(5).unwrap_err().kind(), ErrorKind::Value);
        assert_eq!(Basis::try_from(-1).unwrap_err().kind(), ErrorKind::Value);
    }

    #[test]
    fn test_yearfrac_basis_0() {
        assert_approx(yearfrac(date(2012, 1, 1), date(2012, 7, 30), 0), 0.58055556);
        assert_approx(yearfrac(date(2008, 1, 1), date(2015, 4, 20), 0), 7.30277777777778);
        assert_approx(yearfrac(date(2024, 1, 1), date(2025, 1, 1), 0), 1.0);
        // Month-end clamping
        assert_approx(yearfrac(date(2011, 1, 31), date(2011, 3, 31), 0), 60.0 / 360.0);
        assert_approx(yearfrac(date(2011, 2, 28), date(2012, 2, 29), 0), 1.0);
    }

    #[test]
    fn test_yearfrac_basis_1() {
        assert_approx(yearfrac(date(2012, 1, 1), date(2012, 7, 30), 1), 0.57650273);
        assert_approx(yearfrac(date(2011, 7, 1), date(2012, 3, 1), 1), 244.0 / 366.0);
        assert_approx(yearfrac(date(2010, 7, 1), date(2011, 3, 1), 1), 243.0 / 365.0);
        let span = (date(2015, 4, 20) - date(2008, 1, 1)) as f64;
        let average = (365.0 * 6.0 + 366.0 * 2.0) / 8.0;
        assert_approx(yearfrac(date(2008, 1, 1), date(2015, 4, 20), 1), span / average);
    }

    #[test]
    fn test_yearfrac_basis_2_3_4() {
        assert_approx(yearfrac(date(2008, 1, 1), date(2015, 4, 20), 2), 7.405555556);
        assert_approx(yearfrac(date(2024, 1, 1), date(2025, 1, 1), 2), 1.01666666666667);
        assert_approx(yearfrac(date(2012, 1, 1), date(2012, 7, 30), 3), 0.57808219);
        assert_approx(yearfrac(date(2008, 1, 1), date(2015, 4, 20), 3), 7.304109589);
        assert_approx(yearfrac(date(2024, 1, 1), date(2025, 1, 1), 3), 1.0027397260274);
        assert_approx(yearfrac(date(2008, 1, 1), date(2015, 4, 20), 4), 7.302777778);
        assert_approx(yearfrac(date(2024, 1, 1), date(2025, 1, 1), 4), 1.0);
        assert_approx(yearfrac(date(2011, 1, 31), date(2011, 3, 31), 4), 60.0 / 360.0);
    }

    #[test]
    fn test_yearfrac_rejects_negative() {
        let err = year_fraction(-1.0, 0.0, Basis::Us30360).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        let err = year_fraction(0.0, -1.0, Basis::Us30360).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn test_yearfrac_inverted() {
        for basis in 0..=4 {
            assert_approx(
                yearfrac(date(2015, 4, 20), date(2008, 1, 1), basis),
                yearfrac(date(2008, 1, 1), date(2015, 4, 20), basis),
            );
        }
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(y in 1900i64..9999, m in 1i64..=12, d in 1i64..=31) {
            let dim = days_in_month(y, m as u32);
            prop_assume!(d <= dim);
            let serial = encode(y, m, d).unwrap();
            prop_assert_eq!(decode(serial).unwrap(), (y, m as u32, d as u32));
        }

        #[test]
        fn prop_encode_inverts_decode(serial in 1i64..MAX_SERIAL - 366) {
            let (y, m, d) = decode(serial).unwrap();
            prop_assert_eq!(encode(y, m as i64, d as i64).unwrap(), serial);
        }

        #[test]
        fn prop_yearfrac_symmetric(a in 0i64..=MAX_SERIAL, b in 0i64..=MAX_SERIAL, basis in 0i64..=4) {
            let basis = Basis::try_from(basis).unwrap();
            let forward = year_fraction(a as f64, b as f64, basis).unwrap();
            let backward = year_fraction(b as f64, a as f64, basis).unwrap();
            prop_assert_eq!(forward, backward);
            prop_assert!(forward >= 0.0);
        }
    }
}
