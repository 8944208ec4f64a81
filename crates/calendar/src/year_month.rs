//! Year-month value type.

use std::fmt;

use chrono::Datelike;
use serde::{Serialize, Serializer};

use crate::error::CalendarError;

/// Three-letter month labels (index 0 = January).
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Number of days in each month of a common year (index 0 unused).
const DAYS_PER_MONTH: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Returns `true` if `year` is a leap year in the proleptic Gregorian calendar.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `(year, month)`.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidMonth`] if `month` is outside 1..=12.
pub fn days_in_month(year: i32, month: u8) -> Result<u8, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidMonth { month });
    }
    if month == 2 && is_leap_year(year) {
        Ok(29)
    } else {
        Ok(DAYS_PER_MONTH[month as usize])
    }
}

/// Three-letter label for a month number.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidMonth`] if `month` is outside 1..=12.
pub fn month_label(month: u8) -> Result<&'static str, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidMonth { month });
    }
    Ok(MONTH_LABELS[month as usize - 1])
}

/// A calendar month with year context.
///
/// Ordered chronologically. Displays and serializes as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u8,
}

impl YearMonth {
    /// Creates a new `YearMonth`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidMonth`] if `month` is outside 1..=12.
    pub fn new(year: i32, month: u8) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth { month });
        }
        Ok(Self { year, month })
    }

    /// Truncates any chrono date or datetime to its month.
    pub fn from_date<D: Datelike>(date: &D) -> Self {
        // chrono guarantees month() is in 1..=12
        Self {
            year: date.year(),
            month: date.month() as u8,
        }
    }

    /// Parses a `YYYYMM` tag such as the one embedded in operational file names.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidTag`] if `tag` is not six ASCII digits
    /// with a month in 1..=12.
    pub fn parse_tag(tag: &str) -> Result<Self, CalendarError> {
        let invalid = || CalendarError::InvalidTag {
            tag: tag.to_string(),
        };
        if tag.len() != 6 || !tag.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = tag[..4].parse().map_err(|_| invalid())?;
        let month: u8 = tag[4..].parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    /// Formats as a `YYYYMM` tag.
    pub fn tag(self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }

    /// Returns the year.
    pub fn year(self) -> i32 {
        self.year
    }

    /// Returns the month (1..=12).
    pub fn month(self) -> u8 {
        self.month
    }

    /// Three-letter label of this month.
    pub fn label(self) -> &'static str {
        MONTH_LABELS[self.month as usize - 1]
    }

    /// Advances by `months` whole months, wrapping the year at December.
    pub fn add_months(self, months: u32) -> Self {
        let index = self.year as i64 * 12 + (self.month as i64 - 1) + months as i64;
        Self {
            year: index.div_euclid(12) as i32,
            month: (index.rem_euclid(12) + 1) as u8,
        }
    }

    /// Number of days in this month.
    pub fn days_in_month(self) -> u8 {
        if self.month == 2 && is_leap_year(self.year) {
            29
        } else {
            DAYS_PER_MONTH[self.month as usize]
        }
    }

    /// Number of seconds in this month.
    pub fn seconds_in_month(self) -> f64 {
        f64::from(self.days_in_month()) * SECONDS_PER_DAY
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn new_valid() {
        let ym = YearMonth::new(2000, 1).unwrap();
        assert_eq!(ym.year(), 2000);
        assert_eq!(ym.month(), 1);
    }

    #[test]
    fn new_invalid_month() {
        assert_eq!(
            YearMonth::new(2000, 0).unwrap_err(),
            CalendarError::InvalidMonth { month: 0 }
        );
        assert_eq!(
            YearMonth::new(2000, 13).unwrap_err(),
            CalendarError::InvalidMonth { month: 13 }
        );
    }

    #[test]
    fn from_date_truncates_day() {
        let d = NaiveDate::from_ymd_opt(1993, 7, 16).unwrap();
        assert_eq!(YearMonth::from_date(&d), YearMonth::new(1993, 7).unwrap());
    }

    #[test]
    fn add_months_within_year() {
        let ym = YearMonth::new(2000, 3).unwrap();
        assert_eq!(ym.add_months(4), YearMonth::new(2000, 7).unwrap());
    }

    #[test]
    fn add_months_wraps_december() {
        let ym = YearMonth::new(2000, 12).unwrap();
        assert_eq!(ym.add_months(1), YearMonth::new(2001, 1).unwrap());
        assert_eq!(ym.add_months(6), YearMonth::new(2001, 6).unwrap());
    }

    #[test]
    fn add_months_zero_is_identity() {
        let ym = YearMonth::new(2010, 8).unwrap();
        assert_eq!(ym.add_months(0), ym);
    }

    #[test]
    fn add_months_multiple_years() {
        let ym = YearMonth::new(1999, 11).unwrap();
        assert_eq!(ym.add_months(26), YearMonth::new(2002, 1).unwrap());
    }

    #[test]
    fn february_leap_years() {
        assert_eq!(YearMonth::new(2016, 2).unwrap().days_in_month(), 29);
        assert_eq!(YearMonth::new(2015, 2).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(1900, 2).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(2000, 2).unwrap().days_in_month(), 29);
    }

    #[test]
    fn seconds_in_thirty_day_month() {
        let april = YearMonth::new(2001, 4).unwrap();
        assert_eq!(april.seconds_in_month(), 30.0 * 86_400.0);
    }

    #[test]
    fn days_in_month_free_function() {
        assert_eq!(days_in_month(2001, 4).unwrap(), 30);
        assert_eq!(days_in_month(2004, 2).unwrap(), 29);
        assert!(days_in_month(2004, 0).is_err());
    }

    #[test]
    fn parse_tag_valid() {
        let ym = YearMonth::parse_tag("202512").unwrap();
        assert_eq!(ym, YearMonth::new(2025, 12).unwrap());
        assert_eq!(ym.tag(), "202512");
    }

    #[test]
    fn parse_tag_rejects_bad_input() {
        for bad in ["", "2025", "2025121", "2025-1", "202513", "202500", "abcdef"] {
            assert!(YearMonth::parse_tag(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn ordering_is_chronological() {
        let a = YearMonth::new(2024, 12).unwrap();
        let b = YearMonth::new(2025, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn labels() {
        assert_eq!(YearMonth::new(2000, 1).unwrap().label(), "Jan");
        assert_eq!(YearMonth::new(2000, 12).unwrap().label(), "Dec");
        assert_eq!(month_label(6).unwrap(), "Jun");
        assert!(month_label(13).is_err());
    }

    #[test]
    fn display_and_serialize() {
        let ym = YearMonth::new(2026, 3).unwrap();
        assert_eq!(ym.to_string(), "2026-03");
        assert_eq!(serde_json::to_string(&ym).unwrap(), "\"2026-03\"");
    }
}
