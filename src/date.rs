//! Fractional-year dates.
//!
//! A [`FractionalDate`] is a `(year, day-of-year)` pair with arithmetic in
//! fractional-year units. It is not a calendar: adding `1.0` years adds 365
//! days, whatever the calendar date ends up being.
//!
//! Two arithmetic rules coexist and both are load-bearing:
//!
//! - `add` / `subtract` convert years to whole days (`round(t * 365)`) and
//!   carry across year boundaries using each year's real length (365 or 366).
//! - `difference_in_years` measures the distance between two dates with a
//!   flat 365-day year.
//!
//! The default comparison window (1.025 years) and the 1.5-year gap test are
//! tuned against exactly this pair of rules.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// Days per year used when converting fractional years to days.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Returns `true` if `year` is a Gregorian leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `year` (365 or 366).
pub fn days_in_year(year: i32) -> i64 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Returns `true` if `s` has the shape `M/D/YYYY` (one or two digit month and
/// day, four digit year). Says nothing about whether the date exists.
pub fn looks_like_calendar_date(s: &str) -> bool {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 3 {
        return false;
    }

    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());

    all_digits(parts[0])
        && parts[0].len() <= 2
        && all_digits(parts[1])
        && parts[1].len() <= 2
        && all_digits(parts[2])
        && parts[2].len() == 4
}

/// A leap-aware `(year, day-of-year)` date.
///
/// `day_of_year` is 0-based and always within `[0, days_in_year(year))`.
/// Ordering is lexicographic on `(year, day_of_year)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FractionalDate {
    year: i32,
    day_of_year: u32,
}

impl FractionalDate {
    /// Builds a date from a year and a (possibly out of range) day offset,
    /// carrying whole years until the day falls inside its year.
    pub fn new(year: i32, day_of_year: i64) -> Self {
        let mut year = year;
        let mut day = day_of_year;

        while day >= days_in_year(year) {
            day -= days_in_year(year);
            year += 1;
        }

        while day < 0 {
            year -= 1;
            day += days_in_year(year);
        }

        Self {
            year,
            day_of_year: day as u32,
        }
    }

    /// The first day of `year`.
    pub fn from_year(year: i32) -> Self {
        Self::new(year, 0)
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            day_of_year: date.ordinal0(),
        }
    }

    /// Parses a `month/day/year` string such as `6/1/2020` or `06/01/2020`.
    ///
    /// # Errors
    ///
    /// [`ParseError::InvalidFormat`] if the string does not have that shape,
    /// [`ParseError::InvalidDate`] if it names a day that does not exist.
    pub fn from_calendar_string(s: &str) -> Result<Self, ParseError> {
        let trimmed = s.trim();
        if !looks_like_calendar_date(trimmed) {
            return Err(ParseError::InvalidFormat(s.to_string()));
        }

        let mut parts = trimmed.split('/');
        let mut next = || -> Result<u32, ParseError> {
            parts
                .next()
                .and_then(|p| p.parse::<u32>().ok())
                .ok_or_else(|| ParseError::InvalidFormat(s.to_string()))
        };

        let month = next()?;
        let day = next()?;
        let year = next()? as i32;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::from_naive)
            .ok_or_else(|| ParseError::InvalidDate(s.to_string()))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn day_of_year(&self) -> u32 {
        self.day_of_year
    }

    pub fn is_leap_year(&self) -> bool {
        is_leap_year(self.year)
    }

    /// `year + day_of_year / days_in_year`. Monotonic in chronological order.
    pub fn to_fraction(&self) -> f64 {
        self.year as f64 + self.day_of_year as f64 / days_in_year(self.year) as f64
    }

    /// Moves forward by `years`, rounded to whole days of a 365-day year.
    pub fn add(&self, years: f64) -> Self {
        let days = (years * DAYS_PER_YEAR).round() as i64;
        Self::new(self.year, self.day_of_year as i64 + days)
    }

    /// Moves backward by `years`, rounded to whole days of a 365-day year.
    pub fn subtract(&self, years: f64) -> Self {
        let days = (years * DAYS_PER_YEAR).round() as i64;
        Self::new(self.year, self.day_of_year as i64 - days)
    }

    /// `self - other` in years, counting every year as 365 days.
    pub fn difference_in_years(&self, other: &FractionalDate) -> f64 {
        let days = (self.year as i64 - other.year as i64) * 365
            + (self.day_of_year as i64 - other.day_of_year as i64);
        days as f64 / DAYS_PER_YEAR
    }

    pub fn compare(&self, other: &FractionalDate) -> Ordering {
        self.cmp(other)
    }

    fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_yo_opt(self.year, self.day_of_year + 1)
    }
}

impl fmt::Display for FractionalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_naive() {
            Some(date) => write!(f, "{}", date.format("%m/%d/%Y")),
            None => write!(f, "{}+{}d", self.year, self.day_of_year),
        }
    }
}

impl FromStr for FractionalDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_calendar_string(s)
    }
}

impl Serialize for FractionalDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FractionalDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_calendar_string() {
        let date = FractionalDate::from_calendar_string("6/1/2020").unwrap();
        assert_eq!(date.year(), 2020);
        assert_eq!(date.day_of_year(), 152);

        let padded = FractionalDate::from_calendar_string("06/01/2019").unwrap();
        assert_eq!(padded.day_of_year(), 151);
    }

    #[test]
    fn test_parse_rejects_bad_shape() {
        assert_eq!(
            FractionalDate::from_calendar_string("2020-06-01"),
            Err(ParseError::InvalidFormat("2020-06-01".to_string()))
        );
        assert!(FractionalDate::from_calendar_string("6/1/20").is_err());
        assert!(FractionalDate::from_calendar_string("").is_err());
    }

    #[test]
    fn test_parse_rejects_impossible_dates() {
        assert_eq!(
            FractionalDate::from_calendar_string("2/29/2019"),
            Err(ParseError::InvalidDate("2/29/2019".to_string()))
        );
        assert!(FractionalDate::from_calendar_string("13/1/2020").is_err());
        assert!(FractionalDate::from_calendar_string("2/29/2020").is_ok());
    }

    #[test]
    fn test_looks_like_calendar_date() {
        assert!(looks_like_calendar_date("1/2/2003"));
        assert!(looks_like_calendar_date("12/31/1999"));
        assert!(!looks_like_calendar_date("123/1/2003"));
        assert!(!looks_like_calendar_date("Attendance"));
        assert!(!looks_like_calendar_date("2003"));
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2020));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2021));
    }

    #[test]
    fn test_to_fraction_uses_year_length() {
        assert_eq!(FractionalDate::new(2021, 73).to_fraction(), 2021.0 + 73.0 / 365.0);
        assert_eq!(FractionalDate::new(2020, 183).to_fraction(), 2020.5);
    }

    #[test]
    fn test_new_normalizes_day() {
        assert_eq!(FractionalDate::new(2020, 366), FractionalDate::new(2021, 0));
        assert_eq!(FractionalDate::new(2021, -1), FractionalDate::new(2020, 365));
        assert_eq!(FractionalDate::new(2019, 365 + 366), FractionalDate::new(2021, 0));
    }

    #[test]
    fn test_add_then_subtract_round_trips() {
        for (year, day) in [(2019, 0), (2019, 364), (2020, 59), (2020, 365), (2023, 200)] {
            let date = FractionalDate::new(year, day);
            assert_eq!(date.add(1.0).subtract(1.0), date);
            assert_eq!(date.add(2.5).subtract(2.5), date);
        }
    }

    #[test]
    fn test_leap_day_advances_by_day_count() {
        // Feb 29 2020 + 365 days lands on Feb 28 2021
        let leap_day = FractionalDate::from_calendar_string("2/29/2020").unwrap();
        assert_eq!(leap_day.day_of_year(), 59);
        assert_eq!(leap_day.add(1.0), FractionalDate::new(2021, 58));

        // Mar 1 2023 + 365 days lands on Feb 29 2024
        let before_leap = FractionalDate::new(2023, 59);
        assert_eq!(before_leap.add(1.0), FractionalDate::new(2024, 59));
    }

    #[test]
    fn test_default_window_is_374_days() {
        let date = FractionalDate::from_calendar_string("6/1/2020").unwrap();
        assert_eq!(date.subtract(1.025), FractionalDate::new(2019, 143));
    }

    #[test]
    fn test_difference_uses_flat_year() {
        let a = FractionalDate::new(2021, 0);
        let b = FractionalDate::new(2020, 0);
        assert_eq!(a.difference_in_years(&b), 1.0);

        // 366 real days apart, but still measured against 365
        let c = FractionalDate::new(2020, 365);
        assert_eq!(c.difference_in_years(&b), 1.0);
        assert_eq!(b.difference_in_years(&a), -1.0);
    }

    #[test]
    fn test_ordering() {
        let a = FractionalDate::new(2019, 300);
        let b = FractionalDate::new(2020, 1);
        assert!(a < b);
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(b.compare(&a), Ordering::Greater);
        assert_eq!(a.compare(&a), Ordering::Equal);
    }

    #[test]
    fn test_display_and_serde() {
        let date = FractionalDate::from_calendar_string("3/1/2020").unwrap();
        assert_eq!(date.to_string(), "03/01/2020");

        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"03/01/2020\"");
        let back: FractionalDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
    }
}
