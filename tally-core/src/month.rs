//! Reporting-month utilities.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A single calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        // Validates the pair via chrono so the first/last day are always representable.
        NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Number of calendar days in the month
    pub fn days(&self) -> u32 {
        self.last_day().day()
    }

    /// Inclusive of the first and last day
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    /// Parse "2025-11" (a full "2025-11-01" is accepted too).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::config(format!("invalid month {s:?}, expected YYYY-MM"));

        let mut it = s.splitn(3, '-');
        let year: i32 = it.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
        let month: u32 = it.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
        if let Some(day) = it.next() {
            let day: u32 = day.parse().map_err(|_| invalid())?;
            NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
        }
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let m: YearMonth = "2025-11".parse().unwrap();
        assert_eq!(m, YearMonth::new(2025, 11).unwrap());
        assert_eq!(m.to_string(), "2025-11");

        let full: YearMonth = "2025-02-01".parse().unwrap();
        assert_eq!(full.to_string(), "2025-02");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("2025".parse::<YearMonth>().is_err());
        assert!("nov-2025".parse::<YearMonth>().is_err());
        assert!("2025-02-30".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_bounds() {
        let feb_leap = YearMonth::new(2024, 2).unwrap();
        assert_eq!(feb_leap.last_day(), ymd(2024, 2, 29));
        assert_eq!(feb_leap.days(), 29);

        let dec = YearMonth::new(2025, 12).unwrap();
        assert_eq!(dec.first_day(), ymd(2025, 12, 1));
        assert_eq!(dec.last_day(), ymd(2025, 12, 31));
        assert_eq!(dec.next(), YearMonth::new(2026, 1).unwrap());
    }

    #[test]
    fn test_contains_edges() {
        let nov = YearMonth::new(2025, 11).unwrap();
        assert!(nov.contains(ymd(2025, 11, 1)));
        assert!(nov.contains(ymd(2025, 11, 30)));
        assert!(!nov.contains(ymd(2025, 12, 1)));
        assert!(!nov.contains(ymd(2025, 10, 31)));
        assert!(!nov.contains(ymd(2024, 11, 15)));
    }
}
