//! Plain solar and lunar dates.
//!
//! These types carry no calendar state; whether a date actually exists is
//! decided by [`Engine`](crate::lunar::Engine) against the lunar table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A Gregorian (solar) calendar date.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SolarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl SolarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Formats the date in ISO 8601 format.
    ///
    /// # Example
    ///
    /// ```
    /// use eumnyeok::SolarDate;
    ///
    /// assert_eq!("2021-09-08", SolarDate::new(2021, 9, 8).iso());
    /// ```
    pub fn iso(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Display for SolarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iso())
    }
}

/// A Korean lunar calendar date.
///
/// `intercalation` marks a date in the intercalation (leap) month that
/// follows the ordinary month with the same number.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LunarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub intercalation: bool,
}

impl LunarDate {
    pub fn new(year: i32, month: u32, day: u32, intercalation: bool) -> Self {
        Self {
            year,
            month,
            day,
            intercalation,
        }
    }

    /// Formats the date as `YYYY-MM-DD`, suffixed with ` Intercalation` for a
    /// date in an intercalation month.
    ///
    /// # Example
    ///
    /// ```
    /// use eumnyeok::LunarDate;
    ///
    /// assert_eq!("2017-05-01 Intercalation", LunarDate::new(2017, 5, 1, true).iso());
    /// assert_eq!("2019-12-07", LunarDate::new(2019, 12, 7, false).iso());
    /// ```
    pub fn iso(&self) -> String {
        let suffix = if self.intercalation {
            " Intercalation"
        } else {
            ""
        };
        format!(
            "{:04}-{:02}-{:02}{}",
            self.year, self.month, self.day, suffix
        )
    }
}

impl fmt::Display for LunarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iso())
    }
}

/// Indicates whether a year is a leap year or common year.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum YearType {
    Common,
    Leap,
}

impl YearType {
    /// Determines if `year` is a leap year in (proleptic) Gregorian calendar.
    pub fn from_gregorian(year: i32) -> Self {
        if year % 4 == 0 && year % 100 != 0 || year % 400 == 0 {
            Self::Leap
        } else {
            Self::Common
        }
    }
    /// Returns `true` if `self` is `Leap`, otherwise `false`.
    pub fn is_leap(&self) -> bool {
        matches!(self, YearType::Leap)
    }
}

impl From<bool> for YearType {
    fn from(leap: bool) -> Self {
        if leap { Self::Leap } else { Self::Common }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_type() {
        use YearType::*;
        for (std, year) in [
            (Leap, 2000),
            (Common, 1900),
            (Leap, 2024),
            (Common, 2023),
            (Common, 1100),
            (Leap, 1200),
            (Common, 1582),
        ] {
            assert_eq!(std, YearType::from_gregorian(year), "{year}");
        }
    }

    #[test]
    fn iso_format() {
        assert_eq!("1000-02-13", SolarDate::new(1000, 2, 13).to_string());
        assert_eq!("2020-04-15", LunarDate::new(2020, 4, 15, false).to_string());
        assert_eq!(
            "2020-04-15 Intercalation",
            LunarDate::new(2020, 4, 15, true).to_string()
        );
    }

    #[test]
    fn solar_ordering() {
        assert!(SolarDate::new(2023, 12, 31) < SolarDate::new(2024, 1, 1));
        assert!(SolarDate::new(2024, 2, 10) < SolarDate::new(2024, 2, 11));
    }
}
