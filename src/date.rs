use std::num::{NonZeroU8, NonZeroU16};
use std::str::FromStr;

use crate::consts::{
    CENTURY_CYCLE, DATE_SEPARATOR, DAYS_IN_MONTH, FEBRUARY, FEBRUARY_DAYS_LEAP, GREGORIAN_CYCLE,
    LEAP_YEAR_CYCLE, MAX_MONTH, MAX_YEAR, TIME_SEPARATOR,
};
use crate::prelude::*;

/// Calendar date of a trek day.
///
/// Always a full `YYYY-MM-DD` date; fields are validated on construction so a
/// `TrekDate` can never name February 30th. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{:04}-{:02}-{:02}", "year.get()", "month.get()", "day.get()")]
pub struct TrekDate {
    year:  NonZeroU16,
    month: NonZeroU8,
    day:   NonZeroU8,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DateError {
    #[display(fmt = "Invalid date format: {_0}")]
    InvalidFormat(String),
    #[display(fmt = "Invalid year: {} (must be 1-{})", "_0", MAX_YEAR)]
    InvalidYear(u16),
    #[display(fmt = "Invalid month: {} (must be 1-{})", "_0", MAX_MONTH)]
    InvalidMonth(u8),
    #[display(fmt = "Invalid day {day} for month {year}-{month:02}")]
    InvalidDay { year: u16, month: u8, day: u8 },
    #[display(fmt = "Empty date string")]
    EmptyInput,
}

impl std::error::Error for DateError {}

impl TrekDate {
    /// Creates a date, validating each component against the calendar.
    ///
    /// # Errors
    /// Returns `DateError::InvalidYear`, `InvalidMonth` or `InvalidDay` for the
    /// first component that is out of range.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, DateError> {
        let year_nz = NonZeroU16::new(year)
            .filter(|_| year <= MAX_YEAR)
            .ok_or(DateError::InvalidYear(year))?;
        let month_nz = NonZeroU8::new(month)
            .filter(|_| month <= MAX_MONTH)
            .ok_or(DateError::InvalidMonth(month))?;
        let day_nz = NonZeroU8::new(day)
            .filter(|_| day <= days_in_month(year, month))
            .ok_or(DateError::InvalidDay { year, month, day })?;

        Ok(Self {
            year:  year_nz,
            month: month_nz,
            day:   day_nz,
        })
    }

    #[inline]
    pub const fn year(&self) -> u16 {
        self.year.get()
    }

    #[inline]
    pub const fn month(&self) -> u8 {
        self.month.get()
    }

    #[inline]
    pub const fn day(&self) -> u8 {
        self.day.get()
    }

    /// Components as a `(year, month, day)` tuple
    pub const fn to_tuple(&self) -> (u16, u8, u8) {
        (self.year(), self.month(), self.day())
    }

    fn parse_component<T: FromStr>(s: &str) -> Result<T, DateError> {
        s.parse::<T>()
            .map_err(|_| DateError::InvalidFormat(s.to_owned()))
    }
}

impl FromStr for TrekDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DateError::EmptyInput);
        }

        // Timestamps from the host platform carry a time part we don't need
        let date_part = trimmed
            .split_once(TIME_SEPARATOR)
            .map_or(trimmed, |(date, _)| date);

        let parts: Vec<&str> = date_part.split(DATE_SEPARATOR).collect();
        let [year, month, day] = parts.as_slice() else {
            return Err(DateError::InvalidFormat(format!(
                "Expected YYYY{DATE_SEPARATOR}MM{DATE_SEPARATOR}DD, got {trimmed}"
            )));
        };

        Self::new(
            Self::parse_component(year)?,
            Self::parse_component(month)?,
            Self::parse_component(day)?,
        )
    }
}

impl TryFrom<(u16, u8, u8)> for TrekDate {
    type Error = DateError;

    fn try_from((year, month, day): (u16, u8, u8)) -> Result<Self, Self::Error> {
        Self::new(year, month, day)
    }
}

impl serde::Serialize for TrekDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for TrekDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

pub const fn is_leap_year(year: u16) -> bool {
    (year % LEAP_YEAR_CYCLE == 0 && year % CENTURY_CYCLE != 0) || (year % GREGORIAN_CYCLE == 0)
}

/// Number of days in `month` of `year`; 0 for a month outside 1..=12.
pub const fn days_in_month(year: u16, month: u8) -> u8 {
    if month == 0 || month > MAX_MONTH {
        0
    } else if month == FEBRUARY && is_leap_year(year) {
        FEBRUARY_DAYS_LEAP
    } else {
        DAYS_IN_MONTH[month as usize]
    }
}
