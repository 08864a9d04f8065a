//! Validated calendar-month identifier used to scope paid status.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies a calendar month as `YYYY-MM`.
///
/// Keys into an expense's payment history are format-checked rather than
/// free-form strings, so a stored key either parses into one of these or is
/// skipped at the load boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid month key `{0}`, expected YYYY-MM")]
pub struct MonthKeyError(String);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthKeyError> {
        if !(0..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(MonthKeyError(format!("{year}-{month}")));
        }
        Ok(Self { year, month })
    }

    /// Returns the key for the month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
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

    /// First calendar day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("validated month key")
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || MonthKeyError(value.to_string());
        let (year_part, month_part) = value.split_once('-').ok_or_else(invalid)?;
        if year_part.len() != 4 || month_part.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let month: u32 = month_part.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for MonthKey {
    type Error = MonthKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}
