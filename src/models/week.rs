//! ISO week keys
//!
//! Every series in the engine is bucketed by ISO week (Monday start). The
//! textual form `YYYY-W##` is shared with external reports, so formatting and
//! parsing must stay bit-exact.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::SurveillanceError;

/// One ISO week, identified by its Monday
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekKey {
    monday: NaiveDate,
}

impl WeekKey {
    /// Create a week key from an ISO year and week number
    pub fn new(iso_year: i32, week: u32) -> Result<Self, SurveillanceError> {
        NaiveDate::from_isoywd_opt(iso_year, week, Weekday::Mon)
            .map(|monday| Self { monday })
            .ok_or_else(|| SurveillanceError::InvalidWeekKey(format!("{iso_year}-W{week:02}")))
    }

    /// The week containing `date`
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        let offset = i64::from(date.weekday().num_days_from_monday());
        Self {
            monday: date - Duration::days(offset),
        }
    }

    /// Monday of this week
    #[must_use]
    pub const fn monday(self) -> NaiveDate {
        self.monday
    }

    /// ISO week-numbering year (may differ from the calendar year of the Monday)
    #[must_use]
    pub fn iso_year(self) -> i32 {
        self.monday.iso_week().year()
    }

    /// ISO week number, 1..=53
    #[must_use]
    pub fn week(self) -> u32 {
        self.monday.iso_week().week()
    }

    /// The following week
    #[must_use]
    pub fn next(self) -> Self {
        Self {
            monday: self.monday + Duration::days(7),
        }
    }

    /// Number of weeks from `self` to `other` (negative when `other` is earlier)
    #[must_use]
    pub fn weeks_until(self, other: Self) -> i64 {
        (other.monday - self.monday).num_days() / 7
    }

    /// Iterate every week from `self` to `last`, both inclusive
    pub fn through(self, last: Self) -> impl Iterator<Item = WeekKey> {
        std::iter::successors(Some(self), move |week| {
            let next = week.next();
            (next <= last).then_some(next)
        })
        .take_while(move |week| *week <= last)
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let iso = self.monday.iso_week();
        write!(f, "{:04}-W{:02}", iso.year(), iso.week())
    }
}

impl FromStr for WeekKey {
    type Err = SurveillanceError;

    /// Parse `YYYY-W##`. The week number must be zero-padded to two digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SurveillanceError::InvalidWeekKey(s.to_string());

        let (year, week) = s.split_once("-W").ok_or_else(invalid)?;
        if year.len() != 4 || week.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(week.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let week = week.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, week).map_err(|_| invalid())
    }
}

impl TryFrom<String> for WeekKey {
    type Error = SurveillanceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekKey> for String {
    fn from(week: WeekKey) -> Self {
        week.to_string()
    }
}
