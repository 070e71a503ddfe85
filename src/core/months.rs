//! Calendar helpers: `YearMonth`, the inclusive `MonthRange` iterator and half-open
//! `DateInterval`s used for imagery queries.
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Half-open date interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidArgument {
                arg: "interval",
                value: format!("[{start}, {end})"),
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A calendar month. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let invalid = || Error::InvalidArgument {
            arg: "month",
            value: format!("{year}-{month:02}"),
        };
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        // The following month must also be representable for interval()
        first_day
            .checked_add_months(Months::new(1))
            .ok_or_else(invalid)?;
        Ok(Self { first_day })
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// `[first day, first day of next month)`
    pub fn interval(&self) -> DateInterval {
        let end = self
            .first_day
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        DateInterval {
            start: self.first_day,
            end,
        }
    }

    pub fn succ(&self) -> Option<YearMonth> {
        let next = self.first_day.checked_add_months(Months::new(1))?;
        YearMonth::new(next.year(), next.month()).ok()
    }

    pub fn abbr(&self) -> &'static str {
        MONTH_ABBR[self.first_day.month0() as usize]
    }

    /// Human label, e.g. `May 2024`
    pub fn label(&self) -> String {
        format!("{} {}", self.abbr(), self.year())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year(), self.month())
    }
}

/// The month containing `date`.
impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        let first_day = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
        Self { first_day }
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument {
            arg: "month",
            value: s.to_string(),
        };
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = y.parse::<i32>().map_err(|_| invalid())?;
        let month = m.parse::<u32>().map_err(|_| invalid())?;
        YearMonth::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Inclusive, chronological iteration over `[start, end]`.
#[derive(Debug, Clone)]
pub struct MonthRange {
    next: Option<YearMonth>,
    end: YearMonth,
}

impl MonthRange {
    pub fn new(start: YearMonth, end: YearMonth) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidArgument {
                arg: "month_range",
                value: format!("{start}..{end}"),
            });
        }
        Ok(Self {
            next: Some(start),
            end,
        })
    }

    fn remaining(&self) -> usize {
        match self.next {
            Some(next) => {
                let months = (self.end.year() - next.year()) as i64 * 12
                    + self.end.month() as i64
                    - next.month() as i64
                    + 1;
                months.max(0) as usize
            }
            None => 0,
        }
    }
}

impl Iterator for MonthRange {
    type Item = YearMonth;

    fn next(&mut self) -> Option<YearMonth> {
        let current = self.next?;
        self.next = if current < self.end {
            current.succ()
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for MonthRange {}
