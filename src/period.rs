// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar helpers for settlement periods.
//!
//! Every date in the crate is a `NaiveDate` built from calendar fields.
//! Nothing here goes through a timestamp or a UTC offset, so a freight issued
//! on the 31st stays on the 31st regardless of the host timezone.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{HaulError, Result};

const DISPLAY_FMT: &str = "%d/%m/%Y";
const ISO_FMT: &str = "%Y-%m-%d";

static MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(\d{1,2})/(\d{4})|(\d{4})-(\d{1,2}))\s*$").expect("month regex")
});

static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(\d{2}/\d{2}/\d{4}|\d{4}-\d{2}-\d{2})\s*(?:-|–|to|a)\s*(\d{2}/\d{2}/\d{4}|\d{4}-\d{2}-\d{2})\s*$",
    )
    .expect("range regex")
});

/// Parses `YYYY-MM-DD` or `DD/MM/YYYY`.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, ISO_FMT)
        .or_else(|_| NaiveDate::parse_from_str(s, DISPLAY_FMT))
        .map_err(|_| {
            HaulError::invalid(format!(
                "Invalid date '{}', expected YYYY-MM-DD or DD/MM/YYYY",
                s
            ))
        })
}

/// `MM/YYYY` of the calendar month the date falls in.
pub fn period_of(date: NaiveDate) -> String {
    format!("{:02}/{}", date.month(), date.year())
}

pub fn extract_period(date: &str) -> Result<String> {
    Ok(period_of(parse_date(date)?))
}

pub fn days_in_month(month: u32, year: i32) -> Result<u32> {
    Ok(month_bounds(month, year)?.1.day())
}

/// First and last day of a calendar month.
pub fn month_bounds(month: u32, year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| HaulError::invalid(format!("Invalid month {:02}/{}", month, year)))?;
    let (next_y, next_m) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let last = NaiveDate::from_ymd_opt(next_y, next_m, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| HaulError::invalid(format!("Month {:02}/{} out of range", month, year)))?;
    Ok((first, last))
}

pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FMT).to_string()
}

/// Today on the host's local calendar.
pub fn current_date() -> NaiveDate {
    Local::now().date_naive()
}

/// The time span a settlement covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Period {
    Month { month: u32, year: i32 },
    Range { start: NaiveDate, end: NaiveDate },
}

impl Period {
    pub fn month(month: u32, year: i32) -> Result<Self> {
        month_bounds(month, year)?;
        Ok(Period::Month { month, year })
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(HaulError::invalid(format!(
                "Range start {} is after end {}",
                format_display_date(start),
                format_display_date(end)
            )));
        }
        Ok(Period::Range { start, end })
    }

    /// Inclusive date bounds.
    pub fn bounds(&self) -> Result<(NaiveDate, NaiveDate)> {
        match *self {
            Period::Month { month, year } => month_bounds(month, year),
            Period::Range { start, end } => Ok((start, end)),
        }
    }

    pub fn is_calendar_month(&self) -> bool {
        matches!(self, Period::Month { .. })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Month { month, year } => write!(f, "{:02}/{}", month, year),
            Period::Range { start, end } => write!(
                f,
                "{} - {}",
                format_display_date(*start),
                format_display_date(*end)
            ),
        }
    }
}

impl FromStr for Period {
    type Err = HaulError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(c) = MONTH_RE.captures(s) {
            let (m, y) = match (c.get(1), c.get(2)) {
                (Some(m), Some(y)) => (m.as_str(), y.as_str()),
                _ => (&c[4], &c[3]),
            };
            let month: u32 = m
                .parse()
                .map_err(|_| HaulError::invalid(format!("Invalid month '{}'", s)))?;
            let year: i32 = y
                .parse()
                .map_err(|_| HaulError::invalid(format!("Invalid year '{}'", s)))?;
            return Period::month(month, year);
        }
        if let Some(c) = RANGE_RE.captures(s) {
            return Period::range(parse_date(&c[1])?, parse_date(&c[2])?);
        }
        Err(HaulError::invalid(format!(
            "Invalid period '{}', expected MM/YYYY or DD/MM/YYYY - DD/MM/YYYY",
            s.trim()
        )))
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        p.to_string()
    }
}

impl TryFrom<String> for Period {
    type Error = HaulError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// How the settlements screen selects what to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementFilter {
    /// Persisted settlements of one calendar month.
    ByMonth { month: u32, year: i32 },
    /// Real-time figures for every active driver; never persisted.
    ByDateRange { start: NaiveDate, end: NaiveDate },
    /// Every persisted settlement of one driver.
    ByDriver { driver_id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn leap_february() {
        assert_eq!(month_bounds(2, 2024).unwrap(), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(month_bounds(2, 2023).unwrap().1, d(2023, 2, 28));
        assert_eq!(days_in_month(2, 1900).unwrap(), 28);
        assert_eq!(days_in_month(2, 2000).unwrap(), 29);
    }

    #[test]
    fn thirty_and_thirty_one() {
        assert_eq!(days_in_month(4, 2024).unwrap(), 30);
        assert_eq!(days_in_month(12, 2024).unwrap(), 31);
        assert_eq!(month_bounds(12, 2024).unwrap().1, d(2024, 12, 31));
    }

    #[test]
    fn month_thirteen_rejected() {
        assert!(matches!(
            month_bounds(13, 2024),
            Err(HaulError::InvalidInput(_))
        ));
        assert!(month_bounds(0, 2024).is_err());
    }

    #[test]
    fn extract_period_keeps_last_day_of_month() {
        assert_eq!(extract_period("2024-01-31").unwrap(), "01/2024");
        assert_eq!(extract_period("31/12/2023").unwrap(), "12/2023");
        assert_eq!(extract_period("2024-03-01").unwrap(), "03/2024");
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("yesterday").is_err());
        assert_eq!(parse_date(" 05/03/2024 ").unwrap(), d(2024, 3, 5));
    }

    #[test]
    fn display_date_is_day_first() {
        assert_eq!(format_display_date(d(2024, 3, 5)), "05/03/2024");
    }

    #[test]
    fn period_parses_both_month_spellings() {
        assert_eq!("01/2024".parse::<Period>().unwrap(), Period::Month { month: 1, year: 2024 });
        assert_eq!("2024-01".parse::<Period>().unwrap(), Period::Month { month: 1, year: 2024 });
        assert_eq!("1/2024".parse::<Period>().unwrap().to_string(), "01/2024");
    }

    #[test]
    fn period_range_round_trips_through_text() {
        let p = Period::range(d(2024, 1, 10), d(2024, 2, 9)).unwrap();
        assert_eq!(p.to_string(), "10/01/2024 - 09/02/2024");
        assert_eq!(p.to_string().parse::<Period>().unwrap(), p);
        assert_eq!(
            "2024-01-10 to 2024-02-09".parse::<Period>().unwrap(),
            p
        );
    }

    #[test]
    fn inverted_range_rejected() {
        assert!(Period::range(d(2024, 2, 1), d(2024, 1, 1)).is_err());
        assert!("01/02/2024 - 01/01/2024".parse::<Period>().is_err());
    }
}
