//! Calendar helpers for month-bounded aggregation

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};

use crate::errors::{KpiError, Result};

/// Years accepted by read and write paths
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 2000..=2100;

/// Validated (year, month) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        validate_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(KpiError::validation(format!(
                "Invalid month: {} (expected 1-12)",
                month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn first_day(self) -> NaiveDate {
        // year/month validated in new()
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, self.days()).unwrap_or_default()
    }

    pub fn days(self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// Every date of the month, in order
    pub fn dates(self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first_day();
        first.iter_days().take(self.days() as usize)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub fn validate_year(year: i32) -> Result<()> {
    if SUPPORTED_YEARS.contains(&year) {
        Ok(())
    } else {
        Err(KpiError::validation(format!(
            "Invalid year: {} (expected {}-{})",
            year,
            SUPPORTED_YEARS.start(),
            SUPPORTED_YEARS.end()
        )))
    }
}

/// Number of days in the given month, 0 for an invalid month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.map(|n| n.signed_duration_since(first).num_days() as u32)
        .unwrap_or(31)
}

/// Parse a strict `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.len() != 10 {
        return Err(KpiError::date_parse(format!(
            "Invalid date '{}' (expected YYYY-MM-DD)",
            raw
        )));
    }
    Ok(NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2026, 1), 31);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2028, 2), 29);
        assert_eq!(days_in_month(2026, 4), 30);
        assert_eq!(days_in_month(2026, 12), 31);
        assert_eq!(days_in_month(2026, 13), 0);
    }

    #[test]
    fn test_year_month_bounds() {
        let ym = YearMonth::new(2026, 2).unwrap();
        assert_eq!(ym.first_day(), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(ym.last_day(), NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert_eq!(ym.dates().count(), 28);
        assert_eq!(ym.to_string(), "2026-02");
    }

    #[test]
    fn test_year_month_validation() {
        assert!(YearMonth::new(2026, 0).is_err());
        assert!(YearMonth::new(2026, 13).is_err());
        assert!(YearMonth::new(1999, 5).is_err());
    }

    #[test]
    fn test_parse_date_is_strict() {
        assert!(parse_date("2026-03-05").is_ok());
        assert!(parse_date("2026-3-5").is_err());
        assert!(parse_date("2026-02-30").is_err());
        assert!(parse_date("05/03/2026").is_err());
        assert!(parse_date("").is_err());
    }
}
