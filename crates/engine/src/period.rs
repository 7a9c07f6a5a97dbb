//! Calendar periods (`YYYY-MM`).
//!
//! A `Period` buckets transactions and bills by month. Projecting a
//! day-of-month onto a period clamps to the month's real length, so an
//! anchor day of 31 lands on the 30th (or the 28th/29th in February).

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(EngineError::InvalidPeriod(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// Parse a strict `YYYY-MM` label.
    pub fn parse(label: &str) -> ResultEngine<Self> {
        let bytes = label.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if !well_formed {
            return Err(EngineError::InvalidPeriod(label.to_string()));
        }

        let year = label[..4]
            .parse()
            .map_err(|_| EngineError::InvalidPeriod(label.to_string()))?;
        let month = label[5..]
            .parse()
            .map_err(|_| EngineError::InvalidPeriod(label.to_string()))?;
        Self::new(year, month).map_err(|_| EngineError::InvalidPeriod(label.to_string()))
    }

    /// The period a date belongs to.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(self.year, 1, 1).unwrap_or_default())
    }

    /// Number of the last calendar day of the month (28, 29, 30 or 31).
    pub fn last_day(&self) -> u32 {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        match next {
            Some(first_of_next) => (first_of_next - chrono::Duration::days(1)).day(),
            None => 31,
        }
    }

    /// Project a day-of-month onto this period, clamping to the month length.
    pub fn date_with_day(&self, day: u32) -> NaiveDate {
        let day = day.max(1).min(self.last_day());
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or_else(|| self.first_day())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<&str> for Period {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Period {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_labels() {
        let period = Period::parse("2024-02").unwrap();
        assert_eq!(period.label(), "2024-02");
        assert_eq!(Period::parse("1999-12").unwrap().label(), "1999-12");
    }

    #[test]
    fn rejects_malformed_labels() {
        for label in ["2024", "2024-2", "2024-13", "2024-00", "24-01", "2024_01", "2024-1a"] {
            assert!(matches!(
                Period::parse(label),
                Err(EngineError::InvalidPeriod(_))
            ));
        }
    }

    #[test]
    fn last_day_handles_month_lengths_and_leap_years() {
        assert_eq!(Period::parse("2024-01").unwrap().last_day(), 31);
        assert_eq!(Period::parse("2024-04").unwrap().last_day(), 30);
        assert_eq!(Period::parse("2024-02").unwrap().last_day(), 29);
        assert_eq!(Period::parse("2023-02").unwrap().last_day(), 28);
        assert_eq!(Period::parse("2024-12").unwrap().last_day(), 31);
    }

    #[test]
    fn date_with_day_clamps_to_month_length() {
        let april = Period::parse("2024-04").unwrap();
        assert_eq!(
            april.date_with_day(31),
            NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()
        );
        let feb = Period::parse("2023-02").unwrap();
        assert_eq!(
            feb.date_with_day(31),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
        let leap_feb = Period::parse("2024-02").unwrap();
        assert_eq!(
            leap_feb.date_with_day(31),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            leap_feb.date_with_day(5),
            NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
        );
    }

    #[test]
    fn contains_matches_period_of_date() {
        let period = Period::parse("2024-02").unwrap();
        assert!(period.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
    }
}
