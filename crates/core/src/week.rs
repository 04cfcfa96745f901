//! Monday-aligned sales weeks.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// First day (Monday) of an ISO sales week.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "NaiveDate", into = "NaiveDate")]
pub struct WeekStart(NaiveDate);

impl WeekStart {
    /// Accept `date` only if it falls on a Monday.
    pub fn new(date: NaiveDate) -> DomainResult<Self> {
        if date.weekday() != Weekday::Mon {
            return Err(DomainError::validation(format!(
                "week start {date} is a {:?}, expected a Monday",
                date.weekday()
            )));
        }
        Ok(Self(date))
    }

    /// The week that contains `date` (floors to the preceding Monday).
    pub fn containing(date: NaiveDate) -> Self {
        let offset = i64::from(date.weekday().num_days_from_monday());
        Self(date - Duration::days(offset))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Shift by whole weeks (negative moves back in time).
    pub fn plus_weeks(&self, weeks: i64) -> Self {
        Self(self.0 + Duration::weeks(weeks))
    }
}

impl core::fmt::Display for WeekStart {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<NaiveDate> for WeekStart {
    type Error = DomainError;

    fn try_from(value: NaiveDate) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WeekStart> for NaiveDate {
    fn from(value: WeekStart) -> Self {
        value.0
    }
}

impl ValueObject for WeekStart {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn accepts_mondays() {
        // 2024-01-01 was a Monday.
        let week = WeekStart::new(date(2024, 1, 1)).unwrap();
        assert_eq!(week.date(), date(2024, 1, 1));
    }

    #[test]
    fn rejects_other_weekdays() {
        let err = WeekStart::new(date(2024, 1, 3)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("expected a Monday")));
    }

    #[test]
    fn containing_floors_to_monday() {
        assert_eq!(WeekStart::containing(date(2024, 1, 7)).date(), date(2024, 1, 1));
        assert_eq!(WeekStart::containing(date(2024, 1, 1)).date(), date(2024, 1, 1));
        assert_eq!(WeekStart::containing(date(2024, 1, 8)).date(), date(2024, 1, 8));
    }

    #[test]
    fn plus_weeks_moves_in_both_directions() {
        let week = WeekStart::new(date(2024, 1, 8)).unwrap();
        assert_eq!(week.plus_weeks(1).date(), date(2024, 1, 15));
        assert_eq!(week.plus_weeks(-1).date(), date(2024, 1, 1));
    }

    #[test]
    fn deserialization_enforces_monday() {
        let ok: WeekStart = serde_json::from_str("\"2024-01-08\"").unwrap();
        assert_eq!(ok.date(), date(2024, 1, 8));
        assert!(serde_json::from_str::<WeekStart>("\"2024-01-09\"").is_err());
    }
}
