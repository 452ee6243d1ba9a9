//! Financial periods: the months (or any span) movements are booked into.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::FinancialError;

/// A financial period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialPeriod {
    /// Period ID.
    pub id: Uuid,
    /// Unique identification, e.g. "01/2026".
    pub identification: String,
    /// First day of the period.
    pub start: NaiveDate,
    /// Last day of the period.
    pub end: NaiveDate,
    /// Closed periods accept no movements.
    pub closed: bool,
}

impl FinancialPeriod {
    /// Returns true once the period end has passed.
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.end < today
    }

    /// Returns true if the date falls inside the period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns true if both periods share at least one day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// Validates the period against the already registered ones.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriodRange` when start is not before end and
    /// `OverlappingPeriod` when another period shares a day with this one.
    pub fn validate(&self, existing: &[Self]) -> Result<(), FinancialError> {
        if self.start >= self.end {
            return Err(FinancialError::InvalidPeriodRange {
                start: self.start,
                end: self.end,
            });
        }
        if let Some(other) = existing
            .iter()
            .find(|p| p.id != self.id && p.overlaps(self))
        {
            return Err(FinancialError::OverlappingPeriod(other.identification.clone()));
        }
        Ok(())
    }

    /// Ensures the period still accepts movements.
    ///
    /// # Errors
    ///
    /// Returns `FinancialError::PeriodClosed` for closed periods.
    pub fn ensure_open(&self) -> Result<(), FinancialError> {
        if self.closed {
            return Err(FinancialError::PeriodClosed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(name: &str, start: NaiveDate, end: NaiveDate) -> FinancialPeriod {
        FinancialPeriod {
            id: Uuid::now_v7(),
            identification: name.to_string(),
            start,
            end,
            closed: false,
        }
    }

    #[test]
    fn test_validate_range() {
        let p = period("bad", date(2026, 2, 1), date(2026, 1, 1));
        assert!(matches!(
            p.validate(&[]),
            Err(FinancialError::InvalidPeriodRange { .. })
        ));
    }

    #[test]
    fn test_validate_overlap() {
        let january = period("01/2026", date(2026, 1, 1), date(2026, 1, 31));
        let february = period("02/2026", date(2026, 2, 1), date(2026, 2, 28));
        assert!(february.validate(std::slice::from_ref(&january)).is_ok());

        let overlapping = period("late-jan", date(2026, 1, 31), date(2026, 2, 27));
        assert_eq!(
            overlapping.validate(&[january.clone(), february]),
            Err(FinancialError::OverlappingPeriod("01/2026".to_string()))
        );

        // A period never overlaps with itself when being updated.
        assert!(january.validate(std::slice::from_ref(&january)).is_ok());
    }

    #[test]
    fn test_expired_and_contains() {
        let january = period("01/2026", date(2026, 1, 1), date(2026, 1, 31));
        assert!(january.contains(date(2026, 1, 31)));
        assert!(!january.contains(date(2026, 2, 1)));
        assert!(!january.is_expired(date(2026, 1, 31)));
        assert!(january.is_expired(date(2026, 2, 1)));
    }

    #[test]
    fn test_ensure_open() {
        let mut p = period("01/2026", date(2026, 1, 1), date(2026, 1, 31));
        assert!(p.ensure_open().is_ok());
        p.closed = true;
        assert_eq!(p.ensure_open(), Err(FinancialError::PeriodClosed));
    }
}
