//! Calendar date ranges
//!
//! Accounting periods are described by inclusive `[start, end]` date
//! ranges. Two periods conflict when their ranges share at least one day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// An inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range; a single-day range (`start == end`) is allowed
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if end < start {
            return Err(TemporalError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns true if the two ranges share at least one day
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Number of days covered, counting both ends
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_rejects_reversed_dates() {
        let result = DateRange::new(date(2024, 3, 31), date(2024, 3, 1));
        assert!(matches!(result, Err(TemporalError::InvalidRange { .. })));
    }

    #[test]
    fn test_adjacent_ranges_do_not_overlap() {
        let march = DateRange::new(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        let april = DateRange::new(date(2024, 4, 1), date(2024, 4, 30)).unwrap();
        assert!(!march.overlaps(&april));
        assert!(!april.overlaps(&march));
    }

    #[test]
    fn test_shared_boundary_day_overlaps() {
        let march = DateRange::new(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        let late = DateRange::new(date(2024, 3, 31), date(2024, 4, 15)).unwrap();
        assert!(march.overlaps(&late));
    }

    #[test]
    fn test_days_is_inclusive() {
        let single = DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        assert_eq!(single.days(), 1);
        let february = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        assert_eq!(february.days(), 29);
        assert!(february.contains(date(2024, 2, 29)));
    }
}
