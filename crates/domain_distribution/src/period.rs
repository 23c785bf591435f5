//! Accounting periods
//!
//! A period ("month") is a numbered, inclusive date range. It starts out
//! pending and flips to processed exactly once, when its distribution is
//! committed. The only way back is deleting the period, which also removes
//! the profit entries it produced.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CommitId, DateRange, Percentage, PeriodId};

use crate::error::DistributionError;
use crate::split::SplitRatio;

/// An accounting period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingPeriod {
    pub id: PeriodId,
    /// Unique, positive
    pub sequence_number: u32,
    pub label: String,
    pub range: DateRange,
    pub processed: bool,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<String>,
    pub gross_profit_amount: Option<Decimal>,
    pub profit_percentage: Option<Decimal>,
    pub proportional_percentage: Option<Decimal>,
    pub exclusive_percentage: Option<Decimal>,
    /// Idempotency key of the commit that processed this period
    pub commit_id: Option<CommitId>,
    pub created_at: DateTime<Utc>,
}

impl AccountingPeriod {
    /// Creates a pending period from a validated request
    pub fn new(request: NewPeriod) -> Result<Self, DistributionError> {
        request.validate()?;
        Ok(Self {
            id: PeriodId::new_v7(),
            sequence_number: request.sequence_number,
            label: request.label.trim().to_string(),
            range: DateRange::new(request.start_date, request.end_date)?,
            processed: false,
            processed_at: None,
            processed_by: None,
            gross_profit_amount: None,
            profit_percentage: None,
            proportional_percentage: None,
            exclusive_percentage: None,
            commit_id: None,
            created_at: Utc::now(),
        })
    }

    pub fn is_pending(&self) -> bool {
        !self.processed
    }

    /// Text stamped on the profit entries this period produces
    pub fn entry_description(&self) -> String {
        format!("Profit distribution {} ({})", self.label, self.range)
    }

    /// Applies the audit record of a successful commit
    ///
    /// # Errors
    ///
    /// `AlreadyProcessed` if the period was already processed; the period
    /// is left untouched.
    pub fn mark_processed(&mut self, record: &ProcessingRecord) -> Result<(), DistributionError> {
        if self.processed {
            return Err(DistributionError::AlreadyProcessed(self.label.clone()));
        }
        self.processed = true;
        self.processed_at = Some(record.processed_at);
        self.processed_by = Some(record.processed_by.clone());
        self.gross_profit_amount = Some(record.gross_profit_amount);
        self.profit_percentage = Some(record.profit_percentage.value());
        self.proportional_percentage = Some(record.split.proportional.value());
        self.exclusive_percentage = Some(record.split.exclusive.value());
        self.commit_id = Some(record.commit_id);
        Ok(())
    }
}

/// Request to open a new period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPeriod {
    pub sequence_number: u32,
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewPeriod {
    pub fn new(sequence_number: u32, label: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            sequence_number,
            label: label.into(),
            start_date,
            end_date,
        }
    }

    /// Shape checks that need no stored state
    pub fn validate(&self) -> Result<(), DistributionError> {
        if self.sequence_number == 0 {
            return Err(DistributionError::Validation(
                "Sequence number must be positive".to_string(),
            ));
        }
        let label = self.label.trim();
        if label.is_empty() || label.len() > 100 {
            return Err(DistributionError::Validation(
                "Label must be between 1 and 100 characters".to_string(),
            ));
        }
        if self.end_date < self.start_date {
            return Err(DistributionError::Validation(format!(
                "End date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        Ok(())
    }
}

/// Audit data written on the period by a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingRecord {
    pub commit_id: CommitId,
    pub processed_at: DateTime<Utc>,
    pub processed_by: String,
    pub gross_profit_amount: Decimal,
    pub profit_percentage: Percentage,
    pub split: SplitRatio,
}

/// Answer to "what sequence number can the next period use?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "sequence_number", rename_all = "snake_case")]
pub enum SequenceAvailability {
    /// Lowest unused positive sequence number
    Available(u32),
    /// A pending period exists; creation is blocked until it is processed
    Unavailable,
}

impl SequenceAvailability {
    /// Picks the lowest positive number no period uses
    ///
    /// Returns `Unavailable` if any period is still pending.
    pub fn from_periods(periods: &[AccountingPeriod]) -> Self {
        if periods.iter().any(AccountingPeriod::is_pending) {
            return SequenceAvailability::Unavailable;
        }
        let mut used: Vec<u32> = periods.iter().map(|p| p.sequence_number).collect();
        used.sort_unstable();
        let mut next = 1;
        for number in used {
            if number == next {
                next += 1;
            } else if number > next {
                break;
            }
        }
        SequenceAvailability::Available(next)
    }
}
