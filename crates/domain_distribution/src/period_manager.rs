//! Period lifecycle
//!
//! ```text
//! NoPeriods -> Pending -> Processed -> Pending (next) ...
//!                 \___________\____ delete (cascades profit entries)
//! ```
//!
//! At most one period is pending at a time. That rule is what serializes
//! distribution runs, so it is checked here for a friendly message and again
//! by the store, which is the authority under concurrent admins.

use std::sync::Arc;

use tracing::info;

use core_kernel::{PeriodId, PortError};

use crate::error::DistributionError;
use crate::period::{AccountingPeriod, NewPeriod, SequenceAvailability};
use crate::ports::PeriodPort;

const PENDING_PERIOD_MESSAGE: &str =
    "Process the current period first: another period is still pending";

#[derive(Clone)]
pub struct PeriodManager {
    periods: Arc<dyn PeriodPort>,
}

impl PeriodManager {
    pub fn new(periods: Arc<dyn PeriodPort>) -> Self {
        Self { periods }
    }

    /// All periods, ordered by sequence number
    pub async fn list(&self) -> Result<Vec<AccountingPeriod>, DistributionError> {
        Ok(self.periods.list_periods().await?)
    }

    pub async fn get(&self, id: PeriodId) -> Result<AccountingPeriod, DistributionError> {
        Ok(self.periods.get_period(id).await?)
    }

    /// Opens a new pending period
    ///
    /// # Errors
    ///
    /// `Validation` if a period is still pending, the range is inverted or
    /// overlaps an existing period, or the sequence number is taken.
    pub async fn create(&self, request: NewPeriod) -> Result<AccountingPeriod, DistributionError> {
        let period = AccountingPeriod::new(request)?;
        let existing = self.periods.list_periods().await?;

        if existing.iter().any(AccountingPeriod::is_pending) {
            return Err(DistributionError::Validation(PENDING_PERIOD_MESSAGE.to_string()));
        }
        if let Some(clash) = existing.iter().find(|p| p.sequence_number == period.sequence_number) {
            return Err(DistributionError::Validation(format!(
                "Sequence number {} is already used by {}",
                clash.sequence_number, clash.label
            )));
        }
        if let Some(clash) = existing.iter().find(|p| p.range.overlaps(&period.range)) {
            return Err(DistributionError::Validation(format!(
                "Date range {} overlaps period {} ({})",
                period.range, clash.label, clash.range
            )));
        }

        let period = self
            .periods
            .insert_period(period)
            .await
            .map_err(|e| match e {
                PortError::Conflict { message } => DistributionError::Validation(message),
                other => other.into(),
            })?;

        info!(
            period_id = %period.id,
            sequence_number = period.sequence_number,
            label = %period.label,
            range = %period.range,
            "Period created"
        );
        Ok(period)
    }

    /// Sequence number the next period may use, or `Unavailable` while a
    /// period is pending
    pub async fn next_available_sequence_number(&self) -> Result<SequenceAvailability, DistributionError> {
        let periods = self.periods.list_periods().await?;
        Ok(SequenceAvailability::from_periods(&periods))
    }

    /// Deletes a period together with the profit entries it produced
    ///
    /// Returns the number of ledger entries removed. Callers must obtain an
    /// explicit confirmation before calling this.
    pub async fn delete(&self, id: PeriodId) -> Result<u64, DistributionError> {
        let period = self.periods.get_period(id).await?;
        let removed = self.periods.delete_period(id).await?;

        info!(
            period_id = %id,
            label = %period.label,
            was_processed = period.processed,
            entries_removed = removed,
            "Period deleted"
        );
        Ok(removed)
    }
}
