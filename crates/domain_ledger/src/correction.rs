//! Administrator corrections to deposit and withdrawal entries
//!
//! Profit entries are owned by their period: the only way to undo them is
//! to delete the period, which removes its entries in the same transaction.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use core_kernel::{Amount, LedgerEntryId, OperationMetadata};

use crate::entry::{EntryKind, LedgerEntry};
use crate::error::LedgerError;
use crate::ports::LedgerPort;

const UNKNOWN_ACTOR: &str = "unknown";

/// Corrective edits and deletions of single ledger entries
#[derive(Clone)]
pub struct CorrectionService {
    ledger: Arc<dyn LedgerPort>,
}

impl CorrectionService {
    pub fn new(ledger: Arc<dyn LedgerPort>) -> Self {
        Self { ledger }
    }

    pub async fn get(&self, id: LedgerEntryId) -> Result<LedgerEntry, LedgerError> {
        Ok(self.ledger.get_entry(id).await?)
    }

    /// Rewrites the amount and description of a deposit or withdrawal
    ///
    /// # Errors
    ///
    /// - `NotFound` if the entry does not exist
    /// - `Money` if the amount is not positive
    /// - `Validation` for a blank description
    /// - `InvalidState` for profit entries
    pub async fn correct(
        &self,
        id: LedgerEntryId,
        amount: Decimal,
        description: String,
        metadata: &OperationMetadata,
    ) -> Result<LedgerEntry, LedgerError> {
        let amount = Amount::new(amount)?;
        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(LedgerError::Validation(
                "A correction needs a description".to_string(),
            ));
        }

        let current = self.editable(id).await?;
        let corrected = self.ledger.correct_entry(id, amount, description).await?;

        info!(
            entry_id = %id,
            owner = %corrected.owner,
            previous_amount = %current.amount,
            amount = %corrected.amount,
            corrected_by = metadata.actor_or(UNKNOWN_ACTOR),
            correlation_id = ?metadata.correlation_id,
            "Ledger entry corrected"
        );
        Ok(corrected)
    }

    /// Deletes a deposit or withdrawal and returns what was removed
    ///
    /// # Errors
    ///
    /// - `NotFound` if the entry does not exist
    /// - `InvalidState` for profit entries
    pub async fn delete(
        &self,
        id: LedgerEntryId,
        metadata: &OperationMetadata,
    ) -> Result<LedgerEntry, LedgerError> {
        let entry = self.editable(id).await?;
        self.ledger.delete_entry(id).await?;

        info!(
            entry_id = %id,
            owner = %entry.owner,
            kind = %entry.kind,
            amount = %entry.amount,
            deleted_by = metadata.actor_or(UNKNOWN_ACTOR),
            correlation_id = ?metadata.correlation_id,
            "Ledger entry deleted"
        );
        Ok(entry)
    }

    async fn editable(&self, id: LedgerEntryId) -> Result<LedgerEntry, LedgerError> {
        let entry = self.ledger.get_entry(id).await?;
        if entry.kind == EntryKind::Profit {
            return Err(LedgerError::InvalidState(format!(
                "Entry {} is a distribution profit; delete its period instead",
                id
            )));
        }
        Ok(entry)
    }
}
