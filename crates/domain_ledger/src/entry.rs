//! Ledger entry types
//!
//! A ledger entry is an immutable fact about one participant's money. The
//! amount is always strictly positive; `EntryKind` says which way it moves.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Amount, LedgerEntryId, PeriodId};
use domain_participant::OwnerRef;
use crate::error::LedgerError;

/// Kind of ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Money put in by the participant
    Deposit,
    /// Money taken out by the participant
    Withdrawal,
    /// Monthly profit credited by a distribution
    Profit,
}

impl EntryKind {
    /// Direction of the entry in the balance fold
    pub fn sign(&self) -> Decimal {
        match self {
            EntryKind::Deposit | EntryKind::Profit => Decimal::ONE,
            EntryKind::Withdrawal => Decimal::NEGATIVE_ONE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Deposit => "deposit",
            EntryKind::Withdrawal => "withdrawal",
            EntryKind::Profit => "profit",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub owner: OwnerRef,
    pub amount: Amount,
    pub kind: EntryKind,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    /// Period that produced this entry; set only on distribution profits
    pub period_id: Option<PeriodId>,
}

impl LedgerEntry {
    /// The entry's contribution to the owner's balance
    pub fn signed_amount(&self) -> Decimal {
        self.kind.sign() * self.amount.value()
    }
}

/// An entry waiting to be appended to the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    pub owner: OwnerRef,
    pub amount: Amount,
    pub kind: EntryKind,
    pub timestamp: Option<DateTime<Utc>>,
    pub description: String,
    pub period_id: Option<PeriodId>,
}

impl NewLedgerEntry {
    /// Creates a new entry
    ///
    /// # Arguments
    ///
    /// * `owner` - Participant the entry belongs to
    /// * `kind` - Deposit, withdrawal or profit
    /// * `amount` - Positive amount
    pub fn new(owner: OwnerRef, kind: EntryKind, amount: Amount) -> Self {
        Self {
            owner,
            amount,
            kind,
            timestamp: None,
            description: String::new(),
            period_id: None,
        }
    }

    pub fn deposit(owner: OwnerRef, amount: Amount) -> Self {
        Self::new(owner, EntryKind::Deposit, amount)
    }

    pub fn withdrawal(owner: OwnerRef, amount: Amount) -> Self {
        Self::new(owner, EntryKind::Withdrawal, amount)
    }

    pub fn profit(owner: OwnerRef, amount: Amount) -> Self {
        Self::new(owner, EntryKind::Profit, amount)
    }

    /// Sets the entry timestamp
    pub fn dated(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Tags the entry with the period that produced it
    pub fn for_period(mut self, period_id: PeriodId) -> Self {
        self.period_id = Some(period_id);
        self
    }

    /// Checks the shape rules every store enforces before insertion
    ///
    /// Only profit entries may carry a period tag; deleting a period removes
    /// its tagged entries, so a tagged deposit would be wiped by mistake.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.period_id.is_some() && self.kind != EntryKind::Profit {
            return Err(LedgerError::Validation(format!(
                "Only profit entries can be tagged with a period, got {}",
                self.kind
            )));
        }
        Ok(())
    }

    /// Materializes the entry with a fresh id
    pub fn into_entry(self) -> LedgerEntry {
        LedgerEntry {
            id: LedgerEntryId::new_v7(),
            owner: self.owner,
            amount: self.amount,
            kind: self.kind,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            description: self.description,
            period_id: self.period_id,
        }
    }
}
