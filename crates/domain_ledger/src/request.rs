//! Deposit and withdrawal requests
//!
//! A participant asks for money to be added or removed; an administrator
//! approves (one ledger entry is written) or rejects (a reason is kept, no
//! entry). Decided requests are final.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Amount, LedgerEntryId, RequestId};
use domain_participant::OwnerRef;

use crate::entry::{EntryKind, NewLedgerEntry};
use crate::error::LedgerError;

/// What the participant is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Deposit,
    Withdrawal,
}

impl RequestKind {
    /// Ledger entry kind written on approval
    pub fn entry_kind(&self) -> EntryKind {
        match self {
            RequestKind::Deposit => EntryKind::Deposit,
            RequestKind::Withdrawal => EntryKind::Withdrawal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Deposit => "deposit",
            RequestKind::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved { entry_id: LedgerEntryId },
    Rejected { reason: String },
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved { .. } => "approved",
            RequestStatus::Rejected { .. } => "rejected",
        }
    }
}

/// A deposit or withdrawal request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: RequestId,
    pub owner: OwnerRef,
    pub kind: RequestKind,
    pub amount: Amount,
    pub note: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<String>,
}

impl ApprovalRequest {
    /// Creates a pending request
    pub fn new(owner: OwnerRef, kind: RequestKind, amount: Amount) -> Self {
        Self {
            id: RequestId::new_v7(),
            owner,
            kind,
            amount,
            note: None,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            decided_at: None,
            decided_by: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// The ledger entry this request turns into when approved
    pub fn ledger_entry(&self) -> NewLedgerEntry {
        NewLedgerEntry::new(self.owner, self.kind.entry_kind(), self.amount)
            .with_description(format!("Approved {} request {}", self.kind, self.id))
    }

    /// Marks the request approved
    ///
    /// # Errors
    ///
    /// `LedgerError::InvalidState` if the request was already decided
    pub fn approve(&mut self, entry_id: LedgerEntryId, decided_by: impl Into<String>) -> Result<(), LedgerError> {
        self.ensure_pending()?;
        self.status = RequestStatus::Approved { entry_id };
        self.decided_at = Some(Utc::now());
        self.decided_by = Some(decided_by.into());
        Ok(())
    }

    /// Marks the request rejected
    ///
    /// # Errors
    ///
    /// `LedgerError::Validation` for an empty reason, `InvalidState` if the
    /// request was already decided
    pub fn reject(&mut self, reason: impl Into<String>, decided_by: impl Into<String>) -> Result<(), LedgerError> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(LedgerError::Validation("A rejection reason is required".to_string()));
        }
        self.ensure_pending()?;
        self.status = RequestStatus::Rejected { reason };
        self.decided_at = Some(Utc::now());
        self.decided_by = Some(decided_by.into());
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), LedgerError> {
        if !self.is_pending() {
            return Err(LedgerError::InvalidState(format!(
                "Request {} is already {}",
                self.id,
                self.status.as_str()
            )));
        }
        Ok(())
    }
}
