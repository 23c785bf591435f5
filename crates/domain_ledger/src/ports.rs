//! Ledger Ports
//!
//! `LedgerPort` is the ledger store; `RequestPort` stores deposit and
//! withdrawal requests. Operations that touch both (approving a request)
//! live on `RequestPort` so the adapter can run them atomically.

use async_trait::async_trait;

use core_kernel::{Amount, DomainPort, LedgerEntryId, PeriodId, PortError, RequestId};
use domain_participant::OwnerRef;

use crate::entry::{EntryKind, LedgerEntry, NewLedgerEntry};
use crate::request::{ApprovalRequest, RequestKind};

/// Port for the append-only ledger
///
/// Listing operations return entries in timestamp order. A period's profit
/// entries are removed only together with the period (see the period store's
/// cascading delete), never on their own.
#[async_trait]
pub trait LedgerPort: DomainPort {
    /// Appends an entry and returns it with its id
    ///
    /// Implementations reject entries whose shape is invalid (see
    /// `NewLedgerEntry::validate`) with `PortError::Validation`.
    async fn append_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, PortError>;

    /// Retrieves one entry
    async fn get_entry(&self, id: LedgerEntryId) -> Result<LedgerEntry, PortError>;

    /// Lists an owner's entries, optionally filtered by kind
    async fn list_entries(
        &self,
        owner: OwnerRef,
        kind: Option<EntryKind>,
    ) -> Result<Vec<LedgerEntry>, PortError>;

    /// Lists every entry in the ledger
    async fn list_all_entries(&self) -> Result<Vec<LedgerEntry>, PortError>;

    /// Lists the profit entries produced by a period
    async fn list_period_entries(&self, period_id: PeriodId) -> Result<Vec<LedgerEntry>, PortError>;

    /// Deletes a single entry (administrator correction)
    async fn delete_entry(&self, id: LedgerEntryId) -> Result<(), PortError>;

    /// Replaces the amount and description of an entry (administrator correction)
    async fn correct_entry(
        &self,
        id: LedgerEntryId,
        amount: Amount,
        description: String,
    ) -> Result<LedgerEntry, PortError>;
}

/// Filter for listing requests
#[derive(Debug, Clone, Default)]
pub struct RequestQuery {
    pub owner: Option<OwnerRef>,
    pub kind: Option<RequestKind>,
    pub pending_only: bool,
}

impl RequestQuery {
    pub fn pending() -> Self {
        Self { pending_only: true, ..Default::default() }
    }

    pub fn for_owner(owner: OwnerRef) -> Self {
        Self { owner: Some(owner), ..Default::default() }
    }

    pub fn matches(&self, request: &ApprovalRequest) -> bool {
        if let Some(owner) = self.owner {
            if request.owner != owner {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if request.kind != kind {
                return false;
            }
        }
        !self.pending_only || request.is_pending()
    }
}

/// Port for deposit/withdrawal requests
#[async_trait]
pub trait RequestPort: DomainPort {
    /// Stores a new pending request
    ///
    /// Fails with `PortError::Conflict` if the owner already has a pending
    /// request of the same kind.
    async fn insert_request(&self, request: ApprovalRequest) -> Result<ApprovalRequest, PortError>;

    async fn get_request(&self, id: RequestId) -> Result<ApprovalRequest, PortError>;

    /// Lists requests, newest first
    async fn list_requests(&self, query: RequestQuery) -> Result<Vec<ApprovalRequest>, PortError>;

    /// Appends `entry` and marks the request approved, atomically
    ///
    /// Fails with `PortError::Conflict` if the request is no longer pending.
    async fn approve_request(
        &self,
        id: RequestId,
        entry: NewLedgerEntry,
        decided_by: String,
    ) -> Result<(ApprovalRequest, LedgerEntry), PortError>;

    /// Marks the request rejected with a reason; no ledger entry is written
    async fn reject_request(
        &self,
        id: RequestId,
        reason: String,
        decided_by: String,
    ) -> Result<ApprovalRequest, PortError>;
}
