//! Approval workflow for deposit and withdrawal requests

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use core_kernel::{Amount, RequestId};
use domain_participant::{OwnerRef, ParticipantDirectory};

use crate::balance::BalanceCalculator;
use crate::entry::LedgerEntry;
use crate::error::LedgerError;
use crate::ports::{LedgerPort, RequestPort, RequestQuery};
use crate::request::{ApprovalRequest, RequestKind};

/// Turns participant requests into ledger entries once an administrator
/// approves them
#[derive(Clone)]
pub struct ApprovalService {
    requests: Arc<dyn RequestPort>,
    balances: BalanceCalculator,
}

impl ApprovalService {
    pub fn new(
        requests: Arc<dyn RequestPort>,
        ledger: Arc<dyn LedgerPort>,
        directory: Arc<dyn ParticipantDirectory>,
    ) -> Self {
        Self {
            requests,
            balances: BalanceCalculator::new(ledger, directory),
        }
    }

    /// Submits a new pending request
    ///
    /// # Errors
    ///
    /// - `NotFound` if the owner does not exist
    /// - `Money` if the amount is not positive
    /// - `DuplicatePendingRequest` if the owner already has a pending request
    ///   of this kind
    /// - `InsufficientBalance` for a withdrawal above the current balance
    pub async fn submit(
        &self,
        owner: OwnerRef,
        kind: RequestKind,
        amount: Decimal,
        note: Option<String>,
    ) -> Result<ApprovalRequest, LedgerError> {
        let amount = Amount::new(amount)?;
        let balance = self.balances.get_balance(owner).await?;

        let pending = self
            .requests
            .list_requests(RequestQuery {
                owner: Some(owner),
                kind: Some(kind),
                pending_only: true,
            })
            .await?;
        if !pending.is_empty() {
            return Err(duplicate(owner, kind));
        }

        if kind == RequestKind::Withdrawal {
            ensure_covered(amount, balance)?;
        }

        let mut request = ApprovalRequest::new(owner, kind, amount);
        if let Some(note) = note.filter(|n| !n.trim().is_empty()) {
            request = request.with_note(note);
        }

        // The store's unique pending index closes the race between the check
        // above and this insert.
        let request = self.requests.insert_request(request).await.map_err(|e| {
            if e.is_conflict() {
                duplicate(owner, kind)
            } else {
                e.into()
            }
        })?;

        info!(request_id = %request.id, owner = %owner, kind = %kind, amount = %amount, "Request submitted");
        Ok(request)
    }

    /// Approves a pending request, writing exactly one ledger entry
    pub async fn approve(
        &self,
        id: RequestId,
        decided_by: &str,
    ) -> Result<(ApprovalRequest, LedgerEntry), LedgerError> {
        let request = self.requests.get_request(id).await?;
        if !request.is_pending() {
            return Err(LedgerError::InvalidState(format!(
                "Request {} is already {}",
                id,
                request.status.as_str()
            )));
        }

        if request.kind == RequestKind::Withdrawal {
            let balance = self.balances.get_balance(request.owner).await?;
            ensure_covered(request.amount, balance)?;
        }

        let (request, entry) = self
            .requests
            .approve_request(id, request.ledger_entry(), decided_by.to_string())
            .await?;

        info!(
            request_id = %request.id,
            entry_id = %entry.id,
            decided_by,
            "Request approved"
        );
        Ok((request, entry))
    }

    /// Rejects a pending request; no ledger entry is written
    pub async fn reject(
        &self,
        id: RequestId,
        reason: &str,
        decided_by: &str,
    ) -> Result<ApprovalRequest, LedgerError> {
        if reason.trim().is_empty() {
            return Err(LedgerError::Validation("A rejection reason is required".to_string()));
        }

        let request = self
            .requests
            .reject_request(id, reason.trim().to_string(), decided_by.to_string())
            .await?;

        info!(request_id = %request.id, decided_by, "Request rejected");
        Ok(request)
    }

    pub async fn get(&self, id: RequestId) -> Result<ApprovalRequest, LedgerError> {
        Ok(self.requests.get_request(id).await?)
    }

    /// Requests matching the query, newest first
    pub async fn list(&self, query: RequestQuery) -> Result<Vec<ApprovalRequest>, LedgerError> {
        Ok(self.requests.list_requests(query).await?)
    }

    pub async fn list_pending(&self) -> Result<Vec<ApprovalRequest>, LedgerError> {
        self.list(RequestQuery::pending()).await
    }

    pub async fn list_for_owner(&self, owner: OwnerRef) -> Result<Vec<ApprovalRequest>, LedgerError> {
        self.list(RequestQuery::for_owner(owner)).await
    }
}

fn duplicate(owner: OwnerRef, kind: RequestKind) -> LedgerError {
    LedgerError::DuplicatePendingRequest {
        owner: owner.to_string(),
        kind: kind.to_string(),
    }
}

fn ensure_covered(amount: Amount, balance: Decimal) -> Result<(), LedgerError> {
    if amount.value() > balance {
        return Err(LedgerError::InsufficientBalance {
            requested: amount.value(),
            available: balance,
        });
    }
    Ok(())
}
