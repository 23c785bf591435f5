//! PostgreSQL ledger and request stores

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, instrument};

use core_kernel::{Amount, LedgerEntryId, ParticipantId, PeriodId, PortError, RequestId};
use domain_ledger::{
    ApprovalRequest, EntryKind, LedgerEntry, LedgerPort, NewLedgerEntry, RequestKind,
    RequestPort, RequestQuery, RequestStatus,
};
use domain_participant::OwnerRef;

use super::{corrupt, db_to_port_error, kind_from_db, kind_to_db, PostgresStore};
use crate::repositories::{EntryKindDb, LedgerEntryRow, RequestKindDb, RequestRow, RequestStatusDb};

#[async_trait]
impl LedgerPort for PostgresStore {
    #[instrument(skip(self, entry), fields(owner = %entry.owner, kind = %entry.kind))]
    async fn append_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, PortError> {
        entry
            .validate()
            .map_err(|e| PortError::validation(e.to_string()))?;
        let row = self
            .ledger
            .insert(&entry_to_row(&entry.into_entry()))
            .await
            .map_err(db_to_port_error)?;
        row_to_entry(row)
    }

    #[instrument(skip(self), fields(entry_id = %id))]
    async fn get_entry(&self, id: LedgerEntryId) -> Result<LedgerEntry, PortError> {
        let row = self.ledger.get_by_id(id.into()).await.map_err(db_to_port_error)?;
        row_to_entry(row)
    }

    #[instrument(skip(self), fields(owner = %owner))]
    async fn list_entries(
        &self,
        owner: OwnerRef,
        kind: Option<EntryKind>,
    ) -> Result<Vec<LedgerEntry>, PortError> {
        debug!("Listing owner entries");
        let rows = self
            .ledger
            .list_for_owner(owner.id.into(), kind_to_db(owner.kind), kind.map(entry_kind_to_db))
            .await
            .map_err(db_to_port_error)?;
        rows.into_iter().map(row_to_entry).collect()
    }

    #[instrument(skip(self))]
    async fn list_all_entries(&self) -> Result<Vec<LedgerEntry>, PortError> {
        let rows = self.ledger.list_all().await.map_err(db_to_port_error)?;
        rows.into_iter().map(row_to_entry).collect()
    }

    #[instrument(skip(self), fields(period_id = %period_id))]
    async fn list_period_entries(&self, period_id: PeriodId) -> Result<Vec<LedgerEntry>, PortError> {
        let rows = self
            .ledger
            .list_for_period(period_id.into())
            .await
            .map_err(db_to_port_error)?;
        rows.into_iter().map(row_to_entry).collect()
    }

    #[instrument(skip(self), fields(entry_id = %id))]
    async fn delete_entry(&self, id: LedgerEntryId) -> Result<(), PortError> {
        self.ledger.delete(id.into()).await.map_err(db_to_port_error)?;
        info!("Ledger entry deleted");
        Ok(())
    }

    #[instrument(skip(self, description), fields(entry_id = %id, amount = %amount))]
    async fn correct_entry(
        &self,
        id: LedgerEntryId,
        amount: Amount,
        description: String,
    ) -> Result<LedgerEntry, PortError> {
        let row = self
            .ledger
            .correct(id.into(), amount.value(), &description)
            .await
            .map_err(db_to_port_error)?;
        info!("Ledger entry corrected");
        row_to_entry(row)
    }
}

#[async_trait]
impl RequestPort for PostgresStore {
    #[instrument(skip(self, request), fields(request_id = %request.id, owner = %request.owner))]
    async fn insert_request(&self, request: ApprovalRequest) -> Result<ApprovalRequest, PortError> {
        let row = self
            .requests
            .insert(&request_to_row(&request))
            .await
            .map_err(db_to_port_error)?;
        row_to_request(row)
    }

    #[instrument(skip(self), fields(request_id = %id))]
    async fn get_request(&self, id: RequestId) -> Result<ApprovalRequest, PortError> {
        let row = self.requests.get_by_id(id.into()).await.map_err(db_to_port_error)?;
        row_to_request(row)
    }

    #[instrument(skip(self))]
    async fn list_requests(&self, query: RequestQuery) -> Result<Vec<ApprovalRequest>, PortError> {
        let rows = self
            .requests
            .find(
                query.owner.map(|o| o.id.into()),
                query.kind.map(request_kind_to_db),
                query.pending_only,
            )
            .await
            .map_err(db_to_port_error)?;
        rows.into_iter()
            .map(row_to_request)
            .filter(|r| r.as_ref().map_or(true, |r| query.matches(r)))
            .collect()
    }

    #[instrument(skip(self, entry), fields(request_id = %id))]
    async fn approve_request(
        &self,
        id: RequestId,
        entry: NewLedgerEntry,
        decided_by: String,
    ) -> Result<(ApprovalRequest, LedgerEntry), PortError> {
        entry
            .validate()
            .map_err(|e| PortError::validation(e.to_string()))?;
        let (request, entry) = self
            .requests
            .approve(id.into(), &entry_to_row(&entry.into_entry()), Utc::now(), &decided_by)
            .await
            .map_err(db_to_port_error)?;
        Ok((row_to_request(request)?, row_to_entry(entry)?))
    }

    #[instrument(skip(self, reason), fields(request_id = %id))]
    async fn reject_request(
        &self,
        id: RequestId,
        reason: String,
        decided_by: String,
    ) -> Result<ApprovalRequest, PortError> {
        let row = self
            .requests
            .reject(id.into(), &reason, Utc::now(), &decided_by)
            .await
            .map_err(db_to_port_error)?;
        row_to_request(row)
    }
}

pub(crate) fn entry_to_row(entry: &LedgerEntry) -> LedgerEntryRow {
    LedgerEntryRow {
        entry_id: entry.id.into(),
        owner_id: entry.owner.id.into(),
        owner_kind: kind_to_db(entry.owner.kind),
        kind: entry_kind_to_db(entry.kind),
        amount: entry.amount.value(),
        occurred_at: entry.timestamp,
        description: entry.description.clone(),
        period_id: entry.period_id.map(Into::into),
    }
}

pub(crate) fn row_to_entry(row: LedgerEntryRow) -> Result<LedgerEntry, PortError> {
    Ok(LedgerEntry {
        id: LedgerEntryId::from_uuid(row.entry_id),
        owner: OwnerRef {
            id: ParticipantId::from_uuid(row.owner_id),
            kind: kind_from_db(row.owner_kind),
        },
        amount: Amount::new(row.amount).map_err(corrupt)?,
        kind: match row.kind {
            EntryKindDb::Deposit => EntryKind::Deposit,
            EntryKindDb::Withdrawal => EntryKind::Withdrawal,
            EntryKindDb::Profit => EntryKind::Profit,
        },
        timestamp: row.occurred_at,
        description: row.description,
        period_id: row.period_id.map(PeriodId::from_uuid),
    })
}

fn entry_kind_to_db(kind: EntryKind) -> EntryKindDb {
    match kind {
        EntryKind::Deposit => EntryKindDb::Deposit,
        EntryKind::Withdrawal => EntryKindDb::Withdrawal,
        EntryKind::Profit => EntryKindDb::Profit,
    }
}

fn request_kind_to_db(kind: RequestKind) -> RequestKindDb {
    match kind {
        RequestKind::Deposit => RequestKindDb::Deposit,
        RequestKind::Withdrawal => RequestKindDb::Withdrawal,
    }
}

fn request_to_row(request: &ApprovalRequest) -> RequestRow {
    let (status, entry_id, rejection_reason) = match &request.status {
        RequestStatus::Pending => (RequestStatusDb::Pending, None, None),
        RequestStatus::Approved { entry_id } => (RequestStatusDb::Approved, Some((*entry_id).into()), None),
        RequestStatus::Rejected { reason } => (RequestStatusDb::Rejected, None, Some(reason.clone())),
    };
    RequestRow {
        request_id: request.id.into(),
        owner_id: request.owner.id.into(),
        owner_kind: kind_to_db(request.owner.kind),
        kind: request_kind_to_db(request.kind),
        amount: request.amount.value(),
        note: request.note.clone(),
        status,
        entry_id,
        rejection_reason,
        created_at: request.created_at,
        decided_at: request.decided_at,
        decided_by: request.decided_by.clone(),
    }
}

fn row_to_request(row: RequestRow) -> Result<ApprovalRequest, PortError> {
    let status = match (row.status, row.entry_id, row.rejection_reason) {
        (RequestStatusDb::Pending, _, _) => RequestStatus::Pending,
        (RequestStatusDb::Approved, Some(entry_id), _) => RequestStatus::Approved {
            entry_id: LedgerEntryId::from_uuid(entry_id),
        },
        (RequestStatusDb::Rejected, _, Some(reason)) => RequestStatus::Rejected { reason },
        (status, _, _) => {
            return Err(corrupt(format!(
                "request {} is {} without its decision data",
                row.request_id,
                status.as_str()
            )))
        }
    };

    Ok(ApprovalRequest {
        id: RequestId::from_uuid(row.request_id),
        owner: OwnerRef {
            id: ParticipantId::from_uuid(row.owner_id),
            kind: kind_from_db(row.owner_kind),
        },
        kind: match row.kind {
            RequestKindDb::Deposit => RequestKind::Deposit,
            RequestKindDb::Withdrawal => RequestKind::Withdrawal,
        },
        amount: Amount::new(row.amount).map_err(corrupt)?,
        note: row.note,
        status,
        created_at: row.created_at,
        decided_at: row.decided_at,
        decided_by: row.decided_by,
    })
}
