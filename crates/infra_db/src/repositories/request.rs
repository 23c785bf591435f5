//! Approval request repository
//!
//! A partial unique index allows one pending request per owner and kind.
//! Decisions use `WHERE status = 'pending'` so a request is decided once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repositories::ledger::{insert_entry, LedgerEntryRow};
use crate::repositories::participant::ParticipantKindDb;

const REQUEST_COLUMNS: &str = r#"
    request_id, owner_id, owner_kind, kind, amount, note, status,
    entry_id, rejection_reason, created_at, decided_at, decided_by
"#;

#[derive(Debug, Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, row: &RequestRow) -> Result<RequestRow, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO approval_requests (request_id, owner_id, owner_kind, kind, amount, note, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        );
        let inserted = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(row.request_id)
            .bind(row.owner_id)
            .bind(row.owner_kind)
            .bind(row.kind)
            .bind(row.amount)
            .bind(&row.note)
            .bind(row.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(inserted)
    }

    pub async fn get_by_id(&self, request_id: Uuid) -> Result<RequestRow, DatabaseError> {
        let sql = format!("SELECT {} FROM approval_requests WHERE request_id = $1", REQUEST_COLUMNS);
        sqlx::query_as::<_, RequestRow>(&sql)
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("ApprovalRequest", request_id))
    }

    /// Filtered listing, newest first
    pub async fn find(
        &self,
        owner_id: Option<Uuid>,
        kind: Option<RequestKindDb>,
        pending_only: bool,
    ) -> Result<Vec<RequestRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM approval_requests
            WHERE ($1::uuid IS NULL OR owner_id = $1)
              AND ($2::request_kind IS NULL OR kind = $2)
              AND (NOT $3 OR status = 'pending')
            ORDER BY created_at DESC, request_id DESC
            "#,
            REQUEST_COLUMNS
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(owner_id)
            .bind(kind)
            .bind(pending_only)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Marks a pending request approved and writes its ledger entry in one
    /// transaction
    pub async fn approve(
        &self,
        request_id: Uuid,
        entry: &LedgerEntryRow,
        decided_at: DateTime<Utc>,
        decided_by: &str,
    ) -> Result<(RequestRow, LedgerEntryRow), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE approval_requests
            SET status = 'approved', entry_id = $2, decided_at = $3, decided_by = $4
            WHERE request_id = $1 AND status = 'pending'
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        );
        let request = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(request_id)
            .bind(entry.entry_id)
            .bind(decided_at)
            .bind(decided_by)
            .fetch_optional(&mut *tx)
            .await?;
        let request = match request {
            Some(request) => request,
            None => return Err(undecidable(&mut *tx, request_id).await),
        };

        let entry = insert_entry(&mut *tx, entry).await?;
        tx.commit().await?;
        Ok((request, entry))
    }

    pub async fn reject(
        &self,
        request_id: Uuid,
        reason: &str,
        decided_at: DateTime<Utc>,
        decided_by: &str,
    ) -> Result<RequestRow, DatabaseError> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!(
            r#"
            UPDATE approval_requests
            SET status = 'rejected', rejection_reason = $2, decided_at = $3, decided_by = $4
            WHERE request_id = $1 AND status = 'pending'
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        );
        let request = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(request_id)
            .bind(reason)
            .bind(decided_at)
            .bind(decided_by)
            .fetch_optional(&mut *conn)
            .await?;
        match request {
            Some(request) => Ok(request),
            None => Err(undecidable(&mut *conn, request_id).await),
        }
    }
}

/// Why a decision matched no pending row: missing or already decided
async fn undecidable(conn: &mut PgConnection, request_id: Uuid) -> DatabaseError {
    let status = sqlx::query_scalar::<_, RequestStatusDb>(
        "SELECT status FROM approval_requests WHERE request_id = $1",
    )
    .bind(request_id)
    .fetch_optional(conn)
    .await;

    match status {
        Ok(Some(status)) => DatabaseError::Conflict(format!(
            "Request {} is already {}",
            request_id,
            status.as_str()
        )),
        Ok(None) => DatabaseError::not_found("ApprovalRequest", request_id),
        Err(e) => DatabaseError::from(e),
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RequestRow {
    pub request_id: Uuid,
    pub owner_id: Uuid,
    pub owner_kind: ParticipantKindDb,
    pub kind: RequestKindDb,
    pub amount: Decimal,
    pub note: Option<String>,
    pub status: RequestStatusDb,
    pub entry_id: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_kind", rename_all = "snake_case")]
pub enum RequestKindDb {
    Deposit,
    Withdrawal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
pub enum RequestStatusDb {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatusDb {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatusDb::Pending => "pending",
            RequestStatusDb::Approved => "approved",
            RequestStatusDb::Rejected => "rejected",
        }
    }
}
