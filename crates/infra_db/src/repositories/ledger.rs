//! Ledger repository implementation
//!
//! Entries are append-only apart from administrative corrections. Amounts
//! are stored unsigned; the kind carries the sign.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repositories::participant::ParticipantKindDb;

pub(crate) const ENTRY_COLUMNS: &str =
    "entry_id, owner_id, owner_kind, kind, amount, occurred_at, description, period_id";

/// Repository for ledger entries
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, row: &LedgerEntryRow) -> Result<LedgerEntryRow, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        insert_entry(&mut *conn, row).await
    }

    pub async fn get_by_id(&self, entry_id: Uuid) -> Result<LedgerEntryRow, DatabaseError> {
        let sql = format!("SELECT {} FROM ledger_entries WHERE entry_id = $1", ENTRY_COLUMNS);
        sqlx::query_as::<_, LedgerEntryRow>(&sql)
            .bind(entry_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("LedgerEntry", entry_id))
    }

    /// Entries of one owner in chronological order, optionally of one kind
    pub async fn list_for_owner(
        &self,
        owner_id: Uuid,
        owner_kind: ParticipantKindDb,
        kind: Option<EntryKindDb>,
    ) -> Result<Vec<LedgerEntryRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM ledger_entries
            WHERE owner_id = $1 AND owner_kind = $2
              AND ($3::entry_kind IS NULL OR kind = $3)
            ORDER BY occurred_at, entry_id
            "#,
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, LedgerEntryRow>(&sql)
            .bind(owner_id)
            .bind(owner_kind)
            .bind(kind)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_all(&self) -> Result<Vec<LedgerEntryRow>, DatabaseError> {
        let sql = format!("SELECT {} FROM ledger_entries ORDER BY occurred_at, entry_id", ENTRY_COLUMNS);
        let rows = sqlx::query_as::<_, LedgerEntryRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_for_period(&self, period_id: Uuid) -> Result<Vec<LedgerEntryRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM ledger_entries WHERE period_id = $1 ORDER BY occurred_at, entry_id",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, LedgerEntryRow>(&sql)
            .bind(period_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn delete(&self, entry_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM ledger_entries WHERE entry_id = $1")
            .bind(entry_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("LedgerEntry", entry_id));
        }
        Ok(())
    }

    /// Rewrites the amount and description of an entry
    pub async fn correct(
        &self,
        entry_id: Uuid,
        amount: Decimal,
        description: &str,
    ) -> Result<LedgerEntryRow, DatabaseError> {
        let sql = format!(
            "UPDATE ledger_entries SET amount = $2, description = $3 WHERE entry_id = $1 RETURNING {}",
            ENTRY_COLUMNS
        );
        sqlx::query_as::<_, LedgerEntryRow>(&sql)
            .bind(entry_id)
            .bind(amount)
            .bind(description)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("LedgerEntry", entry_id))
    }
}

/// Inserts one entry on an open connection or transaction
pub(crate) async fn insert_entry(
    conn: &mut PgConnection,
    row: &LedgerEntryRow,
) -> Result<LedgerEntryRow, DatabaseError> {
    let sql = format!(
        "INSERT INTO ledger_entries ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {cols}",
        cols = ENTRY_COLUMNS
    );
    let inserted = sqlx::query_as::<_, LedgerEntryRow>(&sql)
        .bind(row.entry_id)
        .bind(row.owner_id)
        .bind(row.owner_kind)
        .bind(row.kind)
        .bind(row.amount)
        .bind(row.occurred_at)
        .bind(&row.description)
        .bind(row.period_id)
        .fetch_one(conn)
        .await?;
    Ok(inserted)
}

/// Database row for a ledger entry
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LedgerEntryRow {
    pub entry_id: Uuid,
    pub owner_id: Uuid,
    pub owner_kind: ParticipantKindDb,
    pub kind: EntryKindDb,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub description: String,
    pub period_id: Option<Uuid>,
}

/// Entry kind enum matching the database type
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "entry_kind", rename_all = "snake_case")]
pub enum EntryKindDb {
    Deposit,
    Withdrawal,
    Profit,
}
