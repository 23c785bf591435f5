//! Accounting period repository implementation
//!
//! The table constraints keep sequence numbers unique, date ranges disjoint
//! and at most one period pending. The distribution commit flips the
//! processed flag with a conditional update, so of two concurrent commits
//! only one matches the row.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repositories::ledger::{insert_entry, LedgerEntryRow};

const PERIOD_COLUMNS: &str = r#"
    period_id, sequence_number, label, start_date, end_date,
    processed, processed_at, processed_by, gross_profit_amount,
    profit_percentage, proportional_percentage, exclusive_percentage,
    commit_id, created_at
"#;

/// Repository for accounting periods and distribution commits
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    pool: PgPool,
}

impl PeriodRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<PeriodRow>, DatabaseError> {
        let sql = format!("SELECT {} FROM accounting_periods ORDER BY sequence_number", PERIOD_COLUMNS);
        let rows = sqlx::query_as::<_, PeriodRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, period_id: Uuid) -> Result<PeriodRow, DatabaseError> {
        let sql = format!("SELECT {} FROM accounting_periods WHERE period_id = $1", PERIOD_COLUMNS);
        sqlx::query_as::<_, PeriodRow>(&sql)
            .bind(period_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("AccountingPeriod", period_id))
    }

    /// Inserts a pending period
    ///
    /// Fails with `DuplicateEntry` when the sequence number is taken or a
    /// period is already pending, and `RangeOverlap` when the dates overlap.
    pub async fn insert(&self, row: &PeriodRow) -> Result<PeriodRow, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO accounting_periods (period_id, sequence_number, label, start_date, end_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PERIOD_COLUMNS
        );
        let inserted = sqlx::query_as::<_, PeriodRow>(&sql)
            .bind(row.period_id)
            .bind(row.sequence_number)
            .bind(&row.label)
            .bind(row.start_date)
            .bind(row.end_date)
            .bind(row.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(inserted)
    }

    /// Deletes a period and every ledger entry tagged with it
    ///
    /// Returns the number of ledger entries removed.
    pub async fn delete_cascade(&self, period_id: Uuid) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, Uuid>("SELECT period_id FROM accounting_periods WHERE period_id = $1 FOR UPDATE")
            .bind(period_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::not_found("AccountingPeriod", period_id))?;

        let removed = sqlx::query("DELETE FROM ledger_entries WHERE period_id = $1")
            .bind(period_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM accounting_periods WHERE period_id = $1")
            .bind(period_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(removed)
    }

    /// Marks a pending period processed and appends its profit entries in
    /// one transaction
    ///
    /// Fails with `Conflict` if the period is already processed. Any error
    /// rolls the whole transaction back.
    pub async fn commit_distribution(
        &self,
        period_id: Uuid,
        processing: &ProcessingUpdate,
        entries: &[LedgerEntryRow],
    ) -> Result<(PeriodRow, Vec<LedgerEntryRow>), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE accounting_periods
            SET processed = TRUE,
                processed_at = $2,
                processed_by = $3,
                gross_profit_amount = $4,
                profit_percentage = $5,
                proportional_percentage = $6,
                exclusive_percentage = $7,
                commit_id = $8
            WHERE period_id = $1 AND NOT processed
            RETURNING {}
            "#,
            PERIOD_COLUMNS
        );
        let period = sqlx::query_as::<_, PeriodRow>(&sql)
            .bind(period_id)
            .bind(processing.processed_at)
            .bind(&processing.processed_by)
            .bind(processing.gross_profit_amount)
            .bind(processing.profit_percentage)
            .bind(processing.proportional_percentage)
            .bind(processing.exclusive_percentage)
            .bind(processing.commit_id)
            .fetch_optional(&mut *tx)
            .await?;

        let period = match period {
            Some(period) => period,
            None => {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM accounting_periods WHERE period_id = $1)",
                )
                .bind(period_id)
                .fetch_one(&mut *tx)
                .await?;
                return Err(if exists {
                    DatabaseError::Conflict(format!("Period {} is already processed", period_id))
                } else {
                    DatabaseError::not_found("AccountingPeriod", period_id)
                });
            }
        };

        let mut written = Vec::with_capacity(entries.len());
        for entry in entries {
            written.push(insert_entry(&mut *tx, entry).await?);
        }

        tx.commit().await?;
        Ok((period, written))
    }
}

/// Database row for an accounting period
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PeriodRow {
    pub period_id: Uuid,
    pub sequence_number: i32,
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub processed: bool,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<String>,
    pub gross_profit_amount: Option<Decimal>,
    pub profit_percentage: Option<Decimal>,
    pub proportional_percentage: Option<Decimal>,
    pub exclusive_percentage: Option<Decimal>,
    pub commit_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Columns written when a period is processed
#[derive(Debug, Clone)]
pub struct ProcessingUpdate {
    pub commit_id: Uuid,
    pub processed_at: DateTime<Utc>,
    pub processed_by: String,
    pub gross_profit_amount: Decimal,
    pub profit_percentage: Decimal,
    pub proportional_percentage: Decimal,
    pub exclusive_percentage: Decimal,
}
