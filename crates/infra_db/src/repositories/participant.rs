//! Participant repository implementation
//!
//! Investors and partners live in one table distinguished by `kind`. A
//! participant delete removes its requests and ledger entries in the same
//! transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const PARTICIPANT_COLUMNS: &str = "participant_id, kind, name, email, is_active, created_at";

/// Repository for the participant directory
#[derive(Debug, Clone)]
pub struct ParticipantRepository {
    pool: PgPool,
}

impl ParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, row: &ParticipantRow) -> Result<ParticipantRow, DatabaseError> {
        let sql = format!(
            "INSERT INTO participants ({cols}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {cols}",
            cols = PARTICIPANT_COLUMNS
        );
        let inserted = sqlx::query_as::<_, ParticipantRow>(&sql)
            .bind(row.participant_id)
            .bind(row.kind)
            .bind(&row.name)
            .bind(&row.email)
            .bind(row.is_active)
            .bind(row.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(inserted)
    }

    pub async fn get_by_id(&self, participant_id: Uuid) -> Result<ParticipantRow, DatabaseError> {
        let sql = format!("SELECT {} FROM participants WHERE participant_id = $1", PARTICIPANT_COLUMNS);
        sqlx::query_as::<_, ParticipantRow>(&sql)
            .bind(participant_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Participant", participant_id))
    }

    /// Lists participants in creation order
    ///
    /// `eligible_only` keeps every investor and the active partners.
    pub async fn find(
        &self,
        kind: Option<ParticipantKindDb>,
        eligible_only: bool,
    ) -> Result<Vec<ParticipantRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM participants
            WHERE ($1::participant_kind IS NULL OR kind = $1)
              AND (NOT $2 OR kind = 'investor' OR is_active)
            ORDER BY created_at, participant_id
            "#,
            PARTICIPANT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ParticipantRow>(&sql)
            .bind(kind)
            .bind(eligible_only)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn set_active(&self, participant_id: Uuid, active: bool) -> Result<ParticipantRow, DatabaseError> {
        let sql = format!(
            "UPDATE participants SET is_active = $2 WHERE participant_id = $1 RETURNING {}",
            PARTICIPANT_COLUMNS
        );
        sqlx::query_as::<_, ParticipantRow>(&sql)
            .bind(participant_id)
            .bind(active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Participant", participant_id))
    }

    /// Deletes a participant with its requests and ledger entries
    ///
    /// Returns the number of ledger entries removed.
    pub async fn delete_cascade(&self, participant_id: Uuid) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, Uuid>("SELECT participant_id FROM participants WHERE participant_id = $1 FOR UPDATE")
            .bind(participant_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Participant", participant_id))?;

        sqlx::query("DELETE FROM approval_requests WHERE owner_id = $1")
            .bind(participant_id)
            .execute(&mut *tx)
            .await?;

        let removed = sqlx::query("DELETE FROM ledger_entries WHERE owner_id = $1")
            .bind(participant_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM participants WHERE participant_id = $1")
            .bind(participant_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(removed)
    }
}

/// Database row for a participant
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipantRow {
    pub participant_id: Uuid,
    pub kind: ParticipantKindDb,
    pub name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Participant kind enum matching the database type
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "participant_kind", rename_all = "snake_case")]
pub enum ParticipantKindDb {
    Investor,
    Partner,
}
