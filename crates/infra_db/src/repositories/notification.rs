//! Notification outbox repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repositories::participant::ParticipantKindDb;

const NOTIFICATION_COLUMNS: &str =
    "notification_id, owner_id, owner_kind, title, message, severity, created_at";

#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, row: &NotificationRow) -> Result<NotificationRow, DatabaseError> {
        let sql = format!(
            "INSERT INTO notifications ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {cols}",
            cols = NOTIFICATION_COLUMNS
        );
        let inserted = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(row.notification_id)
            .bind(row.owner_id)
            .bind(row.owner_kind)
            .bind(&row.title)
            .bind(&row.message)
            .bind(row.severity)
            .bind(row.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(inserted)
    }

    /// Notifications of one owner, newest first
    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<NotificationRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM notifications WHERE owner_id = $1 ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationRow {
    pub notification_id: Uuid,
    pub owner_id: Uuid,
    pub owner_kind: ParticipantKindDb,
    pub title: String,
    pub message: String,
    pub severity: SeverityDb,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "notification_severity", rename_all = "snake_case")]
pub enum SeverityDb {
    Info,
    Warning,
    Critical,
}
