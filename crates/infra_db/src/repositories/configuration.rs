//! Split configuration repository
//!
//! Configurations are append-only; `revision` orders them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const CONFIGURATION_COLUMNS: &str =
    "configuration_id, proportional_percentage, exclusive_percentage, description, created_at, created_by";

#[derive(Debug, Clone)]
pub struct ConfigurationRepository {
    pool: PgPool,
}

impl ConfigurationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn current(&self) -> Result<Option<ConfigurationRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM distribution_configurations ORDER BY revision DESC LIMIT 1",
            CONFIGURATION_COLUMNS
        );
        let row = sqlx::query_as::<_, ConfigurationRow>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn append(&self, row: &ConfigurationRow) -> Result<ConfigurationRow, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO distribution_configurations
                (configuration_id, proportional_percentage, exclusive_percentage, description, created_at, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CONFIGURATION_COLUMNS
        );
        let inserted = sqlx::query_as::<_, ConfigurationRow>(&sql)
            .bind(row.configuration_id)
            .bind(row.proportional_percentage)
            .bind(row.exclusive_percentage)
            .bind(&row.description)
            .bind(row.created_at)
            .bind(&row.created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(inserted)
    }

    /// Every configuration, newest first
    pub async fn history(&self) -> Result<Vec<ConfigurationRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM distribution_configurations ORDER BY revision DESC",
            CONFIGURATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, ConfigurationRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConfigurationRow {
    pub configuration_id: Uuid,
    pub proportional_percentage: Decimal,
    pub exclusive_percentage: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}
