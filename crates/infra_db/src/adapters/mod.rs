//! Domain Adapters
//!
//! `PostgresStore` implements every domain port on top of the repositories:
//! the participant directory, the ledger and request stores, periods,
//! split configurations, the distribution commit and the notification sink.
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresStore};
//! use domain_distribution::{DistributionEngine, NotificationSink};
//! use std::sync::Arc;
//!
//! let pool = create_pool(DatabaseConfig::new(url)).await?;
//! run_migrations(&pool).await?;
//! let store = Arc::new(PostgresStore::new(pool));
//! let engine = DistributionEngine::from_store(store.clone(), store);
//! ```

pub mod participant;
pub mod ledger;
pub mod distribution;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_participant::ParticipantKind;

use crate::error::DatabaseError;
use crate::repositories::{
    ConfigurationRepository, LedgerRepository, NotificationRepository, ParticipantKindDb,
    ParticipantRepository, PeriodRepository, RequestRepository,
};

const ADAPTER_ID: &str = "postgres-store";

/// PostgreSQL-backed implementation of every store port
///
/// Database errors are translated to `PortError` through
/// `From<DatabaseError>`: missing rows become `NotFound`, unique and
/// exclusion violations become `Conflict`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    participants: ParticipantRepository,
    ledger: LedgerRepository,
    periods: PeriodRepository,
    configurations: ConfigurationRepository,
    requests: RequestRepository,
    notifications: NotificationRepository,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            participants: ParticipantRepository::new(pool.clone()),
            ledger: LedgerRepository::new(pool.clone()),
            periods: PeriodRepository::new(pool.clone()),
            configurations: ConfigurationRepository::new(pool.clone()),
            requests: RequestRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PostgresStore {}

#[async_trait]
impl HealthCheckable for PostgresStore {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };
        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

fn db_to_port_error(error: DatabaseError) -> PortError {
    PortError::from(error)
}

fn kind_to_db(kind: ParticipantKind) -> ParticipantKindDb {
    match kind {
        ParticipantKind::Investor => ParticipantKindDb::Investor,
        ParticipantKind::Partner => ParticipantKindDb::Partner,
    }
}

fn kind_from_db(kind: ParticipantKindDb) -> ParticipantKind {
    match kind {
        ParticipantKindDb::Investor => ParticipantKind::Investor,
        ParticipantKindDb::Partner => ParticipantKind::Partner,
    }
}

fn corrupt(error: impl std::fmt::Display) -> PortError {
    db_to_port_error(DatabaseError::corrupt(error))
}
