//! PostgreSQL test harness
//!
//! Every `TestDatabase` is a throwaway `postgres:16-alpine` container with
//! the migration applied. Tests built on it need a Docker daemon and are
//! declared with [`db_test!`](crate::db_test), which marks them ignored.

use std::sync::Arc;
use std::time::Duration;

use infra_db::PostgresStore;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "cvm";
const POSTGRES_PASSWORD: &str = "cvm";
const POSTGRES_DB: &str = "cvm_capital_test";

/// Tables in delete order, children first
const TABLES: [&str; 6] = [
    "notifications",
    "approval_requests",
    "ledger_entries",
    "accounting_periods",
    "distribution_configurations",
    "participants",
];

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A running PostgreSQL container with the schema applied
pub struct TestDatabase {
    _container: ContainerAsync<GenericImage>,
    pub url: String,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a container and applies the migration
    pub async fn new() -> Result<Self, BoxError> {
        let container = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stderr("database system is ready to accept connections"))
            .with_env_var("POSTGRES_USER", POSTGRES_USER)
            .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
            .with_env_var("POSTGRES_DB", POSTGRES_DB)
            .start()
            .await?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(5432).await?;
        let url = format!(
            "postgres://{}:{}@{}:{}/{}",
            POSTGRES_USER, POSTGRES_PASSWORD, host, port, POSTGRES_DB
        );

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await?;

        let schema = include_str!("../../../migrations/20240101_000001_initial_schema.sql");
        sqlx::raw_sql(schema).execute(&pool).await?;

        Ok(Self {
            _container: container,
            url,
            pool,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// A store over this database, implementing every port
    pub fn store(&self) -> Arc<PostgresStore> {
        Arc::new(PostgresStore::new(self.pool.clone()))
    }

    /// Empties every table, keeping the schema
    pub async fn clear_data(&self) -> Result<(), BoxError> {
        sqlx::raw_sql(&format!("TRUNCATE TABLE {} CASCADE", TABLES.join(", ")))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Starts a database dedicated to one test
pub async fn create_isolated_test_database() -> Result<TestDatabase, BoxError> {
    TestDatabase::new().await
}

/// Declares a database test against a fresh container
///
/// ```rust,ignore
/// db_test!(commits_once, |db, store| {
///     let periods = store.list_periods().await.unwrap();
///     assert!(periods.is_empty());
/// });
/// ```
#[macro_export]
macro_rules! db_test {
    ($name:ident, |$db:ident, $store:ident| $body:block) => {
        #[tokio::test]
        #[ignore = "requires a Docker daemon"]
        async fn $name() {
            let $db = $crate::database::create_isolated_test_database()
                .await
                .expect("Failed to create test database");
            let $store = $db.store();
            $body
        }
    };
}

/// Counts the rows of a table
pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("Failed to count rows in {}: {}", table, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_listed_children_first() {
        let position = |t: &str| TABLES.iter().position(|x| *x == t).unwrap();
        assert!(position("ledger_entries") < position("participants"));
        assert!(position("ledger_entries") < position("accounting_periods"));
        assert!(position("notifications") < position("participants"));
    }
}
