//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for CVM Capital using SQLx.
//!
//! # Architecture
//!
//! Repositories own the SQL for one table each and return plain row
//! structs. `PostgresStore` sits on top of them and implements every domain
//! port, converting rows to domain types and database errors to
//! `PortError`.
//!
//! # Consistency
//!
//! The schema repeats the domain invariants as constraints:
//! - ledger amounts are positive and only profit entries carry a period
//! - period sequence numbers are unique, ranges never overlap, and at most
//!   one period is pending
//! - each owner has at most one pending request per kind
//! - split configurations sum to 100
//!
//! Cascading deletes, request approval and the distribution commit each run
//! in one transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/cvm_capital")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, DatabaseConfig, create_pool, create_pool_from_url, run_migrations};
pub use error::DatabaseError;
pub use adapters::PostgresStore;
