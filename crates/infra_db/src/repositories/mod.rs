//! Repository implementations
//!
//! Each repository owns the SQL for one table and maps rows to plain row
//! structs. Queries are built at runtime with `sqlx::query_as` and
//! `FromRow`, so building the crate does not need a live database.
//! Multi-table writes (cascading deletes, the distribution commit, request
//! approval) run in a single transaction.

pub mod participant;
pub mod ledger;
pub mod period;
pub mod configuration;
pub mod request;
pub mod notification;

pub use participant::{ParticipantRepository, ParticipantRow, ParticipantKindDb};
pub use ledger::{LedgerRepository, LedgerEntryRow, EntryKindDb};
pub use period::{PeriodRepository, PeriodRow, ProcessingUpdate};
pub use configuration::{ConfigurationRepository, ConfigurationRow};
pub use request::{RequestRepository, RequestRow, RequestKindDb, RequestStatusDb};
pub use notification::{NotificationRepository, NotificationRow, SeverityDb};
