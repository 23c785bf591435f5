//! Core Kernel - Foundational types shared by every CVM Capital crate
//!
//! This crate provides the building blocks used across the domain modules:
//! - Fixed-precision amounts and percentages (no floating point anywhere)
//! - Even and weighted allocation helpers that never lose a cent
//! - Inclusive date ranges for accounting periods
//! - Strongly-typed identifiers
//! - The port vocabulary (`PortError`, `DomainPort`, health checks)

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{
    Amount, Percentage, MoneyError, MONEY_PRECISION, PERCENTAGE_PRECISION, round_money, allocate_even,
    allocate_by_weights,
};
pub use temporal::{DateRange, TemporalError};
pub use identifiers::{
    ParticipantId, LedgerEntryId, PeriodId, ConfigurationId,
    RequestId, NotificationId, CommitId,
};
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable,
    OperationMetadata,
};
pub use error::CoreError;
