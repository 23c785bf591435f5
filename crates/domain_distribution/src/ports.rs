//! Distribution Ports
//!
//! Storage interfaces for periods, split configurations and the atomic
//! distribution commit. The PostgreSQL adapter in `infra_db` implements them
//! with transactions and constraints; the in-memory store (`mock` feature)
//! implements them behind a single lock.

use async_trait::async_trait;

use core_kernel::{DomainPort, PeriodId, PortError};
use domain_ledger::{LedgerEntry, NewLedgerEntry};

use crate::period::{AccountingPeriod, ProcessingRecord};
use crate::split::SplitConfiguration;

/// Port for accounting periods
#[async_trait]
pub trait PeriodPort: DomainPort {
    /// Lists periods ordered by sequence number
    async fn list_periods(&self) -> Result<Vec<AccountingPeriod>, PortError>;

    async fn get_period(&self, id: PeriodId) -> Result<AccountingPeriod, PortError>;

    /// Stores a new pending period
    ///
    /// The store itself enforces the period invariants and fails with
    /// `PortError::Conflict` if another period is pending, the sequence
    /// number is taken, or the date range overlaps an existing period.
    async fn insert_period(&self, period: AccountingPeriod) -> Result<AccountingPeriod, PortError>;

    /// Deletes a period and every ledger entry tagged with it, atomically
    ///
    /// Returns the number of ledger entries removed.
    async fn delete_period(&self, id: PeriodId) -> Result<u64, PortError>;
}

/// Port for the append-only split configuration history
#[async_trait]
pub trait ConfigurationPort: DomainPort {
    /// The most recently saved configuration
    async fn current_configuration(&self) -> Result<Option<SplitConfiguration>, PortError>;

    async fn append_configuration(&self, configuration: SplitConfiguration) -> Result<SplitConfiguration, PortError>;

    /// Every configuration, newest first
    async fn configuration_history(&self) -> Result<Vec<SplitConfiguration>, PortError>;
}

/// Everything a distribution commit writes
#[derive(Debug, Clone)]
pub struct CommitDistribution {
    pub period_id: PeriodId,
    pub record: ProcessingRecord,
    /// Profit entries, each tagged with `period_id`
    pub entries: Vec<NewLedgerEntry>,
}

/// What a successful commit stored
#[derive(Debug, Clone)]
pub struct CommittedDistribution {
    pub period: AccountingPeriod,
    pub entries: Vec<LedgerEntry>,
}

/// Port for the all-or-nothing distribution commit
#[async_trait]
pub trait DistributionStore: DomainPort {
    /// Flips the period to processed and appends the profit entries as one
    /// unit
    ///
    /// The processed check and the flag write are a single atomic step: if
    /// the period is already processed the call fails with
    /// `PortError::Conflict` and nothing is written. Any other failure leaves
    /// the period pending and writes no entries.
    async fn commit_distribution(&self, commit: CommitDistribution) -> Result<CommittedDistribution, PortError>;
}
