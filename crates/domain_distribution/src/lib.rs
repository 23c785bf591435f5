//! Distribution Domain
//!
//! Monthly profit distribution for CVM Capital.
//!
//! # Key Concepts
//!
//! - **Accounting period**: a numbered, non-overlapping date range ("month").
//!   At most one period is pending; it becomes processed exactly once.
//! - **Split**: how gross profit divides between the *proportional* pool
//!   (shared by capital weight among investors and active partners) and the
//!   *exclusive* pool (shared evenly among active partners). The two
//!   percentages always sum to 100.
//! - **Distribution**: gross profit is a percentage of total invested
//!   capital. `preview` computes the allocation table; `commit` writes one
//!   profit entry per credited participant and marks the period processed,
//!   all or nothing.
//!
//! # Precision
//!
//! Amounts are fixed-precision decimals rounded to cents. Pools and shares
//! are rounded so that what is allocated always sums exactly to the pool:
//! - Capital: 1000.00, profit 10% -> gross 100.00
//! - Split 70/30 -> proportional 70.00, exclusive 30.00

pub mod period;
pub mod period_manager;
pub mod split;
pub mod engine;
pub mod notification;
pub mod ports;
pub mod error;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use period::{AccountingPeriod, NewPeriod, ProcessingRecord, SequenceAvailability};
pub use period_manager::PeriodManager;
pub use split::{ConfigurationService, SplitConfiguration, SplitRatio};
pub use engine::{
    Allocation, DistributionEngine, DistributionPreview, DistributionResult, SplitSource,
};
pub use notification::{Notification, NotificationSink, Severity, TracingNotificationSink};
pub use ports::{
    CommitDistribution, CommittedDistribution, ConfigurationPort, DistributionStore, PeriodPort,
};
pub use error::{DistributionError, DistributionWarning};

#[cfg(any(test, feature = "mock"))]
pub use mock::InMemoryStore;
