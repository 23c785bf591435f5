//! Distribution domain errors

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use core_kernel::{CoreError, MoneyError, PortError, TemporalError};
use domain_ledger::LedgerError;

/// Errors that can occur in the distribution domain
#[derive(Debug, Error)]
pub enum DistributionError {
    /// Bad input shape or range; nothing was changed
    #[error("Validation error: {0}")]
    Validation(String),

    /// The period has already been distributed
    #[error("Period {0} has already been processed")]
    AlreadyProcessed(String),

    /// Split percentages are negative or do not sum to 100
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Period, participant or configuration not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// No split override was given and none has ever been saved
    #[error("No distribution configuration has been saved")]
    NoConfiguration,

    /// The exclusive pool is positive but there is no active partner to receive it
    #[error("Exclusive pool of {amount} cannot be distributed: no active partners")]
    UnallocatedExclusivePool { amount: Decimal },

    /// The computed allocation table does not add up; nothing was written
    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),

    /// The store failed mid-commit; the attempt was rolled back
    #[error("Distribution commit failed and was rolled back: {0}")]
    PartialWrite(String),

    /// Storage failure outside a commit
    #[error("Storage error: {0}")]
    Port(PortError),
}

impl From<PortError> for DistributionError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => {
                DistributionError::NotFound(format!("{} {}", entity_type, id))
            }
            PortError::Validation { message, .. } => DistributionError::Validation(message),
            other => DistributionError::Port(other),
        }
    }
}

impl From<LedgerError> for DistributionError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::NotFound(what) => DistributionError::NotFound(what),
            LedgerError::Validation(message) => DistributionError::Validation(message),
            LedgerError::Port(port) => DistributionError::Port(port),
            other => DistributionError::Validation(other.to_string()),
        }
    }
}

impl From<MoneyError> for DistributionError {
    fn from(error: MoneyError) -> Self {
        DistributionError::Validation(error.to_string())
    }
}

impl From<TemporalError> for DistributionError {
    fn from(error: TemporalError) -> Self {
        DistributionError::Validation(error.to_string())
    }
}

impl From<CoreError> for DistributionError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::NotFound(what) => DistributionError::NotFound(what),
            other => DistributionError::Validation(other.to_string()),
        }
    }
}

/// Non-fatal conditions reported alongside a preview or result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DistributionWarning {
    /// Total capital is zero; the proportional pool was not allocated
    NoCapital { proportional_pool: Decimal },
    /// No active partner; the exclusive pool was left unallocated
    UnallocatedExclusivePool { amount: Decimal },
}

impl fmt::Display for DistributionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionWarning::NoCapital { proportional_pool } => write!(
                f,
                "Total invested capital is zero; proportional pool of {} was not allocated",
                proportional_pool
            ),
            DistributionWarning::UnallocatedExclusivePool { amount } => write!(
                f,
                "No active partners; exclusive pool of {} was not allocated",
                amount
            ),
        }
    }
}
