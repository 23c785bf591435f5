//! Ledger domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{MoneyError, PortError};

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Entry, request or participant not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input shape or range
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not allowed in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A pending request of the same kind already exists for the owner
    #[error("A pending {kind} request already exists for {owner}")]
    DuplicatePendingRequest {
        owner: String,
        kind: String,
    },

    /// Withdrawal larger than the available balance
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },

    /// Invalid monetary value
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Storage failure
    #[error("Storage error: {0}")]
    Port(PortError),
}

impl From<PortError> for LedgerError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => {
                LedgerError::NotFound(format!("{} {}", entity_type, id))
            }
            PortError::Validation { message, .. } => LedgerError::Validation(message),
            PortError::Conflict { message } => LedgerError::InvalidState(message),
            other => LedgerError::Port(other),
        }
    }
}
