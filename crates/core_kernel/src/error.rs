//! Kernel-level errors
//!
//! Domain crates usually match on `MoneyError` or `TemporalError` directly;
//! `CoreError` is the umbrella for code that handles both.

use thiserror::Error;
use crate::money::MoneyError;
use crate::temporal::TemporalError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid amount: {0}")]
    Money(#[from] MoneyError),

    #[error("Invalid date range: {0}")]
    Temporal(#[from] TemporalError),

    #[error("Malformed identifier: {0}")]
    Identifier(#[from] uuid::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}
