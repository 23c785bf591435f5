//! Participant domain errors

use thiserror::Error;

/// Errors that can occur in the participant domain
#[derive(Debug, Error)]
pub enum ParticipantError {
    /// Participant with the given ID was not found
    #[error("Participant not found: {0}")]
    NotFound(String),

    /// Invalid participant data provided
    #[error("Invalid participant data: {0}")]
    InvalidData(String),

    /// Investors are always eligible and carry no active flag
    #[error("Only partners can be activated or deactivated")]
    NotAPartner,
}

impl From<validator::ValidationErrors> for ParticipantError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ParticipantError::InvalidData(errors.to_string())
    }
}
