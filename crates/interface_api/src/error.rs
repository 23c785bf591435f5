//! API error handling
//!
//! Domain errors convert into `ApiError`, which renders as a JSON body
//! `{error, message}` with the matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_distribution::DistributionError;
use domain_ledger::LedgerError;
use domain_participant::ParticipantError;

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => {
                error!(message = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone()),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        if err.is_transient() {
            return ApiError::Unavailable(err.to_string());
        }
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Validation { message, .. } => ApiError::Validation(message),
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Unauthorized { message } => ApiError::Forbidden(message),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<DistributionError> for ApiError {
    fn from(err: DistributionError) -> Self {
        match err {
            DistributionError::NotFound(_) => ApiError::NotFound(err.to_string()),
            DistributionError::Validation(message) => ApiError::Validation(message),
            DistributionError::InvalidSplit(_) | DistributionError::NoConfiguration => {
                ApiError::Validation(err.to_string())
            }
            DistributionError::AlreadyProcessed(_) | DistributionError::UnallocatedExclusivePool { .. } => {
                ApiError::Conflict(err.to_string())
            }
            DistributionError::PartialWrite(_) | DistributionError::InvalidAllocation(_) => {
                ApiError::Internal(err.to_string())
            }
            DistributionError::Port(port) => port.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(_) => ApiError::NotFound(err.to_string()),
            LedgerError::Validation(message) => ApiError::Validation(message),
            LedgerError::InsufficientBalance { .. } | LedgerError::Money(_) => {
                ApiError::Validation(err.to_string())
            }
            LedgerError::InvalidState(_) | LedgerError::DuplicatePendingRequest { .. } => {
                ApiError::Conflict(err.to_string())
            }
            LedgerError::Port(port) => port.into(),
        }
    }
}

impl From<ParticipantError> for ApiError {
    fn from(err: ParticipantError) -> Self {
        match err {
            ParticipantError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ParticipantError::InvalidData(_) | ParticipantError::NotAPartner => {
                ApiError::Validation(err.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken | AuthError::TokenExpired => ApiError::Unauthorized,
            AuthError::MissingPermission(_) => ApiError::Forbidden(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_error_status() {
        let already = ApiError::from(DistributionError::AlreadyProcessed("March".into()));
        assert_eq!(already.into_response().status(), StatusCode::CONFLICT);

        let split = ApiError::from(DistributionError::InvalidSplit("60 + 39".into()));
        assert_eq!(split.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        let missing = ApiError::from(DistributionError::NotFound("Period".into()));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_port_conflict_is_409() {
        let error = ApiError::from(PortError::conflict("already decided"));
        assert!(matches!(error, ApiError::Conflict(_)));
    }

    #[test]
    fn test_insufficient_balance_is_422() {
        let error = ApiError::from(LedgerError::InsufficientBalance {
            requested: 10.into(),
            available: 5.into(),
        });
        assert_eq!(error.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
