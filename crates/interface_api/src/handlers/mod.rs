//! Request handlers, one module per resource

pub mod health;
pub mod period;
pub mod distribution;
pub mod participant;
pub mod balance;
pub mod configuration;
pub mod request;
pub mod entry;

use tower_http::request_id::RequestId;

use core_kernel::OperationMetadata;

use crate::auth::Claims;

/// Audit metadata for a state-changing call: the token subject, correlated
/// by the `x-request-id` of the HTTP request when one is present
pub(crate) fn operation_metadata(claims: &Claims, request_id: Option<&RequestId>) -> OperationMetadata {
    let metadata = OperationMetadata::initiated_by(claims.sub.clone());
    match request_id.and_then(|id| id.header_value().to_str().ok()) {
        Some(id) => metadata.with_correlation_id(id),
        None => metadata,
    }
}
