//! Ledger entry correction handlers (admin only)

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use tower_http::request_id::RequestId;
use validator::Validate;

use core_kernel::LedgerEntryId;
use domain_ledger::LedgerEntry;

use crate::auth::Claims;
use crate::dto::entry::CorrectEntryRequest;
use crate::dto::ConfirmQuery;
use crate::handlers::operation_metadata;
use crate::{AppState, error::ApiError};

pub async fn get_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<LedgerEntryId>,
) -> Result<Json<LedgerEntry>, ApiError> {
    claims.require_admin()?;
    Ok(Json(state.services.corrections.get(id).await?))
}

/// Rewrites the amount and description of a deposit or withdrawal
pub async fn correct_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    request_id: Option<Extension<RequestId>>,
    Path(id): Path<LedgerEntryId>,
    Json(request): Json<CorrectEntryRequest>,
) -> Result<Json<LedgerEntry>, ApiError> {
    claims.require_admin()?;
    request.validate()?;

    let metadata = operation_metadata(&claims, request_id.as_ref().map(|Extension(id)| id));
    let entry = state
        .services
        .corrections
        .correct(id, request.amount, request.description, &metadata)
        .await?;
    Ok(Json(entry))
}

/// Deletes a deposit or withdrawal; needs `?confirm=true`
pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    request_id: Option<Extension<RequestId>>,
    Path(id): Path<LedgerEntryId>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<LedgerEntry>, ApiError> {
    claims.require_admin()?;
    if !query.confirm {
        return Err(ApiError::Validation(
            "Deleting a ledger entry changes the owner's balance; repeat with confirm=true".to_string(),
        ));
    }

    let metadata = operation_metadata(&claims, request_id.as_ref().map(|Extension(id)| id));
    Ok(Json(state.services.corrections.delete(id, &metadata).await?))
}
