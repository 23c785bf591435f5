//! Deposit and withdrawal request handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::RequestId;
use domain_ledger::{ApprovalRequest, RequestQuery};
use domain_participant::ParticipantDirectory;

use crate::auth::Claims;
use crate::dto::request::*;
use crate::{AppState, error::ApiError};

/// Lists requests
///
/// Administrators see every request; other callers only their own.
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<Vec<ApprovalRequest>>, ApiError> {
    let participant_id = if claims.is_admin() {
        query.participant_id
    } else {
        let own = claims
            .participant_id
            .ok_or_else(|| ApiError::Forbidden("Token is not bound to a participant".to_string()))?;
        claims.require_self_or_admin(query.participant_id.unwrap_or(own))?;
        Some(own)
    };

    let owner = match participant_id {
        Some(id) => Some(state.services.directory.get_participant(id).await?.owner_ref()),
        None => None,
    };

    let requests = state
        .services
        .approvals
        .list(RequestQuery {
            owner,
            kind: None,
            pending_only: query.pending_only,
        })
        .await?;
    Ok(Json(requests))
}

/// Submits a deposit or withdrawal request for approval
pub async fn submit_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<ApprovalRequest>), ApiError> {
    claims.require_self_or_admin(request.participant_id)?;
    request.validate()?;

    let owner = state
        .services
        .directory
        .get_participant(request.participant_id)
        .await?
        .owner_ref();
    let submitted = state
        .services
        .approvals
        .submit(owner, request.kind, request.amount, request.note)
        .await?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

/// Approves a pending request, writing its ledger entry
pub async fn approve_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<RequestId>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    claims.require_admin()?;
    let (request, entry) = state.services.approvals.approve(id, &claims.sub).await?;
    Ok(Json(ApprovalResponse { request, entry }))
}

pub async fn reject_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<RequestId>,
    Json(body): Json<RejectRequest>,
) -> Result<Json<ApprovalRequest>, ApiError> {
    claims.require_admin()?;
    body.validate()?;
    Ok(Json(state.services.approvals.reject(id, &body.reason, &claims.sub).await?))
}
