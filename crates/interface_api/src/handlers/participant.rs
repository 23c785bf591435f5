//! Participant handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;
use validator::Validate;

use core_kernel::ParticipantId;
use domain_participant::{Participant, ParticipantDirectory};

use crate::auth::Claims;
use crate::dto::participant::*;
use crate::dto::ConfirmQuery;
use crate::{AppState, error::ApiError};

pub async fn list_participants(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListParticipantsQuery>,
) -> Result<Json<Vec<Participant>>, ApiError> {
    claims.require_admin()?;
    Ok(Json(state.services.directory.find_participants(query.into()).await?))
}

pub async fn get_participant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<ParticipantId>,
) -> Result<Json<Participant>, ApiError> {
    claims.require_self_or_admin(id)?;
    Ok(Json(state.services.directory.get_participant(id).await?))
}

/// Registers an investor or partner
pub async fn create_participant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateParticipantRequest>,
) -> Result<(StatusCode, Json<Participant>), ApiError> {
    claims.require_admin()?;
    request.validate()?;

    let participant = Participant::new(request.into())?;
    let participant = state.services.directory.create_participant(participant).await?;
    info!(participant_id = %participant.id, kind = %participant.kind, "Participant registered");
    Ok((StatusCode::CREATED, Json(participant)))
}

/// Activates or deactivates a partner
pub async fn set_active(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<ParticipantId>,
    Json(request): Json<SetActiveRequest>,
) -> Result<Json<Participant>, ApiError> {
    claims.require_admin()?;
    Ok(Json(state.services.directory.set_active(id, request.active).await?))
}

/// Deletes a participant with its ledger entries and requests
///
/// Requires `?confirm=true`.
pub async fn delete_participant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<ParticipantId>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<DeleteParticipantResponse>, ApiError> {
    claims.require_admin()?;
    if !query.confirm {
        return Err(ApiError::Validation(
            "Deleting a participant removes its ledger history; repeat with confirm=true".to_string(),
        ));
    }

    let entries_removed = state.services.directory.delete_participant(id).await?;
    info!(participant_id = %id, entries_removed, "Participant deleted");
    Ok(Json(DeleteParticipantResponse { participant_id: id, entries_removed }))
}
