//! Balance handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use core_kernel::ParticipantId;
use domain_ledger::{CapitalSummary, Statement};
use domain_participant::ParticipantDirectory;

use crate::auth::Claims;
use crate::dto::participant::BalanceResponse;
use crate::{AppState, error::ApiError};

pub async fn get_balance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<ParticipantId>,
) -> Result<Json<BalanceResponse>, ApiError> {
    claims.require_self_or_admin(id)?;
    let participant = state.services.directory.get_participant(id).await?;
    let balance = state.services.balances.get_balance(participant.owner_ref()).await?;

    Ok(Json(BalanceResponse {
        participant_id: id,
        kind: participant.kind,
        balance,
    }))
}

/// Totals and entries shown on the participant dashboard
pub async fn get_statement(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<ParticipantId>,
) -> Result<Json<Statement>, ApiError> {
    claims.require_self_or_admin(id)?;
    let participant = state.services.directory.get_participant(id).await?;
    Ok(Json(state.services.balances.statement(participant.owner_ref()).await?))
}

/// Total invested capital over investors and active partners
pub async fn total_capital(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<CapitalSummary>, ApiError> {
    claims.require_admin()?;
    Ok(Json(state.services.balances.total_invested_capital().await?))
}
