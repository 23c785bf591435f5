//! Period handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::PeriodId;
use domain_distribution::{AccountingPeriod, SequenceAvailability};

use crate::auth::Claims;
use crate::dto::period::*;
use crate::dto::ConfirmQuery;
use crate::{AppState, error::ApiError};

/// Lists every period, ordered by sequence number
pub async fn list_periods(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountingPeriod>>, ApiError> {
    Ok(Json(state.services.periods.list().await?))
}

pub async fn get_period(
    State(state): State<AppState>,
    Path(id): Path<PeriodId>,
) -> Result<Json<AccountingPeriod>, ApiError> {
    Ok(Json(state.services.periods.get(id).await?))
}

/// Opens a new pending period
pub async fn create_period(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreatePeriodRequest>,
) -> Result<(StatusCode, Json<AccountingPeriod>), ApiError> {
    claims.require_admin()?;
    request.validate()?;

    let period = state.services.periods.create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(period)))
}

pub async fn next_sequence_number(
    State(state): State<AppState>,
) -> Result<Json<SequenceAvailability>, ApiError> {
    Ok(Json(state.services.periods.next_available_sequence_number().await?))
}

/// Deletes a period and the profit entries it produced
///
/// Requires `?confirm=true`.
pub async fn delete_period(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<PeriodId>,
    Query(query): Query<ConfirmQuery>,
) -> Result<Json<DeletePeriodResponse>, ApiError> {
    claims.require_admin()?;
    if !query.confirm {
        return Err(ApiError::Validation(
            "Deleting a period removes its profit entries; repeat with confirm=true".to_string(),
        ));
    }

    let entries_removed = state.services.periods.delete(id).await?;
    Ok(Json(DeletePeriodResponse { period_id: id, entries_removed }))
}
