//! Distribution handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tower_http::request_id::RequestId;

use core_kernel::PeriodId;
use domain_distribution::{DistributionPreview, DistributionResult};

use crate::auth::Claims;
use crate::dto::distribution::DistributionRequest;
use crate::handlers::operation_metadata;
use crate::{AppState, error::ApiError};

/// Computes the allocation table without writing anything
pub async fn preview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<PeriodId>,
    Json(request): Json<DistributionRequest>,
) -> Result<Json<DistributionPreview>, ApiError> {
    claims.require_admin()?;
    let split = request.split_ratio()?;

    let preview = state
        .services
        .engine
        .preview(id, request.profit_percentage, split)
        .await?;
    Ok(Json(preview))
}

/// Commits the distribution; the caller is recorded as `processed_by`
pub async fn commit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    request_id: Option<Extension<RequestId>>,
    Path(id): Path<PeriodId>,
    Json(request): Json<DistributionRequest>,
) -> Result<Json<DistributionResult>, ApiError> {
    claims.require_admin()?;
    let split = request.split_ratio()?;

    let result = state
        .services
        .engine
        .commit(
            id,
            request.profit_percentage,
            split,
            operation_metadata(&claims, request_id.as_ref().map(|Extension(id)| id)),
        )
        .await?;
    Ok(Json(result))
}
