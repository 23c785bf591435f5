//! Split configuration handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use validator::Validate;

use domain_distribution::SplitConfiguration;

use crate::auth::Claims;
use crate::dto::configuration::SaveConfigurationRequest;
use crate::{AppState, error::ApiError};

/// The configuration in effect, `null` if none was ever saved
pub async fn current(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Option<SplitConfiguration>>, ApiError> {
    claims.require_admin()?;
    Ok(Json(state.services.configurations.current().await?))
}

/// Appends a configuration, which becomes current
pub async fn save(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<SaveConfigurationRequest>,
) -> Result<(StatusCode, Json<SplitConfiguration>), ApiError> {
    claims.require_admin()?;
    request.validate()?;

    let configuration = state
        .services
        .configurations
        .save(
            request.proportional_percentage,
            request.exclusive_percentage,
            request.description,
            &claims.sub,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(configuration)))
}

/// Every saved configuration, newest first
pub async fn history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<SplitConfiguration>>, ApiError> {
    claims.require_admin()?;
    Ok(Json(state.services.configurations.history().await?))
}
