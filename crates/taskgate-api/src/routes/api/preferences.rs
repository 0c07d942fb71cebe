//! Per-user preference routes
//!
//! Both routes act on the caller's own preferences; there is no way to read
//! or write another user's settings.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tracing::debug;

use crate::error::{ApiError, ApiJson, ApiPath};
use crate::state::AppState;

use super::auth::CurrentUser;
use super::types::{PreferenceResponse, SetPreferenceRequest};
use super::validation::validate_preference;

/// GET /api/user-preferences/{key}
async fn get_preference(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
) -> Result<Json<PreferenceResponse>, ApiError> {
    let preference = state
        .store
        .get_preference(user.id, &key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Preference: {}", key)))?;

    Ok(Json(PreferenceResponse::from(preference)))
}

/// POST /api/user-preferences
async fn set_preference(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SetPreferenceRequest>,
) -> Result<Json<PreferenceResponse>, ApiError> {
    validate_preference(&request.key, &request.value)?;

    debug!("User {} setting preference {}", user.username, request.key);

    let preference = state
        .store
        .set_preference(user.id, &request.key, &request.value)
        .await?;

    Ok(Json(PreferenceResponse::from(preference)))
}

/// Create preference routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/user-preferences", post(set_preference))
        .route("/api/user-preferences/{key}", get(get_preference))
}
