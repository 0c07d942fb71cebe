//! Role listing (admin only)

use axum::{Json, Router, extract::State, routing::get};
use taskgate_db::Role;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/roles
async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>, ApiError> {
    Ok(Json(state.store.list_roles().await?))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/roles", get(list_roles))
}
