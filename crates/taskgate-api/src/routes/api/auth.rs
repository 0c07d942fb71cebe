//! Authentication extractor and login route

use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::request::Parts,
    routing::post,
};
use taskgate_auth::{AuthError, AuthUser, verify_credentials};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

use super::types::{LoginRequest, LoginResponse};
use super::validation::MAX_PASSWORD_LENGTH;

// ==================== Auth Extractor ====================

/// Extractor for the user attached by the authentication middleware
pub struct CurrentUser(pub AuthUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized)
    }
}

// ==================== Auth Routes ====================

/// POST /api/login
async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }
    if request.password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }

    debug!("Login attempt for user: {}", request.username);

    let user = state.store.get_user_by_username(&request.username).await?;

    // Unknown users are checked against a dummy hash so both failure paths
    // look the same from outside
    let password_valid = verify_credentials(
        &request.password,
        user.as_ref().map(|u| u.password_hash.as_str()),
    )?;

    let user = match (user, password_valid) {
        (Some(u), true) => u,
        _ => {
            metrics::counter!("taskgate_logins_total", "outcome" => "failure").increment(1);
            warn!("Failed login for user: {}", request.username);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = state.jwt.generate_token(user.id, &user.username, user.role)?;

    metrics::counter!("taskgate_logins_total", "outcome" => "success").increment(1);
    info!("User {} logged in successfully", user.username);

    Ok(Json(LoginResponse {
        token,
        expires_in: state.jwt.token_expiry_secs(),
    }))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/login", post(login))
}
