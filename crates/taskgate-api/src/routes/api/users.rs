//! User management routes (admin only)

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use taskgate_auth::hash_password;
use taskgate_db::{NewUser, UpdateUser, UserRole};
use tracing::{debug, info};

use crate::error::{ApiError, ApiJson, ApiPath};
use crate::state::AppState;

use super::auth::CurrentUser;
use super::types::{CreateUserRequest, MessageResponse, UpdateUserRequest, UserResponse};
use super::validation::{validate_password, validate_username};

/// Reject role ids that do not name a seeded role
async fn ensure_role_exists(state: &AppState, role_id: i64) -> Result<(), ApiError> {
    state
        .store
        .get_role_by_id(role_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid role_id: {}", role_id)))
}

// ==================== User Routes ====================

/// GET /api/users
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.store.list_users().await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /api/users
async fn create_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_username(&request.username)?;
    validate_password(&request.password)?;
    ensure_role_exists(&state, request.role_id).await?;

    debug!("Creating user: {}", request.username);

    let password_hash = hash_password(&request.password)?;

    let user = state
        .store
        .insert_user(NewUser {
            username: request.username,
            password_hash,
            role_id: request.role_id,
        })
        .await?;

    info!("Created user: {} ({})", user.username, user.role);

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /api/users/{id}
async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .store
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))?;

    Ok(Json(UserResponse::from(user)))
}

/// PUT /api/users/{id}
async fn update_user(
    CurrentUser(admin): CurrentUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!("Updating user: {}", id);

    if let Some(username) = &request.username {
        validate_username(username)?;
    }
    if let Some(password) = &request.password {
        validate_password(password)?;
    }
    if let Some(role_id) = request.role_id {
        ensure_role_exists(&state, role_id).await?;
        if admin.id == id && role_id != UserRole::Admin.id() {
            return Err(ApiError::BadRequest(
                "Cannot remove the admin role from your own account".to_string(),
            ));
        }
    }

    let password_hash = request
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;

    let user = state
        .store
        .update_user(
            id,
            UpdateUser {
                username: request.username,
                password_hash,
                role_id: request.role_id,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))?;

    info!("Updated user: {}", user.username);

    Ok(Json(UserResponse::from(user)))
}

/// DELETE /api/users/{id}
async fn delete_user(
    CurrentUser(admin): CurrentUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!("Deleting user: {}", id);

    if admin.id == id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    if state.store.delete_user(id).await? {
        info!("Deleted user: {}", id);
        Ok(Json(MessageResponse::new("User deleted successfully")))
    } else {
        Err(ApiError::NotFound(format!("User: {}", id)))
    }
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}
