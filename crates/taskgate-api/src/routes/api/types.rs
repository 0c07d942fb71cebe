//! Request/Response DTOs

use serde::{Deserialize, Serialize};
use taskgate_db::{Task, User, UserPreference};

// ==================== Auth Types ====================

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
}

// ==================== User Types ====================

/// Create user request
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role_id: i64,
}

/// Update user request. Omitted fields are left unchanged.
#[derive(Deserialize, Default)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role_id: Option<i64>,
}

/// User response (without password)
#[derive(Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub role_id: i64,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role_id: user.role_id,
            role: user.role.as_str().to_string(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

// ==================== Task Types ====================

/// Create task request
#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub done: bool,
    pub user_id: i64,
}

/// Update task request. Omitted fields are left unchanged.
#[derive(Deserialize, Default)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
}

/// Task response
#[derive(Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub done: bool,
    pub user_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            done: task.done,
            user_id: task.user_id,
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

// ==================== Preference Types ====================

/// Set preference request
#[derive(Deserialize)]
pub struct SetPreferenceRequest {
    pub key: String,
    pub value: String,
}

/// Preference response
#[derive(Serialize, Deserialize)]
pub struct PreferenceResponse {
    pub id: i64,
    pub user_id: i64,
    pub key: String,
    pub value: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserPreference> for PreferenceResponse {
    fn from(pref: UserPreference) -> Self {
        Self {
            id: pref.id,
            user_id: pref.user_id,
            key: pref.key,
            value: pref.value,
            created_at: pref.created_at.to_rfc3339(),
            updated_at: pref.updated_at.to_rfc3339(),
        }
    }
}

// ==================== Common Types ====================

/// Confirmation body for deletes
#[derive(Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
