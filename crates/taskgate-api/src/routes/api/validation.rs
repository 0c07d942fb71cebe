//! Input validation shared by the API handlers

use crate::error::ApiError;

/// Maximum allowed username length
const MAX_USERNAME_LENGTH: usize = 64;
/// Maximum allowed password length (prevent DoS with very large passwords)
pub const MAX_PASSWORD_LENGTH: usize = 256;
/// Minimum allowed password length
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_TITLE_LENGTH: usize = 512;
const MAX_PREFERENCE_KEY_LENGTH: usize = 128;
const MAX_PREFERENCE_VALUE_LENGTH: usize = 4096;

/// Validate username format and length
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username cannot be empty".to_string()));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Username exceeds maximum length of {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    // Only allow alphanumeric characters, underscores, and hyphens
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::BadRequest(
            "Username can only contain alphanumeric characters, underscores, and hyphens"
                .to_string(),
        ));
    }
    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Validate a task title
pub fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Title exceeds maximum length of {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

/// Validate a preference key/value pair
pub fn validate_preference(key: &str, value: &str) -> Result<(), ApiError> {
    if key.is_empty() {
        return Err(ApiError::BadRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_PREFERENCE_KEY_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Key exceeds maximum length of {} characters",
            MAX_PREFERENCE_KEY_LENGTH
        )));
    }
    if value.len() > MAX_PREFERENCE_VALUE_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Value exceeds maximum length of {} characters",
            MAX_PREFERENCE_VALUE_LENGTH
        )));
    }
    Ok(())
}
