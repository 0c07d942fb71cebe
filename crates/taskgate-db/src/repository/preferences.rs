//! User preference operations

use chrono::Utc;

use crate::error::DbError;
use crate::models::UserPreference;
use crate::repository::Database;

impl Database {
    // ==================== Preference Operations ====================

    /// Get a preference for a user
    pub async fn get_preference(
        &self,
        user_id: i64,
        key: &str,
    ) -> Result<Option<UserPreference>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, user_id, key, value, created_at, updated_at
            FROM user_preferences
            WHERE user_id = ? AND key = ?
            "#,
        )
        .bind(user_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| UserPreference::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Set a preference, replacing any existing value for the same key
    pub async fn set_preference(
        &self,
        user_id: i64,
        key: &str,
        value: &str,
    ) -> Result<UserPreference, DbError> {
        let now = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO user_preferences (user_id, key, value, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            RETURNING id, user_id, key, value, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(key)
        .bind(value)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DbError::from_constraint(
                e,
                || format!("Preference '{}' already exists", key),
                || format!("User: {}", user_id),
            )
        })?;

        UserPreference::try_from(&row).map_err(DbError::from)
    }
}
