//! Role operations

use crate::error::DbError;
use crate::models::Role;
use crate::repository::Database;

impl Database {
    /// List all roles
    pub async fn list_roles(&self) -> Result<Vec<Role>, DbError> {
        let rows = sqlx::query("SELECT id, name FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Role::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Get a role by ID
    pub async fn get_role_by_id(&self, id: i64) -> Result<Option<Role>, DbError> {
        let result = sqlx::query("SELECT id, name FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| Role::try_from(&row).map_err(DbError::from)).transpose()
    }
}
