//! Task operations

use chrono::Utc;

use crate::error::DbError;
use crate::models::{NewTask, Task, UpdateTask};
use crate::repository::Database;

impl Database {
    // ==================== Task Operations ====================

    /// Insert a new task. The owning user must exist.
    pub async fn insert_task(&self, task: NewTask) -> Result<Task, DbError> {
        let now = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO tasks (title, done, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, title, done, user_id, created_at, updated_at
            "#,
        )
        .bind(&task.title)
        .bind(task.done)
        .bind(task.user_id)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DbError::from_constraint(
                e,
                || format!("Task '{}' already exists", task.title),
                || format!("User: {}", task.user_id),
            )
        })?;

        Task::try_from(&row).map_err(DbError::from)
    }

    /// Get a task by ID
    pub async fn get_task(&self, id: i64) -> Result<Option<Task>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, title, done, user_id, created_at, updated_at
            FROM tasks
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Task::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all tasks
    pub async fn list_tasks(&self) -> Result<Vec<Task>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, done, user_id, created_at, updated_at
            FROM tasks
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Task::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Apply a partial update. Returns `None` when no task has the given id.
    pub async fn update_task(&self, id: i64, update: UpdateTask) -> Result<Option<Task>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = COALESCE(?, title),
                done = COALESCE(?, done),
                updated_at = ?
            WHERE id = ?
            RETURNING id, title, done, user_id, created_at, updated_at
            "#,
        )
        .bind(update.title.as_deref())
        .bind(update.done)
        .bind(now.to_rfc3339())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Task::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Delete a task
    pub async fn delete_task(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
