//! Store trait
//!
//! Handlers depend on this trait rather than on [`Database`] directly so the
//! backing store is chosen once, at construction time.

use async_trait::async_trait;

use crate::error::DbError;
use crate::models::{NewTask, NewUser, Role, Task, UpdateTask, UpdateUser, User, UserPreference};
use crate::repository::Database;

/// Persistence operations for users, roles, tasks and preferences.
///
/// Every method issues a single logical operation; there are no
/// multi-statement transactions.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_roles(&self) -> Result<Vec<Role>, DbError>;

    async fn get_role_by_id(&self, id: i64) -> Result<Option<Role>, DbError>;

    /// Insert a user; fails with [`DbError::Duplicate`] on a taken username
    async fn insert_user(&self, user: NewUser) -> Result<User, DbError>;

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError>;

    async fn list_users(&self) -> Result<Vec<User>, DbError>;

    /// Returns `None` when the user does not exist
    async fn update_user(&self, id: i64, update: UpdateUser) -> Result<Option<User>, DbError>;

    /// Returns `false` when the user does not exist
    async fn delete_user(&self, id: i64) -> Result<bool, DbError>;

    async fn has_users(&self) -> Result<bool, DbError>;

    async fn list_tasks(&self) -> Result<Vec<Task>, DbError>;

    async fn get_task(&self, id: i64) -> Result<Option<Task>, DbError>;

    /// Fails with [`DbError::NotFound`] when the owning user does not exist
    async fn insert_task(&self, task: NewTask) -> Result<Task, DbError>;

    async fn update_task(&self, id: i64, update: UpdateTask) -> Result<Option<Task>, DbError>;

    async fn delete_task(&self, id: i64) -> Result<bool, DbError>;

    async fn get_preference(&self, user_id: i64, key: &str)
    -> Result<Option<UserPreference>, DbError>;

    /// Upsert keyed by `(user_id, key)`
    async fn set_preference(
        &self,
        user_id: i64,
        key: &str,
        value: &str,
    ) -> Result<UserPreference, DbError>;
}

#[async_trait]
impl Store for Database {
    async fn list_roles(&self) -> Result<Vec<Role>, DbError> {
        Database::list_roles(self).await
    }

    async fn get_role_by_id(&self, id: i64) -> Result<Option<Role>, DbError> {
        Database::get_role_by_id(self, id).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        Database::insert_user(self, user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        Database::get_user_by_id(self, id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        Database::get_user_by_username(self, username).await
    }

    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        Database::list_users(self).await
    }

    async fn update_user(&self, id: i64, update: UpdateUser) -> Result<Option<User>, DbError> {
        Database::update_user(self, id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        Database::delete_user(self, id).await
    }

    async fn has_users(&self) -> Result<bool, DbError> {
        Database::has_users(self).await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, DbError> {
        Database::list_tasks(self).await
    }

    async fn get_task(&self, id: i64) -> Result<Option<Task>, DbError> {
        Database::get_task(self, id).await
    }

    async fn insert_task(&self, task: NewTask) -> Result<Task, DbError> {
        Database::insert_task(self, task).await
    }

    async fn update_task(&self, id: i64, update: UpdateTask) -> Result<Option<Task>, DbError> {
        Database::update_task(self, id, update).await
    }

    async fn delete_task(&self, id: i64) -> Result<bool, DbError> {
        Database::delete_task(self, id).await
    }

    async fn get_preference(
        &self,
        user_id: i64,
        key: &str,
    ) -> Result<Option<UserPreference>, DbError> {
        Database::get_preference(self, user_id, key).await
    }

    async fn set_preference(
        &self,
        user_id: i64,
        key: &str,
        value: &str,
    ) -> Result<UserPreference, DbError> {
        Database::set_preference(self, user_id, key, value).await
    }
}
