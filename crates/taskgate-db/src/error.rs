//! Database error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

impl DbError {
    /// Translate constraint violations into domain errors.
    ///
    /// `duplicate` and `missing_reference` build the messages used when the
    /// failing statement hit a UNIQUE or FOREIGN KEY constraint respectively.
    pub(crate) fn from_constraint(
        err: sqlx::Error,
        duplicate: impl FnOnce() -> String,
        missing_reference: impl FnOnce() -> String,
    ) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Duplicate(duplicate())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                DbError::NotFound(missing_reference())
            }
            _ => DbError::Connection(err),
        }
    }
}
