//! Store error types.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by a store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint rejected the write
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// A conditional write found its precondition no longer holds
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// A stored row could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Operation timed out
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    /// Classify a sqlx error, turning unique violations into `Duplicate`
    pub fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate(what.to_string());
            }
        }
        StoreError::Database(err)
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
