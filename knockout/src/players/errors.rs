//! Player record error types.

use thiserror::Error;

use super::models::PlayerId;
use crate::db::StoreError;

/// Player record errors
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player not found: {0}")]
    NotFound(PlayerId),

    #[error("Nick already taken: {0}")]
    NickTaken(String),

    #[error("Invalid nick: {0}")]
    InvalidNick(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl PlayerError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            PlayerError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Stable machine-readable error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            PlayerError::NotFound(_) => "NOT_FOUND",
            PlayerError::NickTaken(_) => "NICK_TAKEN",
            PlayerError::InvalidNick(_) => "INVALID_NICK",
            PlayerError::Store(_) => "STORE_ERROR",
        }
    }
}

/// Result type for player operations
pub type PlayerResult<T> = Result<T, PlayerError>;
