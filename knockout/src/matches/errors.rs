//! Match resolution error types.

use thiserror::Error;

use super::models::MatchId;
use crate::db::StoreError;
use crate::players::PlayerId;

/// Match resolution errors
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Match not found: {0}")]
    NotFound(MatchId),

    #[error("Match {0} is already resolved")]
    AlreadyResolved(MatchId),

    #[error("Player {winner_id} is not playing in match {match_id}")]
    InvalidWinner {
        match_id: MatchId,
        winner_id: PlayerId,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl MatchError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            MatchError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Stable machine-readable error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            MatchError::NotFound(_) => "NOT_FOUND",
            MatchError::AlreadyResolved(_) => "ALREADY_RESOLVED",
            MatchError::InvalidWinner { .. } => "INVALID_WINNER",
            MatchError::Store(_) => "STORE_ERROR",
        }
    }
}

/// Result type for match operations
pub type MatchResult<T> = Result<T, MatchError>;
