//! Tournament lifecycle error types.

use thiserror::Error;

use super::models::{TournamentId, TournamentStatus};
use crate::bracket::BracketError;
use crate::db::StoreError;
use crate::players::PlayerId;

/// Tournament lifecycle errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Invalid tournament name: {0}")]
    InvalidName(String),

    #[error("Tournament not in correct state: expected {expected}, got {actual}")]
    InvalidState {
        expected: TournamentStatus,
        actual: TournamentStatus,
    },

    #[error("Insufficient participants: need {needed}, have {current}")]
    InsufficientParticipants { needed: usize, current: usize },

    #[error("Player {player_id} already enrolled in tournament {tournament_id}")]
    DuplicateEnrollment {
        tournament_id: TournamentId,
        player_id: PlayerId,
    },

    #[error("Player {0} is inactive")]
    InactivePlayer(PlayerId),

    #[error("Tournament {0} has no bracket")]
    NoBracket(TournamentId),

    #[error("Round {round} still has {pending} pending matches")]
    RoundIncomplete { round: u32, pending: usize },

    #[error("Tournament {0} was modified concurrently")]
    ConcurrentModification(TournamentId),

    /// Stored bracket violates a structural invariant
    #[error("Bracket integrity violation: {0}")]
    Integrity(#[from] BracketError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl TournamentError {
    /// Get a client-safe error message
    ///
    /// Store and integrity failures are internal; their detail stays in the logs.
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Store(_) | TournamentError::Integrity(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Stable machine-readable error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            TournamentError::TournamentNotFound(_) | TournamentError::PlayerNotFound(_) => {
                "NOT_FOUND"
            }
            TournamentError::InvalidName(_) => "INVALID_NAME",
            TournamentError::InvalidState { .. } => "INVALID_STATE",
            TournamentError::InsufficientParticipants { .. } => "INSUFFICIENT_PARTICIPANTS",
            TournamentError::DuplicateEnrollment { .. } => "DUPLICATE_ENROLLMENT",
            TournamentError::InactivePlayer(_) => "INACTIVE_PLAYER",
            TournamentError::NoBracket(_) => "NO_BRACKET",
            TournamentError::RoundIncomplete { .. } => "ROUND_INCOMPLETE",
            TournamentError::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            TournamentError::Integrity(_) => "INTEGRITY_VIOLATION",
            TournamentError::Store(_) => "STORE_ERROR",
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
